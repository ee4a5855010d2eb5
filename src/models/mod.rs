// エンティティの基本インターフェース（trait）定義
pub mod traits;

// 各エンティティの実装
pub mod projectile;

// 便利な re-export
pub use traits::*;
pub use projectile::{Base, DragFunction, DragParams, Projectile};
