//! # ballistics
//!
//! 弾丸の弾道特性を記述した宣言的レコード（1レコード = 1弾種）を読み込み、
//! 検証・正規化して問い合わせ可能なエンティティとして提供します。
//!
//! ```no_run
//! use ballistics::models::Projectile;
//! use ballistics::records::{RecordLocator, Registry, YamlDirectory};
//!
//! let registry = Registry::scan("data")?;
//! let locator = RecordLocator::new(registry, YamlDirectory::new("data"));
//!
//! let smk: Projectile = locator.find(None, "sierra_smk_168")?;
//! println!("{} -> {:?}", smk.name(), smk.params());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod logging;
pub mod models;
pub mod records;
