//! # Records モジュール
//!
//! 宣言的なレコードファイルの読み込みと検証の基盤を提供します。
//!
//! - **field_type**: 意味型（string, float, percent, count, int, reference）による値の検証
//! - **registry**: グループ名から利用可能なソース名への対応
//! - **source**: ソース名から生レコード集合を読み込む実装（YAMLディレクトリ、メモリ）
//! - **locator**: グループ・ソース・識別子からの生レコード解決とエンティティ構築

pub mod error;
pub mod field_type;
pub mod locator;
pub mod registry;
pub mod source;

use indexmap::IndexMap;

/// 1件の生レコード（フィールド名 → 値）
pub type RawRecord = serde_yaml::Mapping;

/// 識別子をキーとする生レコード集合（記述順を保持）
pub type RecordSet = IndexMap<String, RawRecord>;

pub use error::{FindError, LoadError, RecordError};
pub use field_type::{FieldType, check, check_strict, check_tag};
pub use locator::RecordLocator;
pub use registry::Registry;
pub use source::{MemorySource, RecordSource, YamlDirectory};
