use std::fmt;
use std::path::PathBuf;

use crate::records::field_type::FieldType;

/// レコード検証エラー
///
/// 1件のレコードからエンティティを構築する際に発生するエラーです。
/// いずれも構築全体を中断し、部分的なエンティティは生成されません。
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// スキーマが未知の型タグを宣言している（データではなくスキーマ側の誤り）
    UnknownType(String),
    /// フィールド値が宣言された型を満たさない
    TypeMismatch {
        field: Option<String>,
        value: String,
        expected: FieldType,
    },
    /// 必須フィールドが存在しない
    MissingMandatoryField(String),
    /// 弾道係数（g1/g7）が1つも存在しない
    NoValidCoefficient,
    /// baseの表記が正規形に対応しない
    UnrecognizedBase(String),
    /// 未知の抗力関数名
    UnknownDragFunction(String),
}

impl RecordError {
    pub(crate) fn type_mismatch(value: &serde_yaml::Value, expected: FieldType) -> Self {
        RecordError::TypeMismatch {
            field: None,
            value: display_value(value),
            expected,
        }
    }

    /// 型不一致エラーにフィールド名を付与
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            RecordError::TypeMismatch { value, expected, .. } => RecordError::TypeMismatch {
                field: Some(name.to_string()),
                value,
                expected,
            },
            other => other,
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::UnknownType(tag) => write!(f, "未知のフィールド型: {}", tag),
            RecordError::TypeMismatch { field: Some(field), value, expected } => {
                write!(f, "型不一致: {} ({}) は {} ではありません", value, field, expected)
            }
            RecordError::TypeMismatch { field: None, value, expected } => {
                write!(f, "型不一致: {} は {} ではありません", value, expected)
            }
            RecordError::MissingMandatoryField(field) => {
                write!(f, "必須フィールドがありません: {}", field)
            }
            RecordError::NoValidCoefficient => write!(f, "有効な弾道係数がありません (g1 または g7)"),
            RecordError::UnrecognizedBase(input) => write!(f, "未知のbase: {}", input),
            RecordError::UnknownDragFunction(name) => write!(f, "未知の抗力関数: {}", name),
        }
    }
}

impl std::error::Error for RecordError {}

/// レコードソース読み込みエラー
#[derive(Debug)]
pub enum LoadError {
    /// レジストリに存在しないグループ
    UnknownGroup(String),
    /// グループ内に存在しないソース名
    UnknownSource { group: String, name: String },
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnknownGroup(group) => write!(f, "未知のグループ: {}", group),
            LoadError::UnknownSource { group, name } => {
                write!(f, "未知のソース名: {} (グループ: {})", name, group)
            }
            LoadError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            LoadError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::IoError(_, err) => Some(err),
            LoadError::ParseError(_, err) => Some(err),
            _ => None,
        }
    }
}

/// 検索エラー（ロケーター経由のエンティティ取得）
#[derive(Debug)]
pub enum FindError {
    Load(LoadError),
    /// 解決済みレコード集合に識別子が存在しない
    NotFound { group: String, id: String },
    /// 個別レコードの構築失敗（バッチ全体が失敗する）
    Record { id: String, source: RecordError },
}

impl fmt::Display for FindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindError::Load(err) => write!(f, "{}", err),
            FindError::NotFound { group, id } => {
                write!(f, "レコードが見つかりません: {} (グループ: {})", id, group)
            }
            FindError::Record { id, source } => write!(f, "レコード {} の構築に失敗: {}", id, source),
        }
    }
}

impl std::error::Error for FindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FindError::Load(err) => Some(err),
            FindError::Record { source, .. } => Some(source),
            FindError::NotFound { .. } => None,
        }
    }
}

impl From<LoadError> for FindError {
    fn from(err: LoadError) -> Self {
        FindError::Load(err)
    }
}

/// エラーメッセージ用のYAML値表示
pub(crate) fn display_value(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Sequence(_) => "[...]".to_string(),
        Value::Mapping(_) => "{...}".to_string(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, display_value(&tagged.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn test_type_mismatch_names_field() {
        let err = RecordError::type_mismatch(&Value::from("abc"), FieldType::Float).in_field("cal");
        assert_eq!(
            err,
            RecordError::TypeMismatch {
                field: Some("cal".to_string()),
                value: "\"abc\"".to_string(),
                expected: FieldType::Float,
            }
        );
        assert!(err.to_string().contains("cal"));
        assert!(err.to_string().contains("float"));
    }

    #[test]
    fn test_in_field_keeps_other_errors() {
        let err = RecordError::NoValidCoefficient.in_field("g1");
        assert_eq!(err, RecordError::NoValidCoefficient);
    }

    #[test]
    fn test_find_error_source_chain() {
        use std::error::Error;
        let err = FindError::Record {
            id: "x".to_string(),
            source: RecordError::UnrecognizedBase("round".to_string()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("round"));

        let err: FindError = LoadError::UnknownGroup("cartridges".to_string()).into();
        assert!(matches!(err, FindError::Load(LoadError::UnknownGroup(_))));
    }
}
