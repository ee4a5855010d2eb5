//! # フィールド型検証
//!
//! レコードの生の値（`serde_yaml::Value`）を宣言された意味型に照らして検証します。
//! 検証は構造的なもので、暗黙の型変換は行いません。
//!
//! | 型 | 受理する値 |
//! |----|------------|
//! | `string` / `reference` | 文字列 |
//! | `float` | 任意の数値（整数を含む） |
//! | `percent` | 0以上1以下の数値 |
//! | `count` | 0以上の整数 |
//! | `int` | 任意の整数 |

use std::fmt;
use std::str::FromStr;

use serde_yaml::{Number, Value};

use crate::records::error::RecordError;

/// フィールドの意味型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Float,
    Percent,
    Count,
    Int,
    Reference,
}

impl FieldType {
    /// 型タグ文字列
    pub fn tag(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Percent => "percent",
            FieldType::Count => "count",
            FieldType::Int => "int",
            FieldType::Reference => "reference",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FieldType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "float" => Ok(FieldType::Float),
            "percent" => Ok(FieldType::Percent),
            "count" => Ok(FieldType::Count),
            "int" => Ok(FieldType::Int),
            "reference" => Ok(FieldType::Reference),
            _ => Err(RecordError::UnknownType(s.to_string())),
        }
    }
}

/// 値が型を満たすかどうか
pub fn check(value: &Value, field_type: FieldType) -> bool {
    match field_type {
        FieldType::String | FieldType::Reference => value.is_string(),
        FieldType::Float => value.is_number(),
        FieldType::Percent => match value.as_f64() {
            Some(v) => (0.0..=1.0).contains(&v),
            None => false,
        },
        FieldType::Count => as_number(value).is_some_and(Number::is_u64),
        FieldType::Int => as_number(value).is_some_and(is_integral),
    }
}

/// 値が型を満たさなければ`TypeMismatch`を返す
pub fn check_strict(value: &Value, field_type: FieldType) -> Result<(), RecordError> {
    if check(value, field_type) {
        Ok(())
    } else {
        Err(RecordError::type_mismatch(value, field_type))
    }
}

/// 型タグ文字列で検証（未知のタグは`UnknownType`）
pub fn check_tag(value: &Value, tag: &str) -> Result<bool, RecordError> {
    let field_type: FieldType = tag.parse()?;
    Ok(check(value, field_type))
}

fn as_number(value: &Value) -> Option<&Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

// 負の整数はi64、非負の整数はu64として保持される
fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_string_and_reference() {
        for ty in [FieldType::String, FieldType::Reference] {
            assert!(check(&yaml("\"hello\""), ty));
            assert!(check(&yaml("'42'"), ty));
            assert!(!check(&yaml("42"), ty));
            assert!(!check(&yaml("~"), ty));
        }
    }

    #[test]
    fn test_float_accepts_integers() {
        assert!(check(&yaml("0.308"), FieldType::Float));
        assert!(check(&yaml("168"), FieldType::Float));
        assert!(check(&yaml("-3"), FieldType::Float));
        assert!(!check(&yaml("\"0.308\""), FieldType::Float));
        assert!(!check(&yaml("true"), FieldType::Float));
    }

    #[test]
    fn test_percent_bounds_inclusive() {
        assert!(check(&yaml("0"), FieldType::Percent));
        assert!(check(&yaml("1"), FieldType::Percent));
        assert!(check(&yaml("0.5"), FieldType::Percent));
        assert!(check(&yaml("1.0"), FieldType::Percent));
        assert!(!check(&yaml("1.01"), FieldType::Percent));
        assert!(!check(&yaml("-0.1"), FieldType::Percent));
        assert!(!check(&yaml("\"0.5\""), FieldType::Percent));
    }

    #[test]
    fn test_count_requires_non_negative_integer() {
        assert!(check(&yaml("0"), FieldType::Count));
        assert!(check(&yaml("168"), FieldType::Count));
        assert!(!check(&yaml("-1"), FieldType::Count));
        assert!(!check(&yaml("168.0"), FieldType::Count));
        assert!(!check(&yaml("\"168\""), FieldType::Count));
    }

    #[test]
    fn test_int_accepts_any_integer() {
        assert!(check(&yaml("0"), FieldType::Int));
        assert!(check(&yaml("7"), FieldType::Int));
        assert!(check(&yaml("-7"), FieldType::Int));
        assert!(!check(&yaml("7.5"), FieldType::Int));
        assert!(!check(&yaml("seven"), FieldType::Int));
    }

    #[test]
    fn test_check_strict_reports_mismatch() {
        assert!(check_strict(&yaml("100"), FieldType::Count).is_ok());
        let err = check_strict(&yaml("-100"), FieldType::Count).unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { expected: FieldType::Count, .. }));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(check_tag(&yaml("0.5"), "percent"), Ok(true));
        assert_eq!(check_tag(&yaml("2"), "percent"), Ok(false));
        assert_eq!(
            check_tag(&yaml("0.5"), "decimal"),
            Err(RecordError::UnknownType("decimal".to_string()))
        );
    }

    #[test]
    fn test_tag_round_trip() {
        for ty in [
            FieldType::String,
            FieldType::Float,
            FieldType::Percent,
            FieldType::Count,
            FieldType::Int,
            FieldType::Reference,
        ] {
            assert_eq!(ty.tag().parse::<FieldType>(), Ok(ty));
        }
    }
}
