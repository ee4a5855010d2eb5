use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::trace;

use crate::models::traits::Record;
use crate::records::error::{FindError, RecordError};
use crate::records::field_type::{FieldType, check_strict};
use crate::records::locator::RecordLocator;
use crate::records::source::RecordSource;
use crate::records::RawRecord;

/// 必須フィールド
pub const MANDATORY: &[(&str, FieldType)] = &[
    ("name", FieldType::String),
    ("cal", FieldType::Float),
    ("grains", FieldType::Count),
];

/// 弾道係数フィールド（少なくとも1つが必須）
///
/// 並び順がデフォルトの抗力関数を決める宣言順になります。
pub const BALLISTIC_COEFFICIENT: &[(DragFunction, FieldType)] = &[
    (DragFunction::G1, FieldType::Float),
    (DragFunction::G7, FieldType::Float),
];

/// 任意フィールド
pub const OPTIONAL: &[(&str, FieldType)] = &[
    ("sd", FieldType::Float),
    ("intended", FieldType::String),
    ("base", FieldType::String),
    ("desc", FieldType::String),
];

/// 弾底形状ごとの推奨抗力関数
pub const DRAG_FUNCTION: &[(Base, DragFunction)] = &[
    (Base::Flat, DragFunction::G1),
    (Base::Boat, DragFunction::G7),
];

/// 抗力関数（基準抗力モデル）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragFunction {
    G1,
    G7,
}

impl DragFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragFunction::G1 => "g1",
            DragFunction::G7 => "g7",
        }
    }

    /// 抗力関数番号（G1 → 1, G7 → 7）
    pub fn number(&self) -> u8 {
        match self {
            DragFunction::G1 => 1,
            DragFunction::G7 => 7,
        }
    }

    /// 抗力関数名から番号へ変換（大文字小文字を区別しない）
    pub fn drag_number(name: &str) -> Result<u8, RecordError> {
        name.parse::<DragFunction>().map(|df| df.number())
    }
}

impl fmt::Display for DragFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DragFunction {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g1" => Ok(DragFunction::G1),
            "g7" => Ok(DragFunction::G7),
            _ => Err(RecordError::UnknownDragFunction(s.to_string())),
        }
    }
}

/// 弾底形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base {
    /// フラットベース
    Flat,
    /// ボートテール
    Boat,
}

impl Base {
    /// 弾底形状の一般的な表記を正規化
    ///
    /// 小文字化し、ハイフン・アンダースコア・空白を除去した上で照合します。
    /// `boat`, `boattail`, `bt` → `Boat`、`flat`, `flatbase`, `fb` → `Flat`。
    pub fn normalize(candidate: &str) -> Result<Self, RecordError> {
        let c: String = candidate
            .to_lowercase()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect();
        match c.as_str() {
            "boat" | "boattail" | "bt" => Ok(Base::Boat),
            "flat" | "flatbase" | "fb" => Ok(Base::Flat),
            _ => Err(RecordError::UnrecognizedBase(candidate.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Base::Flat => "flat",
            Base::Boat => "boat",
        }
    }

    /// 構造上推奨される抗力関数
    pub fn preferred_drag_function(&self) -> DragFunction {
        match self {
            Base::Flat => DragFunction::G1,
            Base::Boat => DragFunction::G7,
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Base {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Base::normalize(s)
    }
}

/// 弾道計算に渡す抗力パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragParams {
    pub drag_function: DragFunction,
    pub drag_number: u8,
    pub ballistic_coefficient: f64,
}

/// 弾丸エンティティ
///
/// 1件の生レコードを検証・正規化して保持します。構築後は不変で、
/// 推奨抗力関数のみ初回参照時に計算してキャッシュします。
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    name: String,
    cal: f64,
    grains: u64,
    g1: Option<f64>,
    g7: Option<f64>,
    sd: Option<f64>,
    intended: Option<String>,
    base: Option<Base>,
    desc: Option<String>,
    ballistic_coefficient: BTreeMap<DragFunction, f64>,
    /// 宣言順で最初に存在する弾道係数
    default_bc: (DragFunction, f64),
    extra: Mapping,
    yaml_data: RawRecord,
    resolved: OnceLock<(DragFunction, f64)>,
}

/// 検証済みフィールドの一時格納先
#[derive(Default)]
struct Fields {
    name: Option<String>,
    cal: Option<f64>,
    grains: Option<u64>,
    sd: Option<f64>,
    intended: Option<String>,
    base: Option<Base>,
    desc: Option<String>,
}

impl Fields {
    /// 型検証を通過した値をフィールドに格納
    fn bind(&mut self, field: &str, value: &Value) -> Result<(), RecordError> {
        match field {
            "name" => self.name = value.as_str().map(str::to_string),
            "cal" => self.cal = value.as_f64(),
            "grains" => self.grains = value.as_u64(),
            "sd" => self.sd = value.as_f64(),
            "intended" => self.intended = value.as_str().map(str::to_string),
            "desc" => self.desc = value.as_str().map(str::to_string),
            "base" => {
                if let Some(candidate) = value.as_str() {
                    self.base = Some(Base::normalize(candidate)?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Projectile {
    /// 生レコードから弾丸を構築
    ///
    /// 必須フィールド、弾道係数、任意フィールドの順に検証し、
    /// スキーマに含まれないキーは`extra`に保持します。
    pub fn new(raw: &RawRecord) -> Result<Self, RecordError> {
        let mut fields = Fields::default();

        for &(field, field_type) in MANDATORY {
            let value = raw
                .get(field)
                .ok_or_else(|| RecordError::MissingMandatoryField(field.to_string()))?;
            check_strict(value, field_type).map_err(|e| e.in_field(field))?;
            fields.bind(field, value)?;
        }

        let mut ballistic_coefficient = BTreeMap::new();
        for &(drag_function, field_type) in BALLISTIC_COEFFICIENT {
            let field = drag_function.as_str();
            if let Some(value) = raw.get(field) {
                check_strict(value, field_type).map_err(|e| e.in_field(field))?;
                if let Some(bc) = value.as_f64() {
                    ballistic_coefficient.insert(drag_function, bc);
                }
            }
        }
        let default_bc = match ballistic_coefficient.first_key_value() {
            Some((&df, &bc)) => (df, bc),
            None => return Err(RecordError::NoValidCoefficient),
        };

        for &(field, field_type) in OPTIONAL {
            if let Some(value) = raw.get(field) {
                let value = if field == "intended" {
                    stringify(value)
                } else {
                    value.clone()
                };
                check_strict(&value, field_type).map_err(|e| e.in_field(field))?;
                fields.bind(field, &value)?;
            }
        }

        let mut extra = Mapping::new();
        for (key, value) in raw {
            if !key.as_str().is_some_and(is_schema_field) {
                extra.insert(key.clone(), value.clone());
            }
        }

        let Fields { name, cal, grains, sd, intended, base, desc } = fields;
        let projectile = Self {
            name: name.ok_or_else(|| RecordError::MissingMandatoryField("name".to_string()))?,
            cal: cal.ok_or_else(|| RecordError::MissingMandatoryField("cal".to_string()))?,
            grains: grains.ok_or_else(|| RecordError::MissingMandatoryField("grains".to_string()))?,
            g1: ballistic_coefficient.get(&DragFunction::G1).copied(),
            g7: ballistic_coefficient.get(&DragFunction::G7).copied(),
            sd,
            intended,
            base,
            desc,
            ballistic_coefficient,
            default_bc,
            extra,
            yaml_data: raw.clone(),
            resolved: OnceLock::new(),
        };
        trace!(name = %projectile.name, extra = projectile.extra.len(), "弾丸を構築");

        Ok(projectile)
    }

    /// 識別子で弾丸を1件検索
    pub fn find_by_id<S: RecordSource>(
        locator: &RecordLocator<S>,
        file: Option<&str>,
        id: &str,
    ) -> Result<Self, FindError> {
        locator.find(file, id)
    }

    /// 弾丸を全件検索（識別子順はソースの記述順）
    pub fn find<S: RecordSource>(
        locator: &RecordLocator<S>,
        file: Option<&str>,
    ) -> Result<IndexMap<String, Self>, FindError> {
        locator.find_all(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 口径（インチ）
    pub fn cal(&self) -> f64 {
        self.cal
    }

    /// 弾頭重量（グレイン）
    pub fn grains(&self) -> u64 {
        self.grains
    }

    pub fn g1(&self) -> Option<f64> {
        self.g1
    }

    pub fn g7(&self) -> Option<f64> {
        self.g7
    }

    /// 断面密度
    pub fn sd(&self) -> Option<f64> {
        self.sd
    }

    pub fn intended(&self) -> Option<&str> {
        self.intended.as_deref()
    }

    pub fn base(&self) -> Option<Base> {
        self.base
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn ballistic_coefficient(&self) -> &BTreeMap<DragFunction, f64> {
        &self.ballistic_coefficient
    }

    /// スキーマに含まれないフィールド
    pub fn extra(&self) -> &Mapping {
        &self.extra
    }

    /// 構築元の生レコード
    pub fn yaml_data(&self) -> &RawRecord {
        &self.yaml_data
    }

    /// 推奨抗力関数
    ///
    /// デフォルトは宣言順で最初に存在する弾道係数。弾底形状が指定されていて、
    /// その推奨抗力関数の弾道係数が存在する場合はそちらを優先します。
    pub fn drag_function(&self) -> DragFunction {
        self.resolved().0
    }

    /// 推奨抗力関数に対する弾道係数
    pub fn bc(&self) -> f64 {
        self.resolved().1
    }

    pub fn params(&self) -> DragParams {
        let (drag_function, ballistic_coefficient) = *self.resolved();
        DragParams {
            drag_function,
            drag_number: drag_function.number(),
            ballistic_coefficient,
        }
    }

    /// 複数行の概要テキスト
    pub fn multiline(&self) -> String {
        let mut lines = vec![format!("PROJECTILE: {}", self.name), "==========".to_string()];
        let mut fields = vec![
            ("Caliber".to_string(), self.cal.to_string()),
            ("Grains".to_string(), self.grains.to_string()),
        ];
        for (df, bc) in &self.ballistic_coefficient {
            fields.push((format!("BC ({})", df.as_str().to_uppercase()), bc.to_string()));
        }
        if let Some(desc) = &self.desc {
            fields.push(("Desc".to_string(), desc.clone()));
        }
        for (label, value) in fields {
            lines.push(format!("{:>7}: {}", label, value));
        }
        lines.join("\n")
    }

    fn resolved(&self) -> &(DragFunction, f64) {
        self.resolved.get_or_init(|| {
            let preferred = self.base.map(|base| base.preferred_drag_function());
            match preferred.and_then(|df| self.ballistic_coefficient.get(&df).map(|&bc| (df, bc))) {
                Some(choice) => choice,
                None => self.default_bc,
            }
        })
    }
}

impl Record for Projectile {
    const GROUP: &'static str = "projectiles";

    fn from_record(raw: &RawRecord) -> Result<Self, RecordError> {
        Projectile::new(raw)
    }
}

impl fmt::Display for Projectile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.multiline())
    }
}

fn is_schema_field(key: &str) -> bool {
    MANDATORY.iter().any(|&(field, _)| field == key)
        || BALLISTIC_COEFFICIENT.iter().any(|&(df, _)| df.as_str() == key)
        || OPTIONAL.iter().any(|&(field, _)| field == key)
}

/// スカラー値を文字列表現に変換（シーケンス・マッピングはそのまま）
fn stringify(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Null => Value::String(String::new()),
        other => other.clone(),
    }
}
