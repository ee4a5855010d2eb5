use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::records::error::LoadError;
use crate::records::RecordSet;

/// レコードソースのインターフェース
///
/// グループ名とソース名から、識別子をキーとする生レコード集合を読み込みます。
/// 読み込み形式はソースの実装に委ねられ、ロケーターは解析済みのマッピングのみを扱います。
pub trait RecordSource {
    fn load(&self, group: &str, name: &str) -> Result<RecordSet, LoadError>;
}

/// `<root>/<group>/<name>.yaml` を読み込むソース
#[derive(Debug, Clone)]
pub struct YamlDirectory {
    root: PathBuf,
}

impl YamlDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, group: &str, name: &str) -> PathBuf {
        self.root.join(group).join(format!("{}.yaml", name))
    }
}

impl RecordSource for YamlDirectory {
    fn load(&self, group: &str, name: &str) -> Result<RecordSet, LoadError> {
        let path = self.path_for(group, name);
        debug!(path = %path.display(), "YAMLソースを読み込み");

        let contents = fs::read_to_string(&path).map_err(|e| LoadError::IoError(path.clone(), e))?;
        parse_record_set(&path, &contents)
    }
}

/// メモリ上に保持したレコード集合をソースとして提供
///
/// テストや組み込みデータ用。
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sets: HashMap<(String, String), RecordSet>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: &str, name: &str, records: RecordSet) {
        self.sets.insert((group.to_string(), name.to_string()), records);
    }

    /// YAMLテキストを解析して登録
    pub fn insert_yaml(&mut self, group: &str, name: &str, yaml: &str) -> Result<(), LoadError> {
        let label = PathBuf::from(format!("<memory>/{}/{}", group, name));
        let records = parse_record_set(&label, yaml)?;
        self.insert(group, name, records);
        Ok(())
    }
}

impl RecordSource for MemorySource {
    fn load(&self, group: &str, name: &str) -> Result<RecordSet, LoadError> {
        self.sets
            .get(&(group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| LoadError::UnknownSource {
                group: group.to_string(),
                name: name.to_string(),
            })
    }
}

fn parse_record_set(path: &Path, contents: &str) -> Result<RecordSet, LoadError> {
    // 空ファイルはレコードなしとして扱う
    if contents.trim().is_empty() {
        return Ok(RecordSet::new());
    }
    serde_yaml::from_str(contents).map_err(|e| LoadError::ParseError(path.to_path_buf(), e))
}
