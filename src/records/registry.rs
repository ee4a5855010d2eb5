use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::records::error::LoadError;

/// レコードグループのレジストリ
///
/// グループ名（例: `projectiles`）から、そのグループで利用可能なソース名の
/// 順序付きリストへの対応を保持します。プロセス開始時に一度構築し、
/// ロケーターへ渡します。参照時に状態を変更することはありません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    groups: IndexMap<String, Vec<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// グループを追加（同名のグループは置き換え）
    pub fn with_group<I, S>(mut self, group: &str, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(group.to_string(), sources.into_iter().map(Into::into).collect());
        self
    }

    /// ディレクトリを走査してレジストリを構築
    ///
    /// `root`直下のサブディレクトリのうち`*.yaml`を含むものをグループとし、
    /// ファイル名（拡張子なし）をソース名として名前順に登録します。
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self, LoadError> {
        let root = root.as_ref();
        let mut dirs: Vec<_> = fs::read_dir(root)
            .map_err(|e| LoadError::IoError(root.to_path_buf(), e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut registry = Self::new();
        for dir in dirs {
            let mut sources: Vec<String> = fs::read_dir(&dir)
                .map_err(|e| LoadError::IoError(dir.clone(), e))?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            if sources.is_empty() {
                continue;
            }
            sources.sort();

            let Some(group) = dir.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!(group, count = sources.len(), "レコードグループを登録");
            registry.groups.insert(group.to_string(), sources);
        }

        Ok(registry)
    }

    /// グループのソース名一覧
    pub fn sources(&self, group: &str) -> Result<&[String], LoadError> {
        self.groups
            .get(group)
            .map(Vec::as_slice)
            .ok_or_else(|| LoadError::UnknownGroup(group.to_string()))
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|sources| sources.iter().any(|s| s == name))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(g, s)| (g.as_str(), s.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_by_group() {
        let registry = Registry::new().with_group("projectiles", ["308", "223"]);
        assert_eq!(registry.sources("projectiles").unwrap(), ["308", "223"]);
        assert!(registry.contains("projectiles", "223"));
        assert!(!registry.contains("projectiles", "6_5"));
        assert!(!registry.contains("cartridges", "308"));
    }

    #[test]
    fn test_unknown_group() {
        let registry = Registry::new().with_group("projectiles", ["308"]);
        let err = registry.sources("cartridges").unwrap_err();
        assert!(matches!(err, LoadError::UnknownGroup(ref g) if g == "cartridges"));
    }

    #[test]
    fn test_with_group_replaces() {
        let registry = Registry::new()
            .with_group("projectiles", ["a"])
            .with_group("projectiles", ["b", "c"]);
        assert_eq!(registry.sources("projectiles").unwrap(), ["b", "c"]);
        assert_eq!(registry.groups().count(), 1);
    }

    #[test]
    fn test_scan_missing_root() {
        let err = Registry::scan("/nonexistent/ballistics/data").unwrap_err();
        assert!(matches!(err, LoadError::IoError(..)));
    }
}
