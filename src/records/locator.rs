use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::models::traits::Record;
use crate::records::error::{FindError, LoadError};
use crate::records::registry::Registry;
use crate::records::source::RecordSource;
use crate::records::{RawRecord, RecordSet};

/// レコードロケーター
///
/// レジストリとソースを組み合わせ、グループ名と任意のソース名・識別子から
/// 生レコードを解決します。エンティティの構築は`Record`実装側が行います。
pub struct RecordLocator<S: RecordSource> {
    registry: Registry,
    source: S,
}

impl<S: RecordSource> RecordLocator<S> {
    pub fn new(registry: Registry, source: S) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 候補レコード集合を解決
    ///
    /// `file`を指定した場合はそのソースのみ、省略した場合はグループ内の全ソースを
    /// 登録順に読み込んで統合します。識別子が重複した場合は後のソースが優先されます。
    pub fn candidates(&self, group: &str, file: Option<&str>) -> Result<RecordSet, LoadError> {
        let sources = self.registry.sources(group)?;

        if let Some(name) = file {
            if !sources.iter().any(|s| s == name) {
                return Err(LoadError::UnknownSource {
                    group: group.to_string(),
                    name: name.to_string(),
                });
            }
            return self.source.load(group, name);
        }

        let mut candidates = RecordSet::new();
        let mut origin: IndexMap<String, &str> = IndexMap::new();
        for name in sources {
            let records = self.source.load(group, name)?;
            debug!(group, source = %name, count = records.len(), "ソースを統合");
            for (id, record) in records {
                if let Some(previous) = origin.insert(id.clone(), name.as_str()) {
                    warn!(group, id = %id, previous, source = %name, "識別子が重複しています（後のソースで上書き）");
                }
                candidates.insert(id, record);
            }
        }
        Ok(candidates)
    }

    /// 識別子で生レコードを1件取得（構築は行わない）
    pub fn find_raw(&self, group: &str, file: Option<&str>, id: &str) -> Result<RawRecord, FindError> {
        let mut candidates = self.candidates(group, file)?;
        candidates.swap_remove(id).ok_or_else(|| FindError::NotFound {
            group: group.to_string(),
            id: id.to_string(),
        })
    }

    /// 識別子でエンティティを1件構築
    pub fn find<T: Record>(&self, file: Option<&str>, id: &str) -> Result<T, FindError> {
        let raw = self.find_raw(T::GROUP, file, id)?;
        T::from_record(&raw).map_err(|source| FindError::Record {
            id: id.to_string(),
            source,
        })
    }

    /// グループ内の全エンティティを構築
    ///
    /// 1件でも構築に失敗した場合はバッチ全体が失敗します。
    pub fn find_all<T: Record>(&self, file: Option<&str>) -> Result<IndexMap<String, T>, FindError> {
        self.find_all_where(file, |_: &T| true)
    }

    /// 述語で絞り込みながら全エンティティを構築
    ///
    /// 述語が`false`を返したエンティティのみ除外し、構築エラーは握りつぶさずに返します。
    pub fn find_all_where<T, F>(
        &self,
        file: Option<&str>,
        mut predicate: F,
    ) -> Result<IndexMap<String, T>, FindError>
    where
        T: Record,
        F: FnMut(&T) -> bool,
    {
        let candidates = self.candidates(T::GROUP, file)?;
        let mut objects = IndexMap::with_capacity(candidates.len());
        for (id, raw) in candidates {
            let object = T::from_record(&raw).map_err(|source| FindError::Record {
                id: id.clone(),
                source,
            })?;
            if predicate(&object) {
                objects.insert(id, object);
            }
        }
        Ok(objects)
    }
}
