use crate::records::error::RecordError;
use crate::records::RawRecord;

/// レコードから構築されるエンティティの基本インターフェース
pub trait Record: Sized {
    /// レジストリ上のグループ名
    const GROUP: &'static str;

    /// 生レコードを検証してエンティティを構築
    fn from_record(raw: &RawRecord) -> Result<Self, RecordError>;
}
