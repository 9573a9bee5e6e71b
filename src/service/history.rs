use crate::db::KeyValueStore;
use crate::error::StoreError;
use crate::models::HistoryEntry;

/// 历史记录的存储键
pub const HISTORY_KEY: &str = "inventoryHistory";

/// 最多保留的历史条数
pub const HISTORY_LIMIT: usize = 5;

/// 最近盘点记录 - 新记录在前, 最多保留 5 条
pub struct HistoryLedger<S: KeyValueStore> {
    store: S,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryLedger<S> {
    /// 创建并从存储恢复
    pub fn open(store: S) -> Self {
        let mut ledger = Self {
            store,
            entries: Vec::new(),
        };
        ledger.load();
        ledger
    }

    /// 从存储重建, 数据损坏时返回空列表
    pub fn load(&mut self) -> &[HistoryEntry] {
        self.entries = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_LIMIT);
                    entries
                }
                Err(e) => {
                    tracing::warn!("历史记录格式错误, 按空列表处理: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("读取历史记录失败, 按空列表处理: {}", e);
                Vec::new()
            }
        };
        &self.entries
    }

    /// 插入到最前面, 超出上限截掉最旧的, 然后持久化
    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json).map_err(|e| {
            tracing::error!("✗ 历史记录保存失败: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{AggregateStats, SessionInfo};
    use chrono::{TimeZone, Utc};

    fn entry(n: i64) -> HistoryEntry {
        let info = SessionInfo::new("2024-05-01", &format!("Tienda {}", n), "Ana", None).unwrap();
        let ts = Utc.timestamp_opt(1_700_000_000 + n, 0).unwrap();
        HistoryEntry::from_parts(&info, "Auditor", &AggregateStats::default(), ts)
    }

    #[test]
    fn keeps_five_newest_first() {
        let mut ledger = HistoryLedger::open(MemoryStore::new());
        for n in 1..=7 {
            ledger.append(entry(n)).unwrap();
        }

        let stores: Vec<_> = ledger.entries().iter().map(|e| e.store.as_str()).collect();
        assert_eq!(stores, vec!["Tienda 7", "Tienda 6", "Tienda 5", "Tienda 4", "Tienda 3"]);
    }

    #[test]
    fn append_persists_bounded_list() {
        let mut ledger = HistoryLedger::open(MemoryStore::new());
        for n in 1..=6 {
            ledger.append(entry(n)).unwrap();
        }

        let reopened = HistoryLedger::open(ledger.store().clone());
        assert_eq!(reopened.len(), HISTORY_LIMIT);
        assert_eq!(reopened.entries()[0], entry(6));
    }

    #[test]
    fn malformed_data_loads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        let ledger = HistoryLedger::open(store);
        assert!(ledger.is_empty());
    }

    #[test]
    fn clear_persists_empty_state() {
        let mut ledger = HistoryLedger::open(MemoryStore::new());
        ledger.append(entry(1)).unwrap();
        ledger.clear().unwrap();

        assert!(ledger.is_empty());
        assert_eq!(ledger.store().get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }
}
