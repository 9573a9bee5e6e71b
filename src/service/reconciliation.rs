use indexmap::IndexMap;

use crate::error::ReconcileError;
use crate::models::{QuantityChange, ScanOutcome, ScanSnapshot};
use crate::service::InventoryCatalog;

/// 实盘计数 - 跟踪每个编码的已扫描数量
///
/// 使用 IndexMap 保留首次扫描顺序, 排序并列时按该顺序稳定输出。
/// 不保留数量为 0 的条目。
#[derive(Debug, Clone, Default)]
pub struct ReconciliationStore {
    counts: IndexMap<String, u32>,
}

impl ReconciliationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一次扫描: 新编码记为 1, 重复扫描 +1
    pub fn register_scan(
        &mut self,
        catalog: &InventoryCatalog,
        code: &str,
    ) -> Result<ScanOutcome, ReconcileError> {
        let product = lookup(catalog, code)?;

        let quantity = self.counts.entry(code.to_string()).or_insert(0);
        *quantity = quantity.saturating_add(1);

        Ok(ScanOutcome {
            product: product.clone(),
            quantity: *quantity,
        })
    }

    /// 手工设置数量, 0 等同删除
    pub fn set_quantity(
        &mut self,
        catalog: &InventoryCatalog,
        code: &str,
        quantity: i64,
    ) -> Result<QuantityChange, ReconcileError> {
        let quantity = u32::try_from(quantity)
            .map_err(|_| ReconcileError::InvalidQuantity(quantity.to_string()))?;

        if quantity == 0 {
            let previous = self.counts.shift_remove(code);
            return Ok(QuantityChange { previous, current: 0 });
        }

        lookup(catalog, code)?;
        let previous = self.counts.insert(code.to_string(), quantity);
        Ok(QuantityChange { previous, current: quantity })
    }

    /// 删除条目, 不存在时忽略
    pub fn remove_entry(&mut self, code: &str) -> Option<u32> {
        self.counts.shift_remove(code)
    }

    pub fn clear_all(&mut self) {
        self.counts.clear();
    }

    /// 已扫描数量, 未扫描为 None
    pub fn get(&self, code: &str) -> Option<u32> {
        self.counts.get(code).copied()
    }

    /// 未扫描视为 0
    pub fn counted(&self, code: &str) -> u32 {
        self.get(code).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 按首次扫描顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(code, qty)| (code.as_str(), *qty))
    }

    pub fn statistics_snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            distinct_scanned_count: self.counts.len(),
            total_scanned_units: self.counts.values().map(|q| u64::from(*q)).sum(),
        }
    }
}

/// 解析手工输入的数量: 只接受非负整数
pub fn parse_quantity(input: &str) -> Result<i64, ReconcileError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReconcileError::InvalidQuantity(input.to_string()));
    }
    trimmed
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| ReconcileError::InvalidQuantity(input.to_string()))
}

fn lookup<'a>(
    catalog: &'a InventoryCatalog,
    code: &str,
) -> Result<&'a crate::models::ProductRecord, ReconcileError> {
    if catalog.is_empty() {
        return Err(ReconcileError::EmptyCatalog);
    }
    catalog
        .find_by_code(code)
        .ok_or_else(|| ReconcileError::UnknownProduct(code.to_string()))
}
