use crate::error::ReconcileError;
use crate::models::{
    AggregateStats, ProductRecord, QuantityChange, RawRow, ReportRow, ScanOutcome, ScanStatistics,
    SessionInfo,
};
use crate::service::{discrepancy, InventoryCatalog, ReconciliationStore};

/// 一次盘点的上下文: 理论库存 + 实盘计数 + 抬头信息
///
/// 所有修改都是同步的, 由上层按顺序调用。
#[derive(Debug, Default)]
pub struct AuditSession {
    catalog: InventoryCatalog,
    counts: ReconciliationStore,
    info: Option<SessionInfo>,
}

impl AuditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载新的理论库存, 同时清空实盘计数
    pub fn load_catalog(&mut self, rows: &[RawRow]) -> usize {
        let accepted = self.catalog.load(rows);
        self.counts.clear_all();
        accepted
    }

    /// 扫描一个条码; 空白输入忽略
    pub fn scan(&mut self, input: &str) -> Result<Option<ScanOutcome>, ReconcileError> {
        let code = input.trim();
        if code.is_empty() {
            return Ok(None);
        }

        match self.counts.register_scan(&self.catalog, code) {
            Ok(outcome) => {
                tracing::debug!(
                    "扫描 {} -> {}/{} {}",
                    code,
                    outcome.quantity,
                    outcome.product.theoretical_quantity,
                    outcome.classification().label()
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::warn!("Scan rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn set_quantity(&mut self, code: &str, quantity: i64) -> Result<QuantityChange, ReconcileError> {
        let change = self.counts.set_quantity(&self.catalog, code, quantity)?;
        tracing::info!(
            "数量修改 {}: {:?} -> {} (差值 {})",
            code,
            change.previous,
            change.current,
            change.delta()
        );
        Ok(change)
    }

    pub fn remove_entry(&mut self, code: &str) -> Option<u32> {
        let removed = self.counts.remove_entry(code);
        if removed.is_some() {
            tracing::info!("删除实盘记录 {}", code);
        }
        removed
    }

    pub fn clear_counts(&mut self) {
        tracing::info!("清空全部实盘记录 ({} 条)", self.counts.len());
        self.counts.clear_all();
    }

    pub fn save_info(&mut self, info: SessionInfo) {
        self.info = Some(info);
    }

    /// 退出登录时整体重置
    pub fn reset(&mut self) {
        self.catalog.clear();
        self.counts.clear_all();
        self.info = None;
    }

    pub fn info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    pub fn catalog(&self) -> &InventoryCatalog {
        &self.catalog
    }

    pub fn counts(&self) -> &ReconciliationStore {
        &self.counts
    }

    pub fn find_product(&self, code: &str) -> Option<&ProductRecord> {
        self.catalog.find_by_code(code)
    }

    pub fn aggregate(&self) -> AggregateStats {
        discrepancy::compute_aggregate(&self.catalog, &self.counts)
    }

    pub fn scan_statistics(&self) -> ScanStatistics {
        discrepancy::scan_statistics(&self.catalog, &self.counts)
    }

    pub fn full_report(&self) -> Vec<ReportRow> {
        discrepancy::build_full_report(&self.catalog, &self.counts)
    }

    pub fn recent_scans(&self, limit: usize) -> Vec<ReportRow> {
        discrepancy::recent_scans(&self.catalog, &self.counts, limit)
    }
}
