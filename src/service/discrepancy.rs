//! 差异计算 - 基于理论库存与实盘计数的纯函数

use std::cmp::Reverse;

use crate::models::{
    percentage, AggregateStats, Classification, ProductRecord, ReportRow, ScanStatistics,
};
use crate::service::{InventoryCatalog, ReconciliationStore};

/// 单个商品分类, 未扫描按 0 计
pub fn classify(product: &ProductRecord, store: &ReconciliationStore) -> Classification {
    Classification::from_quantities(store.counted(&product.code), product.theoretical_quantity)
}

pub fn compute_aggregate(catalog: &InventoryCatalog, store: &ReconciliationStore) -> AggregateStats {
    let total_products = catalog.len();
    let scanned_products = store.len();
    let discrepancy_count = catalog
        .products()
        .iter()
        .filter(|p| classify(p, store).is_discrepancy())
        .count();

    AggregateStats {
        total_products,
        scanned_products,
        discrepancy_count,
        progress_percentage: percentage(scanned_products, total_products),
        match_percentage: percentage(total_products - discrepancy_count, total_products),
    }
}

/// 扫描统计: 计数快照 + 差异数 + 完成度
pub fn scan_statistics(catalog: &InventoryCatalog, store: &ReconciliationStore) -> ScanStatistics {
    let snapshot = store.statistics_snapshot();
    let stats = compute_aggregate(catalog, store);
    ScanStatistics {
        total_scanned: snapshot.distinct_scanned_count,
        total_items: snapshot.total_scanned_units,
        discrepancies: stats.discrepancy_count,
        completion_percentage: stats.progress_percentage,
    }
}

fn report_row(product: &ProductRecord, store: &ReconciliationStore) -> ReportRow {
    let physical_quantity = store.counted(&product.code);
    ReportRow {
        code: product.code.clone(),
        name: product.name.clone(),
        theoretical_quantity: product.theoretical_quantity,
        physical_quantity,
        difference: i64::from(physical_quantity) - i64::from(product.theoretical_quantity),
        classification: Classification::from_quantities(physical_quantity, product.theoretical_quantity),
    }
}

/// 全量报告: 每个理论商品一行, 保持导入顺序
pub fn build_full_report(catalog: &InventoryCatalog, store: &ReconciliationStore) -> Vec<ReportRow> {
    catalog
        .products()
        .iter()
        .map(|p| report_row(p, store))
        .collect()
}

/// 按扫描数量降序取前 limit 个编码, 并列时保持首次扫描顺序
///
/// 注意: 这是数量排名, 不是真正的"最近扫描"。
pub fn top_scanned_by_volume(store: &ReconciliationStore, limit: usize) -> Vec<String> {
    let mut ranked: Vec<(&str, u32)> = store.iter().collect();
    ranked.sort_by_key(|(_, qty)| Reverse(*qty));
    ranked
        .into_iter()
        .take(limit)
        .map(|(code, _)| code.to_string())
        .collect()
}

/// "最近扫描"视图: 排名结果关联理论商品, 找不到商品的编码跳过
pub fn recent_scans(catalog: &InventoryCatalog, store: &ReconciliationStore, limit: usize) -> Vec<ReportRow> {
    top_scanned_by_volume(store, limit)
        .iter()
        .filter_map(|code| catalog.find_by_code(code))
        .map(|p| report_row(p, store))
        .collect()
}
