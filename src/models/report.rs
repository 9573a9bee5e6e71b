use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionInfo;

/// 四舍五入的整数百分比, 分母为 0 时返回 0
pub fn percentage(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let numerator = numerator as u128 * 100;
    let denominator = denominator as u128;
    ((numerator + denominator / 2) / denominator) as u32
}

/// 差异分类 (派生值, 不存储)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Match,
    Surplus,
    Shortage,
}

impl Classification {
    /// 按实盘与理论数量分类
    pub fn from_quantities(physical: u32, theoretical: u32) -> Self {
        use std::cmp::Ordering;
        match physical.cmp(&theoretical) {
            Ordering::Equal => Classification::Match,
            Ordering::Greater => Classification::Surplus,
            Ordering::Less => Classification::Shortage,
        }
    }

    /// 报告中使用的字面标签
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Match => "CORRECTO",
            Classification::Surplus => "EXCEDENTE",
            Classification::Shortage => "FALTANTE",
        }
    }

    /// 扫描确认提示
    pub fn message(&self) -> &'static str {
        match self {
            Classification::Match => "Cantidad correcta",
            Classification::Surplus => "Exceso de cantidad",
            Classification::Shortage => "Faltante detectado",
        }
    }

    pub fn is_discrepancy(&self) -> bool {
        *self != Classification::Match
    }
}

/// 报告明细行 (实时视图与导出报告共用)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub code: String,
    pub name: String,
    pub theoretical_quantity: u32,
    pub physical_quantity: u32,
    pub difference: i64,   // 实盘 - 理论
    pub classification: Classification,
}

/// 汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_products: usize,
    pub scanned_products: usize,
    pub discrepancy_count: usize,
    pub progress_percentage: u32,
    pub match_percentage: u32,
}

/// 扫描计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub distinct_scanned_count: usize,
    pub total_scanned_units: u64,
}

/// 扫描统计 (快照 + 差异数 + 完成度)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub total_scanned: usize,
    pub total_items: u64,
    pub discrepancies: usize,
    pub completion_percentage: u32,
}

/// 最终审计报告, 交给渲染器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub session: SessionInfo,
    pub auditor: String,
    pub stats: AggregateStats,
    pub rows: Vec<ReportRow>,
    pub generated_at: DateTime<Utc>,
}
