use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::{percentage, AggregateStats, AuditReport};
use crate::error::ReconcileError;

/// 当前用户不可用时的审计员名称
pub const UNIDENTIFIED_AUDITOR: &str = "No identificado";

/// 盘点抬头信息 (导出前必须填写)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub date: String,
    pub store_name: String,
    pub responsible_name: String,
    pub observations: Option<String>,
}

impl SessionInfo {
    /// 校验必填字段 (去除首尾空白后非空)
    pub fn new(
        date: &str,
        store_name: &str,
        responsible_name: &str,
        observations: Option<&str>,
    ) -> Result<Self, ReconcileError> {
        let date = required(date, "date")?;
        let store_name = required(store_name, "store")?;
        let responsible_name = required(responsible_name, "responsible")?;
        let observations = observations
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);

        Ok(Self {
            date,
            store_name,
            responsible_name,
            observations,
        })
    }

    /// 默认盘点日期: 本地当天 YYYY-MM-DD
    pub fn today() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ReconcileError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReconcileError::MissingSessionField(field));
    }
    Ok(value.to_string())
}

/// 历史记录 (不可变快照)
///
/// 键名使用 camelCase, 与浏览器端保存的历史格式兼容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub store: String,
    pub responsible: String,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub auditor: Option<String>,
    pub total_products: usize,
    pub scanned_products: usize,
    pub discrepancies: usize,
    #[serde(default)]
    pub match_percentage: u32,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_parts(session: &SessionInfo, auditor: &str, stats: &AggregateStats, timestamp: DateTime<Utc>) -> Self {
        Self {
            date: session.date.clone(),
            store: session.store_name.clone(),
            responsible: session.responsible_name.clone(),
            observations: session.observations.clone(),
            auditor: Some(auditor.to_string()),
            total_products: stats.total_products,
            scanned_products: stats.scanned_products,
            discrepancies: stats.discrepancy_count,
            match_percentage: stats.match_percentage,
            timestamp,
        }
    }

    pub fn from_report(report: &AuditReport) -> Self {
        Self::from_parts(&report.session, &report.auditor, &report.stats, report.generated_at)
    }

    /// 完成度百分比, 空库存为 0
    pub fn progress_percentage(&self) -> u32 {
        percentage(self.scanned_products, self.total_products)
    }
}
