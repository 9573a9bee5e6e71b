use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::db::{self, KeyValueStore};
use crate::error::ReconcileError;
use crate::models::{AuditReport, HistoryEntry, UNIDENTIFIED_AUDITOR};
use crate::service::{AuditSession, HistoryLedger};

/// 当前用户提供者 (认证在本服务之外)
pub trait CurrentUser {
    fn display_name(&self) -> Option<String>;
}

/// 固定名称的当前用户, 通常来自配置
#[derive(Debug, Clone, Default)]
pub struct StaticUser(pub Option<String>);

impl CurrentUser for StaticUser {
    fn display_name(&self) -> Option<String> {
        self.0.clone().filter(|name| !name.trim().is_empty())
    }
}

/// 盘点服务: 组合会话上下文、历史记录与当前用户
pub struct AuditService<S: KeyValueStore> {
    session: AuditSession,
    history: HistoryLedger<S>,
    user: Box<dyn CurrentUser + Send + Sync>,
}

impl<S: KeyValueStore> AuditService<S> {
    pub fn new(store: S, user: Box<dyn CurrentUser + Send + Sync>) -> Self {
        Self {
            session: AuditSession::new(),
            history: HistoryLedger::open(store),
            user,
        }
    }

    pub fn session(&self) -> &AuditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AuditSession {
        &mut self.session
    }

    pub fn history(&self) -> &HistoryLedger<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLedger<S> {
        &mut self.history
    }

    /// 审计员名称, 在生成报告时读取一次
    pub fn auditor_name(&self) -> String {
        self.user
            .display_name()
            .unwrap_or_else(|| UNIDENTIFIED_AUDITOR.to_string())
    }

    /// 异步导入 CSV; 失败时保留原有库存
    pub async fn import_csv(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let rows = db::read_rows(path).await?;
        Ok(self.session.load_catalog(&rows))
    }

    /// 生成最终报告 (不写历史)
    pub fn build_report(&self) -> Result<AuditReport, ReconcileError> {
        let info = self
            .session
            .info()
            .cloned()
            .ok_or(ReconcileError::SessionInfoNotSet)?;
        if self.session.catalog().is_empty() {
            return Err(ReconcileError::EmptyCatalog);
        }

        let report = AuditReport {
            session: info,
            auditor: self.auditor_name(),
            stats: self.session.aggregate(),
            rows: self.session.full_report(),
            generated_at: Utc::now(),
        };

        tracing::info!(
            "报告生成完成 - 商品: {}, 已扫描: {}, 差异: {}",
            report.stats.total_products,
            report.stats.scanned_products,
            report.stats.discrepancy_count
        );
        Ok(report)
    }

    /// 报告写入历史; 保存失败只记录日志
    fn record_history(&mut self, entry: HistoryEntry) {
        if let Err(e) = self.history.append(entry) {
            tracing::error!("✗ 历史记录写入失败: {}", e);
        }
    }

    /// 生成最终报告并写入历史
    pub fn finalize_report(&mut self) -> Result<AuditReport, ReconcileError> {
        let report = self.build_report()?;
        self.record_history(HistoryEntry::from_report(&report));
        Ok(report)
    }

    /// 生成报告并导出 CSV, 导出成功后才写入历史, 返回文件路径
    pub async fn finalize_and_export(
        &mut self,
        output_dir: &Path,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let report = self.build_report()?;
        let entry = HistoryEntry::from_report(&report);
        let path = db::export_report(report, output_dir).await?;
        self.record_history(entry);
        Ok(path)
    }
}
