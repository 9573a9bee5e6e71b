use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::AuditReport;

/// 报告渲染器 (外部协作者)
pub trait ReportRenderer {
    fn render(&self, report: &AuditReport) -> Result<(), StoreError>;
}

/// 写出审计报告 CSV: 抬头信息 + 统计 + 全量明细
pub fn write_report_csv<W: Write>(report: &AuditReport, out: W) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    let session = &report.session;
    let stats = &report.stats;

    writer.write_record(["Fecha", session.date.as_str()])?;
    writer.write_record(["Tienda", session.store_name.as_str()])?;
    writer.write_record(["Responsable", session.responsible_name.as_str()])?;
    writer.write_record(["Auditor", report.auditor.as_str()])?;
    writer.write_record(["Observaciones", session.observations.as_deref().unwrap_or("")])?;
    writer.write_record(["Generado", report.generated_at.to_rfc3339().as_str()])?;
    writer.write_record(["Total productos", stats.total_products.to_string().as_str()])?;
    writer.write_record(["Productos escaneados", stats.scanned_products.to_string().as_str()])?;
    writer.write_record(["Discrepancias", stats.discrepancy_count.to_string().as_str()])?;
    writer.write_record(["Progreso %", stats.progress_percentage.to_string().as_str()])?;
    writer.write_record(["Coincidencia %", stats.match_percentage.to_string().as_str()])?;

    writer.write_record(["Código", "Producto", "Teórico", "Físico", "Diferencia", "Estado"])?;
    for row in &report.rows {
        writer.write_record(&[
            row.code.clone(),
            row.name.clone(),
            row.theoretical_quantity.to_string(),
            row.physical_quantity.to_string(),
            row.difference.to_string(),
            row.classification.label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 报告文件名: inventario_{tienda}_{日期}.csv
pub fn report_file_name(report: &AuditReport) -> String {
    let store: String = report
        .session
        .store_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("inventario_{}_{}.csv", store, report.session.date)
}

/// 写入指定目录的 CSV 渲染器
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    output_dir: PathBuf,
}

impl CsvReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, report: &AuditReport) -> PathBuf {
        self.output_dir.join(report_file_name(report))
    }
}

impl ReportRenderer for CsvReportWriter {
    fn render(&self, report: &AuditReport) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(report);
        let file = std::fs::File::create(&path)?;
        write_report_csv(report, file)?;
        tracing::info!("✓ 报告已导出: {}", path.display());
        Ok(())
    }
}

/// 异步导出 (fire-and-forget 场景使用), 返回写出的路径
pub async fn export_report(report: AuditReport, output_dir: &Path) -> Result<PathBuf, StoreError> {
    let writer = CsvReportWriter::new(output_dir);
    let path = writer.path_for(&report);
    tokio::task::spawn_blocking(move || writer.render(&report)).await??;
    Ok(path)
}
