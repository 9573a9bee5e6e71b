use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;
use crate::models::RawRow;

/// 解析带表头的 CSV, 每行转为 列名 -> 值
///
/// 单元格统一保留为字符串, 数量解析交给目录归一化处理。
/// 非 UTF-8 字节 (如 Windows-1252 导出) 按替换字符处理, 不中断导入。
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, StoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let mut rows = Vec::new();

    for (idx, record) in csv_reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("第 {} 行无法解析, 跳过: {}", idx + 2, e);
                continue;
            }
        };
        if std::str::from_utf8(record.as_slice()).is_err() {
            tracing::warn!("第 {} 行包含非 UTF-8 字符, 已替换", idx + 2);
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| {
                (
                    header.clone(),
                    Value::String(String::from_utf8_lossy(cell).into_owned()),
                )
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// 异步读取导入文件 (阻塞解析放到 blocking 线程)
pub async fn read_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>, StoreError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    tracing::info!("读取导入文件: {}", path.display());

    let start = std::time::Instant::now();
    let rows = tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        parse_rows(std::io::BufReader::new(file))
    })
    .await??;

    tracing::debug!("导入文件解析完成, {} 行, 耗时: {:?}", rows.len(), start.elapsed());
    Ok(rows)
}
