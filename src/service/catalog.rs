use crate::models::{ProductRecord, RawRow};
use serde_json::Value;

/// 编码列候选名 (按优先级)
pub const CODE_COLUMNS: &[&str] = &[
    "Código",
    "codigo",
    "Codigo",
    "CODIGO",
    "Código de Barras",
    "SKU",
    "EAN",
];

/// 名称列候选名
pub const NAME_COLUMNS: &[&str] = &[
    "Producto",
    "producto",
    "PRODUCTO",
    "Descripción",
    "Descripcion",
    "Nombre",
    "Item",
];

/// 数量列候选名
pub const QUANTITY_COLUMNS: &[&str] = &[
    "Cantidad",
    "cantidad",
    "CANTIDAD",
    "Stock",
    "Existencia",
];

/// 理论库存 (每次导入整体替换, 加载后不再局部修改)
#[derive(Debug, Clone, Default)]
pub struct InventoryCatalog {
    products: Vec<ProductRecord>,
}

impl InventoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从原始行构建, 非法行直接过滤
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let products = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| normalize_row(row, idx + 1))
            .collect();
        Self { products }
    }

    /// 整体替换商品列表, 返回接受的行数
    pub fn load(&mut self, rows: &[RawRow]) -> usize {
        let next = Self::from_rows(rows);
        let dropped = rows.len() - next.products.len();
        if dropped > 0 {
            tracing::warn!("导入时丢弃 {} 行 (编码或名称为空)", dropped);
        }
        *self = next;
        tracing::info!("Theoretical inventory loaded: {} products", self.products.len());
        self.products.len()
    }

    /// 按编码精确查找, 重复编码取第一个
    pub fn find_by_code(&self, code: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.code == code)
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    /// 预览前 limit 个商品, 同时返回剩余数量
    pub fn preview(&self, limit: usize) -> (&[ProductRecord], usize) {
        let shown = limit.min(self.products.len());
        (&self.products[..shown], self.products.len() - shown)
    }
}

/// 单行归一化: 探测列名, 回退默认值, 去空白后为空则丢弃
fn normalize_row(row: &RawRow, position: usize) -> Option<ProductRecord> {
    let code = first_present(row, CODE_COLUMNS)
        .map(value_to_text)
        .unwrap_or_else(|| position.to_string());
    let name = first_present(row, NAME_COLUMNS)
        .map(value_to_text)
        .unwrap_or_else(|| format!("Producto {}", position));
    let quantity = first_present(row, QUANTITY_COLUMNS).map(parse_int).unwrap_or(0);

    let code = code.trim();
    let name = name.trim();
    if code.is_empty() || name.is_empty() {
        tracing::debug!("第 {} 行编码或名称为空, 跳过", position);
        return None;
    }

    Some(ProductRecord::new(code, name, quantity))
}

/// 返回第一个"有值"的候选列
pub fn first_present<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|v| is_present(v))
}

/// null / false / 空串 / 数值 0 视为缺失
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    _ => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// 宽松整数解析: 数值截断, 字符串取前导符号与数字; 负数/无法解析/溢出均为 0
pub fn parse_int(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    };
    parsed
        .filter(|n| *n >= 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn load_reads_column_variants_in_priority_order() {
        let rows = vec![
            row(json!({"Código": "A1", "SKU": "ignored", "Producto": "Widget", "Cantidad": 10})),
            row(json!({"SKU": " B2 ", "Descripción": " Gadget ", "Stock": "5"})),
            row(json!({"EAN": 7501234, "Item": "Tornillo", "Existencia": 3.0})),
        ];
        let mut catalog = InventoryCatalog::new();
        assert_eq!(catalog.load(&rows), 3);

        let products = catalog.products();
        assert_eq!(products[0], ProductRecord::new("A1", "Widget", 10));
        assert_eq!(products[1], ProductRecord::new("B2", "Gadget", 5));
        assert_eq!(products[2], ProductRecord::new("7501234", "Tornillo", 3));
    }

    #[test]
    fn missing_columns_fall_back_to_position_and_placeholder() {
        let rows = vec![
            row(json!({"Producto": "Solo nombre"})),
            row(json!({"Otra": "x"})),
        ];
        let catalog = InventoryCatalog::from_rows(&rows);
        assert_eq!(catalog.products()[0], ProductRecord::new("1", "Solo nombre", 0));
        assert_eq!(catalog.products()[1], ProductRecord::new("2", "Producto 2", 0));
    }

    #[test]
    fn blank_values_after_trim_drop_the_row() {
        let rows = vec![
            row(json!({"Código": "   ", "Producto": "Fantasma"})),
            row(json!({"Código": "C3", "Producto": "  "})),
            row(json!({"Código": "D4", "Producto": "Valido"})),
        ];
        let mut catalog = InventoryCatalog::new();
        assert_eq!(catalog.load(&rows), 1);
        assert_eq!(catalog.products()[0].code, "D4");
    }

    #[test]
    fn empty_or_zero_candidates_are_skipped() {
        let r = row(json!({"Código": "", "codigo": 0, "SKU": "S-9", "Producto": null, "Nombre": "Caja"}));
        let catalog = InventoryCatalog::from_rows(&[r]);
        assert_eq!(catalog.products()[0], ProductRecord::new("S-9", "Caja", 0));
    }

    #[test]
    fn quantity_parsing_is_lenient() {
        assert_eq!(parse_int(&json!("12.7")), 12);
        assert_eq!(parse_int(&json!(" 15 uds")), 15);
        assert_eq!(parse_int(&json!(8.9)), 8);
        assert_eq!(parse_int(&json!("abc")), 0);
        assert_eq!(parse_int(&json!("-4")), 0);
        assert_eq!(parse_int(&json!(-4)), 0);
        assert_eq!(parse_int(&json!("99999999999")), 0);
        assert_eq!(parse_int(&json!(true)), 0);
    }

    #[test]
    fn find_by_code_returns_first_match_for_duplicates() {
        let rows = vec![
            row(json!({"Código": "A1", "Producto": "Primero", "Cantidad": 1})),
            row(json!({"Código": "A1", "Producto": "Segundo", "Cantidad": 2})),
        ];
        let catalog = InventoryCatalog::from_rows(&rows);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_by_code("A1").map(|p| p.name.as_str()), Some("Primero"));
        assert!(catalog.find_by_code("a1").is_none());
    }

    #[test]
    fn preview_reports_remaining_count() {
        let rows: Vec<RawRow> = (0..12)
            .map(|i| row(json!({"Código": format!("P{}", i), "Producto": "x"})))
            .collect();
        let catalog = InventoryCatalog::from_rows(&rows);
        let (shown, rest) = catalog.preview(10);
        assert_eq!(shown.len(), 10);
        assert_eq!(rest, 2);

        let empty = InventoryCatalog::new();
        let (shown, rest) = empty.preview(10);
        assert!(shown.is_empty());
        assert_eq!(rest, 0);
    }
}
