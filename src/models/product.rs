use serde::{Deserialize, Serialize};

/// 导入源的一行原始数据 (列名 -> 任意值)
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// 理论库存商品 (加载后不可变)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub code: String,                // 商品编码/条码
    pub name: String,                // 显示名称
    pub theoretical_quantity: u32,   // 理论数量
}

impl ProductRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>, theoretical_quantity: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            theoretical_quantity,
        }
    }
}
