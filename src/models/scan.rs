use super::{Classification, ProductRecord};

/// 一次扫描的结果, 调用方无需再次查找商品
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub product: ProductRecord,
    pub quantity: u32,
}

impl ScanOutcome {
    pub fn classification(&self) -> Classification {
        Classification::from_quantities(self.quantity, self.product.theoretical_quantity)
    }
}

/// 手工修改数量的前后值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    pub previous: Option<u32>,
    pub current: u32,
}

impl QuantityChange {
    pub fn delta(&self) -> i64 {
        i64::from(self.current) - i64::from(self.previous.unwrap_or(0))
    }
}
