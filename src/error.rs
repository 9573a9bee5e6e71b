use thiserror::Error;

/// 盘点核心的可预期错误 (均可恢复, 不改变状态)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// 尚未加载理论库存
    #[error("theoretical inventory is empty, load a catalog first")]
    EmptyCatalog,

    /// 条码在理论库存中不存在
    #[error("product with code \"{0}\" not found in theoretical inventory")]
    UnknownProduct(String),

    /// 手工修改的数量不是非负整数
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// 盘点信息缺少必填字段
    #[error("missing required inventory field: {0}")]
    MissingSessionField(&'static str),

    /// 生成报告前未保存盘点信息
    #[error("inventory info has not been saved")]
    SessionInfoNotSet,
}

/// 持久化与导入导出错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
