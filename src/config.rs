use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub import: ImportConfig,
    pub history: HistoryConfig,
    pub report: ReportConfig,
    pub scanner: ScannerConfig,
    /// 当前审计员显示名称
    pub auditor: Option<String>,
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// 启动时加载的 CSV
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// "最近扫描"视图的条数
    pub recent_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig::default(),
            history: HistoryConfig::default(),
            report: ReportConfig::default(),
            scanner: ScannerConfig::default(),
            auditor: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./reports"),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { recent_limit: 10 }
    }
}

impl AppConfig {
    /// 从 inventory.toml (可选) 与 INVENTORY_ 环境变量加载配置
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name("inventory").required(false))
    }

    /// 从指定文件加载, 环境变量仍然覆盖文件
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load(config::File::from(path).required(false))
    }

    fn load(
        file: config::File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("INVENTORY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<AppConfig>()
    }
}
