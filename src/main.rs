use inventory_audit_rust::{
    api::{self, Command},
    db::JsonFileStore,
    service::StaticUser,
    AppConfig, AuditService,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 加载配置 (错误在日志初始化后再输出)
    let (config, config_error) = match AppConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("Invalid configuration, using defaults: {}", e);
    }
    info!("Starting inventory audit with config: {:?}", config);

    // 历史记录存储 + 当前用户
    let store = JsonFileStore::new(&config.history.dir);
    let user = StaticUser(config.auditor.clone());
    let mut service = AuditService::new(store, Box::new(user));
    info!("History loaded: {} entries", service.history().len());

    if let Some(path) = config.import.path.clone() {
        let response = api::handle(
            &mut service,
            Command::Load(path),
            &config.report.output_dir,
            config.scanner.recent_limit,
        )
        .await;
        println!("{}", response.message);
    }

    println!("Escanee un código o escriba :help");

    // 扫描枪以键盘方式输入, 每行一个条码
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), ":quit" | ":q") {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match Command::parse(&line) {
            Ok(command) => {
                api::handle(
                    &mut service,
                    command,
                    &config.report.output_dir,
                    config.scanner.recent_limit,
                )
                .await
            }
            Err(usage) => {
                println!("✗ {}", usage);
                continue;
            }
        };

        if response.success {
            println!("{}", response.message);
        } else {
            println!("✗ {}", response.message);
        }
    }

    info!("Session finished");
    Ok(())
}
