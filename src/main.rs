//! # Cluster Access 主程序

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use cluster_access::{
    Result,
    config::{ConfigManager, SigningSecret},
    database, lerror, linfo,
    logging::{self, LogComponent, LogStage},
    web::{self, AppState},
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "cluster-access", version, about = "Cluster field-operations portal")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（`RUST_LOG` 优先）
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref());

    if let Err(e) = run(args).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
}

async fn run(args: Args) -> Result<()> {
    // 签名密钥缺失直接失败，不存在默认值
    let secret = SigningSecret::from_env()?;

    let manager = ConfigManager::load(args.config.as_deref())?;
    let config = manager.config();
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Config,
        "config_loaded",
        &format!("配置来源: {:?}", manager.source())
    );

    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db).await?;
    database::ensure_bootstrap_admin(&db).await?;

    let state = AppState::new(config, Arc::new(db), &secret)?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );
    web::serve(state).await
}
