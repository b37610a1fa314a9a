// ==========================================
// 工厂管理系统 - HTTP 服务入口
// ==========================================

use factory_mes::config::ServerConfig;
use factory_mes::{app, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // 初始化日志系统
    logging::init(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{} - 设备/生产/质量/库存", factory_mes::APP_NAME);
    tracing::info!("系统版本: {}", factory_mes::VERSION);
    tracing::info!("==================================================");

    app::serve(config).await
}
