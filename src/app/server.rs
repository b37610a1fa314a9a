// ==========================================
// 工厂管理系统 - HTTP 服务
// ==========================================
// 职责: 组装 Router、绑定端口、优雅退出（Ctrl-C）
// ==========================================

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::http::{api_router, SharedState};
use crate::app::state::AppState;
use crate::config::ServerConfig;
use crate::engine::SystemClock;

/// 构建完整 Router
pub fn build_router(state: SharedState, cors_permissive: bool) -> Router {
    let mut app = api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// 启动服务，直到收到 Ctrl-C
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path.clone();
    let state = tokio::task::spawn_blocking(move || {
        let state = AppState::open(&db_path, Arc::new(SystemClock))?;
        let snapshot = state.config_manager.get_config_snapshot()?;
        tracing::info!(config = %snapshot, "业务配置已加载");
        Ok::<_, anyhow::Error>(state)
    })
    .await
    .context("初始化任务失败")??;

    let app = build_router(Arc::new(state), config.cors_permissive);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("无法绑定地址 {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, db_path = %config.db_path.display(), "工厂管理服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    tracing::info!("服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "无法监听 Ctrl-C，服务将持续运行");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭...");
}
