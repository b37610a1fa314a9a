// ==========================================
// 工厂管理系统 - 应用层
// ==========================================
// 职责: 组装状态，经 HTTP 暴露 API
// ==========================================

pub mod http;
pub mod server;
pub mod state;

// 重导出
pub use http::{api_router, SharedState};
pub use server::{build_router, serve};
pub use state::AppState;
