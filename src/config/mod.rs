// ==========================================
// 工厂管理系统 - 配置层
// ==========================================
// 职责:
// - 进程配置（环境变量）
// - 业务配置（config_kv 表，可在运行时覆写）
// ==========================================

pub mod config_manager;
pub mod server_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use server_config::{default_db_path, ServerConfig};
