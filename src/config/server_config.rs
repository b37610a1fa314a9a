// ==========================================
// 工厂管理系统 - 进程配置
// ==========================================
// 来源: 环境变量，缺省时使用默认值
//   FACTORY_DB_PATH         数据库文件路径
//   FACTORY_BIND_ADDR       监听地址
//   FACTORY_LOG_FORMAT      text | json
//   FACTORY_CORS_PERMISSIVE 是否放开 CORS
// ==========================================

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::logging::LogFormat;

pub const ENV_DB_PATH: &str = "FACTORY_DB_PATH";
pub const ENV_BIND_ADDR: &str = "FACTORY_BIND_ADDR";
pub const ENV_LOG_FORMAT: &str = "FACTORY_LOG_FORMAT";
pub const ENV_CORS_PERMISSIVE: &str = "FACTORY_CORS_PERMISSIVE";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub cors_permissive: bool,
}

impl ServerConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key -> value 查找函数加载
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match non_empty(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_db_path(),
        };

        let raw_addr = non_empty(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("{} 无效 ({}): {}", ENV_BIND_ADDR, raw_addr, e))?;

        let log_format = match non_empty(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| anyhow::anyhow!("{} 无效: {}", ENV_LOG_FORMAT, e))?,
            None => LogFormat::Text,
        };

        let cors_permissive = non_empty(ENV_CORS_PERMISSIVE)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            db_path,
            bind_addr,
            log_format,
            cors_permissive,
        })
    }
}

/// 默认数据库路径: <data_dir>/factory-mes/factory.db
///
/// 无法获取系统数据目录时退回当前目录
pub fn default_db_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("factory-mes");
    path.push("factory.db");
    path
}
