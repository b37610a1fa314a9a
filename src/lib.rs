// ==========================================
// 工厂管理系统 - 核心库
// ==========================================
// 模块: 设备 / 生产 / 质量 / 库存
// 技术栈: axum + Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（状态扫描、设备分配、统计）
pub mod engine;

// 配置层 - 进程配置与业务配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与 HTTP
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CheckResultStatus, CriteriaType, EquipmentStatus, OperationStatus, ProductionStatus,
    QualityStatus,
};

// 领域实体
pub use domain::{
    Equipment, EquipmentType, InventoryItem, Location, Product, Production, ProductionEquipment,
    QualityCheck, QualityStandard, RecipeLine,
};

// 引擎
pub use engine::{Clock, EquipmentAllocator, ManualClock, StatusSweeper, SystemClock};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工厂管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
