// ==========================================
// 工厂管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub(crate) mod common;
pub mod equipment_repo;
pub mod error;
pub mod inventory_repo;
pub mod product_repo;
pub mod production_repo;
pub mod quality_repo;

// 重导出核心仓储
pub use equipment_repo::{EquipmentRepository, EquipmentTypeRepository, LocationRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use product_repo::ProductRepository;
pub use production_repo::ProductionRepository;
pub use quality_repo::{QualityCheckRepository, QualityStandardRepository};
