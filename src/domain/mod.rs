// ==========================================
// 工厂管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod equipment;
pub mod inventory;
pub mod product;
pub mod production;
pub mod quality;
pub mod types;

// 重导出核心类型
pub use equipment::{Equipment, EquipmentDetail, EquipmentType, Location, LocationSummary};
pub use inventory::{InventoryFields, InventoryItem, InventoryItemView, StockLevel};
pub use product::{Product, ProductWithRecipe, RecipeLine};
pub use production::{
    AllocatedEquipment, EquipmentAssignment, NewProduction, Production, ProductionEquipment,
    ProductionWithProduct, StatusTransition,
};
pub use quality::{
    CheckResult, CheckValue, CriteriaItem, QualityCheck, QualityCheckFilter, QualityCheckView,
    QualityStandard,
};
pub use types::{
    CheckResultStatus, CriteriaType, EquipmentStatus, OperationStatus, ProductionStatus,
    QualityStatus, UnknownVariant,
};
