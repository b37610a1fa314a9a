// ==========================================
// 工厂管理系统 - API 层
// ==========================================
// 职责: 请求校验 + 编排仓储/引擎，输出可序列化结果
// 红线: API 层不拼 SQL，不依赖 HTTP 框架
// ==========================================

pub mod dashboard_api;
pub mod equipment_api;
pub mod error;
pub mod inventory_api;
pub mod product_api;
pub mod production_api;
pub mod quality_api;
pub mod validator;

// 重导出核心 API
pub use dashboard_api::{DashboardApi, DashboardStats};
pub use equipment_api::{
    CreateEquipmentRequest, CreateEquipmentTypeRequest, CreateLocationRequest, EquipmentApi,
    EquipmentListResponse,
};
pub use error::{ApiError, ApiResult, FieldViolation};
pub use inventory_api::{InventoryApi, InventoryItemRequest};
pub use product_api::{CreateProductRequest, ProductApi, RecipeEntry, RecipeLineRequest};
pub use production_api::{
    CreateProductionRequest, ProductionApi, ProductionEquipmentsResponse, ProductionListResponse,
};
pub use quality_api::{
    CreateQualityCheckRequest, CreateQualityStandardRequest, QualityApi, QualityCheckQuery,
    QualityStatsResponse, QualityTrendsResponse,
};
