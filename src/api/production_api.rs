// ==========================================
// 工厂管理系统 - 生产 API
// ==========================================
// 职责:
// - 生产计划列表（读前先执行状态扫描）
// - 创建生产计划（委托设备分配引擎，全有或全无）
// - 查询生产计划已分配的设备
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::domain::production::{AllocatedEquipment, NewProduction, ProductionWithProduct};
use crate::engine::equipment_allocator::{AllocationOutcome, EquipmentAllocator};
use crate::engine::stats::{production_stats, ProductionStats};
use crate::engine::status_sweeper::StatusSweeper;
use crate::repository::ProductionRepository;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductionRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionListResponse {
    pub productions: Vec<ProductionWithProduct>,
    pub stats: ProductionStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEquipmentsResponse {
    pub product_name: String,
    pub equipments: Vec<AllocatedEquipment>,
}

// ==========================================
// ProductionApi - 生产 API
// ==========================================
pub struct ProductionApi {
    production_repo: Arc<ProductionRepository>,
    sweeper: Arc<StatusSweeper>,
    allocator: Arc<EquipmentAllocator>,
}

impl ProductionApi {
    pub fn new(
        production_repo: Arc<ProductionRepository>,
        sweeper: Arc<StatusSweeper>,
        allocator: Arc<EquipmentAllocator>,
    ) -> Self {
        Self {
            production_repo,
            sweeper,
            allocator,
        }
    }

    /// 生产计划列表 + 统计
    ///
    /// 先扫描推进状态，再读取，保证返回的状态与当前时间一致
    pub fn list_productions(&self) -> ApiResult<ProductionListResponse> {
        self.sweeper.sweep()?;
        let productions = self.production_repo.list_with_products()?;
        let stats = production_stats(productions.iter().map(|p| &p.production));
        Ok(ProductionListResponse { productions, stats })
    }

    /// 创建生产计划并分配设备
    ///
    /// # 校验
    /// - productId 必填；quantity >= 1
    /// - startTime / endTime 必填且 endTime 晚于 startTime
    ///
    /// # 返回
    /// - Err(NotFound): 产品不存在
    /// - Err(InsufficientEquipment): 设备不足，未写入任何数据
    pub fn create_production(&self, request: CreateProductionRequest) -> ApiResult<AllocationOutcome> {
        let mut v = FieldValidator::new();
        let product_id = v.required_str("productId", request.product_id.as_deref());
        let quantity = v.required_int("quantity", request.quantity, 1);
        let start_time = v.required_datetime("startTime", request.start_time.as_deref());
        let end_time = v.required_datetime("endTime", request.end_time.as_deref());
        if let (Some(start), Some(end)) = (start_time, end_time) {
            v.check(end > start, "endTime", "结束时间必须晚于开始时间");
        }
        v.finish()?;

        let (Some(product_id), Some(quantity), Some(start_time), Some(end_time)) =
            (product_id, quantity, start_time, end_time)
        else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };

        let outcome = self.allocator.allocate(NewProduction {
            product_id,
            quantity,
            start_time,
            end_time,
        })?;
        Ok(outcome)
    }

    /// 生产计划已分配的设备
    pub fn get_production_equipments(&self, production_id: &str) -> ApiResult<ProductionEquipmentsResponse> {
        let production = self
            .production_repo
            .find_with_product(production_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Production(id={})不存在", production_id)))?;
        let equipments = self.production_repo.list_allocated_equipment(production_id)?;
        Ok(ProductionEquipmentsResponse {
            product_name: production.product.name,
            equipments,
        })
    }
}
