// ==========================================
// 工厂管理系统 - 设备 API
// ==========================================
// 职责: 设备类型 / 位置 / 设备的查询与创建
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::domain::equipment::{Equipment, EquipmentDetail, EquipmentType, Location, LocationSummary};
use crate::domain::types::{EquipmentStatus, OperationStatus};
use crate::engine::clock::SharedClock;
use crate::engine::stats::{equipment_stats, EquipmentStats};
use crate::repository::{EquipmentRepository, EquipmentTypeRepository, LocationRepository};

// ==========================================
// 请求 / 响应
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentTypeRequest {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentRequest {
    pub name: Option<String>,
    pub type_id: Option<String>,
    pub location_id: Option<String>,
    pub status: Option<String>,
    pub operation_status: Option<String>,
    pub last_maintenance: Option<String>,
    pub next_maintenance: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentListResponse {
    pub equipments: Vec<EquipmentDetail>,
    pub stats: EquipmentStats,
}

// ==========================================
// EquipmentApi - 设备 API
// ==========================================
pub struct EquipmentApi {
    equipment_type_repo: Arc<EquipmentTypeRepository>,
    location_repo: Arc<LocationRepository>,
    equipment_repo: Arc<EquipmentRepository>,
    clock: SharedClock,
}

impl EquipmentApi {
    pub fn new(
        equipment_type_repo: Arc<EquipmentTypeRepository>,
        location_repo: Arc<LocationRepository>,
        equipment_repo: Arc<EquipmentRepository>,
        clock: SharedClock,
    ) -> Self {
        Self {
            equipment_type_repo,
            location_repo,
            equipment_repo,
            clock,
        }
    }

    // ===== 设备类型 =====

    pub fn list_equipment_types(&self) -> ApiResult<Vec<EquipmentType>> {
        Ok(self.equipment_type_repo.list()?)
    }

    /// 创建设备类型，id 统一转为大写类型码
    pub fn create_equipment_type(&self, request: CreateEquipmentTypeRequest) -> ApiResult<EquipmentType> {
        let mut v = FieldValidator::new();
        let id = v.required_str("id", request.id.as_deref());
        let name = v.required_str("name", request.name.as_deref());
        v.finish()?;

        let equipment_type = EquipmentType {
            id: id.unwrap_or_default().to_uppercase(),
            name: name.unwrap_or_default(),
        };
        self.equipment_type_repo.create(&equipment_type)?;
        info!(type_id = %equipment_type.id, "设备类型已创建");
        Ok(equipment_type)
    }

    // ===== 位置 =====

    pub fn list_locations(&self) -> ApiResult<Vec<LocationSummary>> {
        Ok(self.location_repo.list_with_counts()?)
    }

    pub fn create_location(&self, request: CreateLocationRequest) -> ApiResult<Location> {
        let mut v = FieldValidator::new();
        let name = v.required_str("name", request.name.as_deref());
        v.finish()?;

        let location = Location {
            id: FieldValidator::optional_str(request.id.as_deref())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: name.unwrap_or_default(),
            description: FieldValidator::optional_str(request.description.as_deref()),
        };
        self.location_repo.create(&location)?;
        info!(location_id = %location.id, "位置已创建");
        Ok(location)
    }

    // ===== 设备 =====

    /// 设备列表 + 统计
    pub fn list_equipment(&self) -> ApiResult<EquipmentListResponse> {
        let equipments = self.equipment_repo.list_details()?;
        let stats = equipment_stats(equipments.iter().map(|d| &d.equipment), self.clock.now());
        Ok(EquipmentListResponse { equipments, stats })
    }

    /// 创建设备
    ///
    /// # 校验
    /// - name / typeId / locationId / lastMaintenance / nextMaintenance 必填
    /// - typeId、locationId 必须存在
    /// - status / operationStatus 可选，缺省为 ACTIVE / STANDBY
    pub fn create_equipment(&self, request: CreateEquipmentRequest) -> ApiResult<EquipmentDetail> {
        let mut v = FieldValidator::new();
        let name = v.required_str("name", request.name.as_deref());
        let type_id = v.required_str("typeId", request.type_id.as_deref());
        let location_id = v.required_str("locationId", request.location_id.as_deref());
        let status = v.optional_enum::<EquipmentStatus>("status", request.status.as_deref());
        let operation_status =
            v.optional_enum::<OperationStatus>("operationStatus", request.operation_status.as_deref());
        let last_maintenance = v.required_datetime("lastMaintenance", request.last_maintenance.as_deref());
        let next_maintenance = v.required_datetime("nextMaintenance", request.next_maintenance.as_deref());

        if let Some(type_id) = &type_id {
            if self.equipment_type_repo.find_by_id(type_id)?.is_none() {
                v.push("typeId", format!("设备类型{}不存在", type_id));
            }
        }
        if let Some(location_id) = &location_id {
            if self.location_repo.find_by_id(location_id)?.is_none() {
                v.push("locationId", format!("位置{}不存在", location_id));
            }
        }
        if let (Some(last), Some(next)) = (last_maintenance, next_maintenance) {
            v.check(next >= last, "nextMaintenance", "不能早于上次保养时间");
        }
        v.finish()?;

        let (Some(name), Some(type_id), Some(location_id), Some(last_maintenance), Some(next_maintenance)) =
            (name, type_id, location_id, last_maintenance, next_maintenance)
        else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };

        let now = self.clock.now();
        let equipment = Equipment {
            id: Uuid::new_v4().to_string(),
            name,
            type_id,
            location_id,
            status: status.unwrap_or_default(),
            operation_status: operation_status.unwrap_or_default(),
            last_maintenance,
            next_maintenance,
            created_at: now,
            updated_at: now,
        };
        self.equipment_repo.create(&equipment)?;
        info!(equipment_id = %equipment.id, type_id = %equipment.type_id, "设备已创建");

        self.equipment_repo
            .find_detail_by_id(&equipment.id)?
            .ok_or_else(|| ApiError::NotFound(format!("Equipment(id={})不存在", equipment.id)))
    }
}
