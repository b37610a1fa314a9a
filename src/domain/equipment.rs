// ==========================================
// 工厂管理系统 - 设备领域模型
// ==========================================
// 设备类型 / 位置 / 设备
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{EquipmentStatus, OperationStatus};

// ==========================================
// EquipmentType - 设备类型
// ==========================================
// id 为业务码，例如 PRESS / INSPECTION
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentType {
    pub id: String,   // 类型码
    pub name: String, // 类型名称
}

// ==========================================
// Location - 设备位置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// 位置 + 设备数量（列表页使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    #[serde(flatten)]
    pub location: Location,
    pub equipment_count: i64,
}

// ==========================================
// Equipment - 设备
// ==========================================
// status: 健康状态; operation_status: 分配状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub type_id: String,
    pub location_id: String,
    pub status: EquipmentStatus,
    pub operation_status: OperationStatus,
    pub last_maintenance: DateTime<Utc>,
    pub next_maintenance: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// 是否可被分配
    pub fn is_standby(&self) -> bool {
        self.operation_status == OperationStatus::Standby
    }

    /// 保养是否已逾期
    pub fn needs_maintenance(&self, now: DateTime<Utc>) -> bool {
        self.next_maintenance < now
    }
}

/// 设备 + 类型 + 位置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub equipment: Equipment,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub location: Location,
}
