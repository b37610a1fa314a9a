// ==========================================
// 工厂管理系统 - 生产计划领域模型
// ==========================================
// 状态是 (start_time, end_time, now) 的函数，CANCELLED 除外
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::types::{OperationStatus, ProductionStatus};

// ==========================================
// Production - 生产计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ProductionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 生产计划 + 产品
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionWithProduct {
    #[serde(flatten)]
    pub production: Production,
    pub product: Product,
}

// ==========================================
// ProductionEquipment - 生产-设备分配记录
// ==========================================
// 分配时创建一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEquipment {
    pub id: String,
    pub production_id: String,
    pub equipment_id: String,
    pub sequence: i64,
}

/// 生产计划已分配设备的展示行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedEquipment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub location: String,
    pub sequence: i64,
    pub status: OperationStatus,
    pub required: i64,
}

/// 新建生产计划的命令（已通过校验）
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduction {
    pub product_id: String,
    pub quantity: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// 分配方案中的一行：设备执行第 sequence 道工序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentAssignment {
    pub equipment_id: String,
    pub sequence: i64,
}

/// 一次状态扫描产生的迁移
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub production_id: String,
    pub from: ProductionStatus,
    pub to: ProductionStatus,
}
