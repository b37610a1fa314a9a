// ==========================================
// 工厂管理系统 - 产品与工艺配方
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub base_quantity: i64, // 基准批量
    pub base_days: i64,     // 基准工期（天）
    pub created_at: DateTime<Utc>,
}

// ==========================================
// RecipeLine - 配方行 (ProductEquipmentType)
// ==========================================
// 第 sequence 道工序需要 quantity 台 equipment_type_id 类型设备
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub product_id: String,
    pub equipment_type_id: String,
    pub equipment_type_name: String,
    pub quantity: i64,
    pub sequence: i64,
}

/// 产品 + 配方
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithRecipe {
    #[serde(flatten)]
    pub product: Product,
    pub recipe: Vec<RecipeLine>,
}
