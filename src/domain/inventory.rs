// ==========================================
// 工厂管理系统 - 库存领域模型
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// InventoryItem - 库存项
// ==========================================
// location 保存位置 ID（兼容旧数据时也可能是名称）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub item_name: String,
    pub quantity: i64,
    pub location: String,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 库存水位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Low,     // q <= min
    Optimal, // min < q < max
    High,    // q >= max
}

impl InventoryItem {
    pub fn stock_level(&self) -> StockLevel {
        if self.quantity <= self.min_quantity {
            StockLevel::Low
        } else if self.quantity >= self.max_quantity {
            StockLevel::High
        } else {
            StockLevel::Optimal
        }
    }
}

/// 库存项 + 位置名称
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub location_name: String,
}

/// 新建/更新库存项的字段（已通过校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFields {
    pub item_name: String,
    pub quantity: i64,
    pub location: String,
    pub min_quantity: i64,
    pub max_quantity: i64,
}
