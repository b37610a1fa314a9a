// ==========================================
// 工厂管理系统 - 库存 API
// ==========================================
// 职责: 库存项增删改查
// 配置: inventory_default_min_quantity / inventory_default_max_quantity
// ==========================================

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::config::ConfigManager;
use crate::domain::inventory::{InventoryFields, InventoryItem, InventoryItemView};
use crate::engine::clock::SharedClock;
use crate::repository::{InventoryRepository, LocationRepository};

/// 新建/更新库存项请求
///
/// minQuantity / maxQuantity 缺省时：新建取配置默认值，更新保留原值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemRequest {
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub location: Option<String>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

// ==========================================
// InventoryApi - 库存 API
// ==========================================
pub struct InventoryApi {
    inventory_repo: Arc<InventoryRepository>,
    location_repo: Arc<LocationRepository>,
    config_manager: Arc<ConfigManager>,
    clock: SharedClock,
}

impl InventoryApi {
    pub fn new(
        inventory_repo: Arc<InventoryRepository>,
        location_repo: Arc<LocationRepository>,
        config_manager: Arc<ConfigManager>,
        clock: SharedClock,
    ) -> Self {
        Self {
            inventory_repo,
            location_repo,
            config_manager,
            clock,
        }
    }

    // 位置 id -> 名称；找不到时原样显示
    fn location_names(&self) -> ApiResult<HashMap<String, String>> {
        Ok(self
            .location_repo
            .list()?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect())
    }

    fn to_view(item: InventoryItem, names: &HashMap<String, String>) -> InventoryItemView {
        let location_name = names
            .get(&item.location)
            .cloned()
            .unwrap_or_else(|| item.location.clone());
        InventoryItemView { item, location_name }
    }

    fn validate(request: &InventoryItemRequest, min_default: i64, max_default: i64) -> ApiResult<InventoryFields> {
        let mut v = FieldValidator::new();
        let item_name = v.required_str("itemName", request.item_name.as_deref());
        let quantity = v.required_int("quantity", request.quantity, 0);
        let location = v.required_str("location", request.location.as_deref());
        let min_quantity = request.min_quantity.unwrap_or(min_default);
        let max_quantity = request.max_quantity.unwrap_or(max_default);
        v.check(min_quantity >= 0, "minQuantity", "不能小于0");
        v.check(max_quantity >= min_quantity, "maxQuantity", "不能小于 minQuantity");
        v.finish()?;

        let (Some(item_name), Some(quantity), Some(location)) = (item_name, quantity, location) else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };
        Ok(InventoryFields {
            item_name,
            quantity,
            location,
            min_quantity,
            max_quantity,
        })
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::NotFound(format!("InventoryItem(id={})不存在", id))
    }

    /// 按创建时间倒序
    pub fn list_items(&self) -> ApiResult<Vec<InventoryItemView>> {
        let names = self.location_names()?;
        Ok(self
            .inventory_repo
            .list()?
            .into_iter()
            .map(|item| Self::to_view(item, &names))
            .collect())
    }

    pub fn get_item(&self, id: &str) -> ApiResult<InventoryItemView> {
        let item = self
            .inventory_repo
            .find_by_id(id)?
            .ok_or_else(|| Self::not_found(id))?;
        Ok(Self::to_view(item, &self.location_names()?))
    }

    pub fn create_item(&self, request: InventoryItemRequest) -> ApiResult<InventoryItemView> {
        let fields = Self::validate(
            &request,
            self.config_manager.get_inventory_default_min_quantity()?,
            self.config_manager.get_inventory_default_max_quantity()?,
        )?;

        let now = self.clock.now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            item_name: fields.item_name,
            quantity: fields.quantity,
            location: fields.location,
            min_quantity: fields.min_quantity,
            max_quantity: fields.max_quantity,
            created_at: now,
            updated_at: now,
        };
        self.inventory_repo.create(&item)?;
        info!(item_id = %item.id, quantity = item.quantity, "库存项已创建");
        Ok(Self::to_view(item, &self.location_names()?))
    }

    pub fn update_item(&self, id: &str, request: InventoryItemRequest) -> ApiResult<InventoryItemView> {
        let existing = self
            .inventory_repo
            .find_by_id(id)?
            .ok_or_else(|| Self::not_found(id))?;
        let fields = Self::validate(&request, existing.min_quantity, existing.max_quantity)?;

        let item = self.inventory_repo.update(id, &fields, self.clock.now())?;
        info!(item_id = %item.id, quantity = item.quantity, "库存项已更新");
        Ok(Self::to_view(item, &self.location_names()?))
    }

    pub fn delete_item(&self, id: &str) -> ApiResult<()> {
        self.inventory_repo.delete(id)?;
        info!(item_id = %id, "库存项已删除");
        Ok(())
    }
}
