// ==========================================
// 工厂管理系统 - 产品 API
// ==========================================
// 职责: 产品与工艺配方的查询与创建
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::domain::product::{Product, ProductWithRecipe, RecipeLine};
use crate::engine::clock::SharedClock;
use crate::repository::{EquipmentTypeRepository, ProductRepository};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineRequest {
    pub type_id: Option<String>,
    pub quantity: Option<i64>,
    pub sequence: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_quantity: Option<i64>,
    pub base_days: Option<i64>,
    #[serde(default)]
    pub equipment_types: Vec<RecipeLineRequest>,
}

/// 配方展示行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub sequence: i64,
}

impl From<RecipeLine> for RecipeEntry {
    fn from(line: RecipeLine) -> Self {
        Self {
            id: line.equipment_type_id,
            name: line.equipment_type_name,
            quantity: line.quantity,
            sequence: line.sequence,
        }
    }
}

// ==========================================
// ProductApi - 产品 API
// ==========================================
pub struct ProductApi {
    product_repo: Arc<ProductRepository>,
    equipment_type_repo: Arc<EquipmentTypeRepository>,
    clock: SharedClock,
}

impl ProductApi {
    pub fn new(
        product_repo: Arc<ProductRepository>,
        equipment_type_repo: Arc<EquipmentTypeRepository>,
        clock: SharedClock,
    ) -> Self {
        Self {
            product_repo,
            equipment_type_repo,
            clock,
        }
    }

    pub fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.product_repo.list()?)
    }

    /// 产品配方，按工序升序
    pub fn get_recipe(&self, product_id: &str) -> ApiResult<Vec<RecipeEntry>> {
        if self.product_repo.find_by_id(product_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Product(id={})不存在", product_id)));
        }
        let recipe = self.product_repo.find_recipe(product_id)?;
        Ok(recipe.into_iter().map(RecipeEntry::from).collect())
    }

    /// 创建产品（可带配方）
    ///
    /// # 校验
    /// - name 必填；baseQuantity >= 1；baseDays >= 1
    /// - 配方行: typeId 存在, quantity >= 1, sequence >= 1
    /// - 同一 (typeId, sequence) 不能重复
    pub fn create_product(&self, request: CreateProductRequest) -> ApiResult<ProductWithRecipe> {
        let mut v = FieldValidator::new();
        let name = v.required_str("name", request.name.as_deref());
        let base_quantity = v.required_int("baseQuantity", request.base_quantity, 1);
        let base_days = v.required_int("baseDays", request.base_days, 1);

        let product_id = Uuid::new_v4().to_string();
        let mut recipe = Vec::with_capacity(request.equipment_types.len());
        let mut seen: HashSet<(String, i64)> = HashSet::new();

        for (i, line) in request.equipment_types.iter().enumerate() {
            let field = |name: &str| format!("equipmentTypes[{}].{}", i, name);
            let type_id = v.required_str(&field("typeId"), line.type_id.as_deref());
            let quantity = v.required_int(&field("quantity"), line.quantity, 1);
            let sequence = v.required_int(&field("sequence"), line.sequence, 1);

            let Some(type_id) = type_id else { continue };
            let Some(equipment_type) = self.equipment_type_repo.find_by_id(&type_id)? else {
                v.push(field("typeId"), format!("设备类型{}不存在", type_id));
                continue;
            };
            let (Some(quantity), Some(sequence)) = (quantity, sequence) else { continue };

            if !seen.insert((equipment_type.id.clone(), sequence)) {
                v.push(field("sequence"), format!("{}在工序{}重复", equipment_type.id, sequence));
                continue;
            }
            recipe.push(RecipeLine {
                product_id: product_id.clone(),
                equipment_type_id: equipment_type.id,
                equipment_type_name: equipment_type.name,
                quantity,
                sequence,
            });
        }
        v.finish()?;

        let (Some(name), Some(base_quantity), Some(base_days)) = (name, base_quantity, base_days) else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };

        recipe.sort_by_key(|l| l.sequence);
        let product = Product {
            id: product_id,
            name,
            description: FieldValidator::optional_str(request.description.as_deref()),
            base_quantity,
            base_days,
            created_at: self.clock.now(),
        };
        self.product_repo.create_with_recipe(&product, &recipe)?;
        info!(product_id = %product.id, recipe_lines = recipe.len(), "产品已创建");

        Ok(ProductWithRecipe { product, recipe })
    }
}
