// ==========================================
// 工厂管理系统 - HTTP 接口层
// ==========================================
// 职责: axum 路由 + 处理函数
// - API 调用是同步的 SQLite 访问，统一放到 spawn_blocking
// - ApiError -> {code, error, details} + HTTP 状态码
// ==========================================

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{
    ApiError, ApiResult, CreateEquipmentRequest, CreateEquipmentTypeRequest, CreateLocationRequest,
    CreateProductRequest, CreateProductionRequest, CreateQualityCheckRequest,
    CreateQualityStandardRequest, FieldViolation, InventoryItemRequest, QualityCheckQuery,
};
use crate::app::state::AppState;

pub type SharedState = Arc<AppState>;

// ==========================================
// 错误响应
// ==========================================

/// 错误类型对应的 HTTP 状态码
pub fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::ValidationFailed { .. } | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::InsufficientEquipment { .. } | ApiError::BusinessRuleViolation(_) => {
            StatusCode::CONFLICT
        }
        ApiError::DatabaseError(_)
        | ApiError::DatabaseConnectionError(_)
        | ApiError::DatabaseTransactionError(_)
        | ApiError::InternalError(_)
        | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::debug!(code = self.code(), error = %self, "请求被拒绝");
        }
        let body = json!({
            "code": self.code(),
            "error": self.to_string(),
            "details": self.details(),
        });
        (status, Json(body)).into_response()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 在阻塞线程池上执行同步 API 调用
async fn blocking<F, R>(f: F) -> ApiResult<R>
where
    F: FnOnce() -> ApiResult<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务失败: {}", e)))?
}

/// 请求体反序列化
///
/// 字段类型错误（如 quantity 传字符串）转为带字段路径的 VALIDATION_FAILED，
/// 其余（语法错误、顶层类型不符、Content-Type）为 INVALID_INPUT
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let text = rejection.body_text();
        match &rejection {
            JsonRejection::JsonDataError(_) => match data_error_violation(&text) {
                Some(violation) => ApiError::ValidationFailed {
                    violations: vec![violation],
                },
                None => ApiError::InvalidInput(text),
            },
            _ => ApiError::InvalidInput(text),
        }
    })
}

// "...into the target type: equipmentTypes[0].quantity: invalid type: ... at line 1 column 9"
// 顶层错误不带路径，返回 None
fn data_error_violation(text: &str) -> Option<FieldViolation> {
    let (_, detail) = text.split_once("target type: ")?;
    let (path, message) = detail.split_once(": ")?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    let message = message.split(" at line ").next().unwrap_or(message);
    Some(FieldViolation::new(path, message))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandardQuery {
    product_id: Option<String>,
}

// ==========================================
// 路由
// ==========================================

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health_check))
        // 设备
        .route("/api/equipment-types", get(list_equipment_types).post(create_equipment_type))
        .route("/api/locations", get(list_locations).post(create_location))
        .route("/api/equipment", get(list_equipment).post(create_equipment))
        // 产品
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}/equipment-types", get(get_product_recipe))
        // 生产
        .route("/api/productions", get(list_productions).post(create_production))
        .route("/api/productions/{id}/equipments", get(get_production_equipments))
        // 质量
        .route("/api/quality-standards", get(list_quality_standards).post(create_quality_standard))
        .route("/api/quality-checks", get(list_quality_checks).post(create_quality_check))
        .route("/api/quality-checks/stats", get(get_quality_stats))
        .route("/api/quality-checks/trends", get(get_quality_trends))
        // 库存
        .route("/api/inventory", get(list_inventory).post(create_inventory_item))
        .route(
            "/api/inventory/{id}",
            get(get_inventory_item)
                .put(update_inventory_item)
                .delete(delete_inventory_item),
        )
        // 驾驶舱
        .route("/api/dashboard/stats", get(get_dashboard_stats))
}

// ==========================================
// 处理函数
// ==========================================

async fn health_check() -> &'static str {
    "ok"
}

// ===== 设备 =====

async fn list_equipment_types(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.equipment_api.clone();
    let types = blocking(move || api.list_equipment_types()).await?;
    Ok(Json(types))
}

async fn create_equipment_type(
    State(state): State<SharedState>,
    payload: Result<Json<CreateEquipmentTypeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.equipment_api.clone();
    let created = blocking(move || api.create_equipment_type(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_locations(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.equipment_api.clone();
    let locations = blocking(move || api.list_locations()).await?;
    Ok(Json(locations))
}

async fn create_location(
    State(state): State<SharedState>,
    payload: Result<Json<CreateLocationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.equipment_api.clone();
    let created = blocking(move || api.create_location(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_equipment(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.equipment_api.clone();
    let response = blocking(move || api.list_equipment()).await?;
    Ok(Json(response))
}

async fn create_equipment(
    State(state): State<SharedState>,
    payload: Result<Json<CreateEquipmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.equipment_api.clone();
    let created = blocking(move || api.create_equipment(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// ===== 产品 =====

async fn list_products(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.product_api.clone();
    let products = blocking(move || api.list_products()).await?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<SharedState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.product_api.clone();
    let created = blocking(move || api.create_product(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_product_recipe(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.product_api.clone();
    let recipe = blocking(move || api.get_recipe(&id)).await?;
    Ok(Json(recipe))
}

// ===== 生产 =====

async fn list_productions(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.production_api.clone();
    let response = blocking(move || api.list_productions()).await?;
    Ok(Json(response))
}

async fn create_production(
    State(state): State<SharedState>,
    payload: Result<Json<CreateProductionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.production_api.clone();
    let outcome = blocking(move || api.create_production(request)).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_production_equipments(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.production_api.clone();
    let response = blocking(move || api.get_production_equipments(&id)).await?;
    Ok(Json(response))
}

// ===== 质量 =====

async fn list_quality_standards(
    State(state): State<SharedState>,
    query: Result<Query<StandardQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.quality_api.clone();
    let standards = blocking(move || api.list_standards(query.product_id.as_deref())).await?;
    Ok(Json(standards))
}

async fn create_quality_standard(
    State(state): State<SharedState>,
    payload: Result<Json<CreateQualityStandardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.quality_api.clone();
    let created = blocking(move || api.create_standard(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_quality_checks(
    State(state): State<SharedState>,
    query: Result<Query<QualityCheckQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.quality_api.clone();
    let checks = blocking(move || api.list_checks(query)).await?;
    Ok(Json(checks))
}

async fn create_quality_check(
    State(state): State<SharedState>,
    payload: Result<Json<CreateQualityCheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.quality_api.clone();
    let created = blocking(move || api.create_check(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_quality_stats(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.quality_api.clone();
    let stats = blocking(move || api.get_stats()).await?;
    Ok(Json(stats))
}

async fn get_quality_trends(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.quality_api.clone();
    let trends = blocking(move || api.get_trends()).await?;
    Ok(Json(trends))
}

// ===== 库存 =====

async fn list_inventory(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.inventory_api.clone();
    let items = blocking(move || api.list_items()).await?;
    Ok(Json(items))
}

async fn create_inventory_item(
    State(state): State<SharedState>,
    payload: Result<Json<InventoryItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.inventory_api.clone();
    let created = blocking(move || api.create_item(request)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_inventory_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.inventory_api.clone();
    let item = blocking(move || api.get_item(&id)).await?;
    Ok(Json(item))
}

async fn update_inventory_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<InventoryItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let api = state.inventory_api.clone();
    let updated = blocking(move || api.update_item(&id, request)).await?;
    Ok(Json(updated))
}

async fn delete_inventory_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.inventory_api.clone();
    blocking(move || api.delete_item(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== 驾驶舱 =====

async fn get_dashboard_stats(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let api = state.dashboard_api.clone();
    let stats = blocking(move || api.get_stats()).await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ApiError::invalid_field("name", "不能为空")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ApiError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&ApiError::InsufficientEquipment {
                equipment_type_id: "PRESS".into(),
                equipment_type_name: "压力机".into(),
                required: 2,
                available: 1,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ApiError::DatabaseError("disk I/O".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_data_error_violation_extracts_path() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    equipmentTypes[0].quantity: invalid type: string \"abc\", expected i64 at line 1 column 42";
        let violation = data_error_violation(text).unwrap();
        assert_eq!(violation.field, "equipmentTypes[0].quantity");
        assert_eq!(violation.message, "invalid type: string \"abc\", expected i64");

        // 顶层类型不符没有字段路径
        let root = "Failed to deserialize the JSON body into the target type: \
                    invalid type: string \"x\", expected struct CreateProductionRequest at line 1 column 3";
        assert!(data_error_violation(root).is_none());
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let err = ApiError::ValidationFailed {
            violations: vec![FieldViolation::new("quantity", "不能小于1")],
        };
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"]["violations"][0]["field"], "quantity");
        assert!(body["error"].as_str().unwrap().contains("quantity"));
    }
}
