// ==========================================
// HTTP 端到端测试
// ==========================================
// 测试范围:
// 1. 从空库经 HTTP 建立设备 / 产品 / 生产计划
// 2. 时钟推进后列表返回扫描后的状态
// 3. 错误响应的状态码与 code
// 4. 库存 CRUD
// ==========================================

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use helpers::api_test_helper::*;
use serde_json::{json, Value};

/// 建立车间: PRESS / INSPECTION 各一台，产品 Widget
async fn build_floor(env: &ApiTestEnv) -> (axum::Router, String) {
    let app = env.router();
    let t = base_time();

    let (status, body) = send(&app, "POST", "/api/equipment-types", Some(json!({"id": "press", "name": "压力机"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "PRESS");
    let (status, _) = send(&app, "POST", "/api/equipment-types", Some(json!({"id": "INSPECTION", "name": "检测设备"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "POST", "/api/locations", Some(json!({"id": "F1-A", "name": "1层A区"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    for type_id in ["PRESS", "INSPECTION"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/equipment",
            Some(json!({
                "name": format!("{} 1号", type_id),
                "typeId": type_id,
                "locationId": "F1-A",
                "lastMaintenance": (t - Duration::days(3)).to_rfc3339(),
                "nextMaintenance": (t + Duration::days(30)).to_rfc3339(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["operationStatus"], "STANDBY");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "baseQuantity": 100,
            "baseDays": 1,
            "equipmentTypes": [
                {"typeId": "PRESS", "quantity": 1, "sequence": 1},
                {"typeId": "INSPECTION", "quantity": 1, "sequence": 2},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let product_id = body["id"].as_str().unwrap().to_string();
    (app, product_id)
}

fn production_body(product_id: &str) -> Value {
    let t = base_time();
    json!({
        "productId": product_id,
        "quantity": 100,
        "startTime": t.to_rfc3339(),
        "endTime": (t + Duration::days(1)).to_rfc3339(),
    })
}

#[tokio::test]
async fn test_production_flow_over_http() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let (app, product_id) = build_floor(&env).await;

    // 配方
    let (status, recipe) = send(&app, "GET", &format!("/api/products/{}/equipment-types", product_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe.as_array().unwrap().len(), 2);
    assert_eq!(recipe[0]["id"], "PRESS");
    assert_eq!(recipe[1]["sequence"], 2);

    // 创建生产计划
    let (status, outcome) = send(&app, "POST", "/api/productions", Some(production_body(&product_id))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", outcome);
    assert_eq!(outcome["production"]["status"], "PLANNED");
    assert_eq!(outcome["allocations"].as_array().unwrap().len(), 2);
    let production_id = outcome["production"]["id"].as_str().unwrap().to_string();

    let (_, equipment) = send(&app, "GET", "/api/equipment", None).await;
    assert_eq!(equipment["stats"]["operating"], 2);
    for e in equipment["equipments"].as_array().unwrap() {
        assert_eq!(e["operationStatus"], "OPERATING");
    }

    // 时钟越过开始时间
    env.advance_hours(2);
    let (status, listed) = send(&app, "GET", "/api/productions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["productions"][0]["status"], "IN_PROGRESS");
    assert_eq!(listed["productions"][0]["product"]["name"], "Widget");
    assert_eq!(listed["stats"]["inProgress"], 1);

    let (status, allocated) = send(&app, "GET", &format!("/api/productions/{}/equipments", production_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(allocated["productName"], "Widget");
    assert_eq!(allocated["equipments"].as_array().unwrap().len(), 2);

    // 设备已全部占用
    let (status, err) = send(&app, "POST", "/api/productions", Some(production_body(&product_id))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INSUFFICIENT_EQUIPMENT");
    assert_eq!(err["details"]["equipmentTypeId"], "PRESS");
    assert_eq!(err["details"]["required"], 1);
    assert_eq!(err["details"]["available"], 0);
    assert_eq!(env.count("production"), 1);

    let (status, dashboard) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["production"]["inProgress"], 1);
    assert_eq!(dashboard["equipment"]["total"], 2);
}

#[tokio::test]
async fn test_error_responses() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let (app, product_id) = build_floor(&env).await;

    // 校验失败
    let t = base_time();
    let (status, err) = send(
        &app,
        "POST",
        "/api/productions",
        Some(json!({
            "productId": product_id,
            "quantity": 1,
            "startTime": (t + Duration::hours(5)).to_rfc3339(),
            "endTime": (t + Duration::hours(1)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_FAILED");
    assert_eq!(err["details"]["violations"][0]["field"], "endTime");

    // JSON 格式错误
    let (status, err) = send(&app, "POST", "/api/productions", Some(json!("not an object"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_INPUT");

    // 字段类型错误带字段路径
    let (status, err) = send(
        &app,
        "POST",
        "/api/productions",
        Some(json!({"productId": product_id, "quantity": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_FAILED");
    assert_eq!(err["details"]["violations"][0]["field"], "quantity");

    let (status, err) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Gadget",
            "equipmentTypes": [{"typeId": "PRESS", "quantity": "two", "sequence": 1}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"]["violations"][0]["field"], "equipmentTypes[0].quantity");

    // 不存在的资源
    let (status, err) = send(&app, "GET", "/api/products/nope/equipment-types", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, _) = send(&app, "POST", "/api/productions", Some(production_body("nope"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 重复主键
    let (status, err) = send(&app, "POST", "/api/equipment-types", Some(json!({"id": "PRESS", "name": "重复"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");

    // 设备引用不存在的类型
    let (status, err) = send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({
            "name": "幽灵",
            "typeId": "GHOST",
            "locationId": "F1-A",
            "lastMaintenance": "2026-03-01",
            "nextMaintenance": "2026-04-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = err["details"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["field"].as_str())
        .collect();
    assert!(fields.contains(&"typeId"));

    assert_eq!(env.count("production"), 0);
}

#[tokio::test]
async fn test_inventory_crud_over_http() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let (app, _) = build_floor(&env).await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/inventory",
        Some(json!({"itemName": "螺丝", "quantity": 50, "location": "F1-A", "minQuantity": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["locationName"], "1层A区");
    assert_eq!(created["maxQuantity"], 1000);
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/inventory/{}", id);

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"itemName": "螺丝", "quantity": 300, "location": "F1-A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 300);
    assert_eq!(updated["minQuantity"], 100);

    let (status, listed) = send(&app, "GET", "/api/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, err) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_quality_endpoints_over_http() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let (app, product_id) = build_floor(&env).await;

    let (status, standard) = send(
        &app,
        "POST",
        "/api/quality-standards",
        Some(json!({
            "productId": product_id,
            "name": "出厂检验",
            "criteria": [{"name": "外观", "type": "VISUAL", "description": "无划痕"}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", standard);
    let standard_id = standard["id"].as_str().unwrap().to_string();

    let (status, check) = send(
        &app,
        "POST",
        "/api/quality-checks",
        Some(json!({
            "standardId": standard_id,
            "batchNumber": "B-001",
            "inspector": "王工",
            "results": [{"criteriaId": "外观", "value": "划痕", "status": "FAIL"}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", check);
    assert_eq!(check["status"], "FAILED");

    let (status, filtered) = send(
        &app,
        "GET",
        &format!("/api/quality-standards?productId={}", product_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let (_, checks) = send(&app, "GET", "/api/quality-checks?status=FAILED&limit=5", None).await;
    assert_eq!(checks.as_array().unwrap().len(), 1);

    let (status, err) = send(&app, "GET", "/api/quality-checks?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_INPUT");

    let (_, stats) = send(&app, "GET", "/api/quality-checks/stats", None).await;
    assert_eq!(stats["totalChecks"], 1);
    assert_eq!(stats["countsByStatus"]["FAILED"], 1);
    assert_eq!(stats["recentFailures"].as_array().unwrap().len(), 1);

    let (_, trends) = send(&app, "GET", "/api/quality-checks/trends", None).await;
    assert_eq!(trends["trends"].as_array().unwrap().len(), 7);
    assert_eq!(trends["productStats"][0]["defectRate"], 100.0);
}
