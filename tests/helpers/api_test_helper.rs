// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层与HTTP层集成测试的通用环境
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

pub use test_helpers::*;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use factory_mes::app::build_router;
use factory_mes::db::SharedConnection;
use factory_mes::{AppState, ManualClock};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// # 说明
/// - 使用临时数据库文件
/// - 时钟为手动时钟，初始为 base_time()
/// - 通过 AppState 组装全部仓储、引擎与 API
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: SharedConnection,
    pub clock: Arc<ManualClock>,
    pub state: Arc<AppState>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) =
            create_test_db().map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let conn = open_shared(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;

        let clock = Arc::new(ManualClock::new(base_time()));
        let state = Arc::new(AppState::from_connection(conn.clone(), clock.clone()));

        Ok(Self {
            db_path,
            conn,
            clock,
            state,
            _temp_file: temp_file,
        })
    }

    /// 已写入标准车间数据的环境
    pub fn with_basic_floor() -> Result<Self, String> {
        let env = Self::new()?;
        seed_basic_floor(&env.conn);
        Ok(env)
    }

    pub fn advance_hours(&self, hours: i64) {
        self.clock.advance(Duration::hours(hours));
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), false)
    }

    pub fn count(&self, table: &str) -> i64 {
        count_rows(&self.conn, table)
    }
}

// ==========================================
// HTTP 调用
// ==========================================

/// 发送请求，返回状态码与 JSON 响应体（无响应体时为 Null）
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
