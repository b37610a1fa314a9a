// ==========================================
// 工厂管理系统 - 配置管理器
// ==========================================
// 职责: 业务配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::db::SharedConnection;
use crate::engine::stats::clamp_trend_days;
use crate::repository::common::lock_conn;
use crate::repository::error::{RepositoryError, RepositoryResult};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: SharedConnection,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = lock_conn(&self.conn)?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取并解析配置，缺失或格式错误时回退到默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 写入配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "key".to_string(),
                message: "配置键不能为空".to_string(),
            });
        }

        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = ?4
            "#,
            params![GLOBAL_SCOPE, key, value, Utc::now()],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 已存储的全部 global 配置，按 key 排序
    pub fn list_global_configs(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 获取生效配置的快照（JSON格式，包含默认值）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let mut snapshot: BTreeMap<&str, Value> = BTreeMap::new();
        snapshot.insert(config_keys::QUALITY_TREND_DAYS, json!(self.get_quality_trend_days()?));
        snapshot.insert(
            config_keys::QUALITY_RECENT_FAILURES_LIMIT,
            json!(self.get_quality_recent_failures_limit()?),
        );
        snapshot.insert(
            config_keys::INVENTORY_DEFAULT_MIN_QUANTITY,
            json!(self.get_inventory_default_min_quantity()?),
        );
        snapshot.insert(
            config_keys::INVENTORY_DEFAULT_MAX_QUANTITY,
            json!(self.get_inventory_default_max_quantity()?),
        );
        Ok(serde_json::to_string(&snapshot)?)
    }

    // ===== 质量统计配置 =====

    /// 质量趋势窗口天数（默认 7，范围 1..=366）
    pub fn get_quality_trend_days(&self) -> RepositoryResult<u32> {
        let days = self.get_parsed_or_default(config_keys::QUALITY_TREND_DAYS, 7u32)?;
        let clamped = clamp_trend_days(days);
        if clamped != days {
            tracing::warn!(
                config_key = config_keys::QUALITY_TREND_DAYS,
                value = days,
                clamped,
                "配置超出范围，已截断"
            );
        }
        Ok(clamped)
    }

    /// 最近不合格记录条数（默认 5）
    pub fn get_quality_recent_failures_limit(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::QUALITY_RECENT_FAILURES_LIMIT, 5u32)
    }

    // ===== 库存默认值 =====

    pub fn get_inventory_default_min_quantity(&self) -> RepositoryResult<i64> {
        self.get_parsed_or_default(config_keys::INVENTORY_DEFAULT_MIN_QUANTITY, 0i64)
    }

    pub fn get_inventory_default_max_quantity(&self) -> RepositoryResult<i64> {
        self.get_parsed_or_default(config_keys::INVENTORY_DEFAULT_MAX_QUANTITY, 1000i64)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 质量
    pub const QUALITY_TREND_DAYS: &str = "quality_trend_days";
    pub const QUALITY_RECENT_FAILURES_LIMIT: &str = "quality_recent_failures_limit";

    // 库存
    pub const INVENTORY_DEFAULT_MIN_QUANTITY: &str = "inventory_default_min_quantity";
    pub const INVENTORY_DEFAULT_MAX_QUANTITY: &str = "inventory_default_max_quantity";
}
