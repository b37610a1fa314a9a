// ==========================================
// 工厂管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 启动时幂等建表，并记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 共享连接句柄
pub type SharedConnection = Arc<Mutex<Connection>>;

/// 建表脚本（全部 IF NOT EXISTS，可重复执行）
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS equipment_type (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS location (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS equipment (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    type_id TEXT NOT NULL REFERENCES equipment_type(id),
    location_id TEXT NOT NULL REFERENCES location(id),
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    operation_status TEXT NOT NULL DEFAULT 'STANDBY',
    last_maintenance TEXT NOT NULL,
    next_maintenance TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_equipment_type_op
    ON equipment(type_id, operation_status, id);

CREATE TABLE IF NOT EXISTS product (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    base_quantity INTEGER NOT NULL DEFAULT 0,
    base_days INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS product_equipment_type (
    product_id TEXT NOT NULL REFERENCES product(id) ON DELETE CASCADE,
    equipment_type_id TEXT NOT NULL REFERENCES equipment_type(id),
    quantity INTEGER NOT NULL,
    sequence INTEGER NOT NULL,
    PRIMARY KEY (product_id, equipment_type_id, sequence)
);

CREATE TABLE IF NOT EXISTS production (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL REFERENCES product(id),
    quantity INTEGER NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'PLANNED',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_production_status ON production(status);

CREATE TABLE IF NOT EXISTS production_equipment (
    id TEXT PRIMARY KEY,
    production_id TEXT NOT NULL REFERENCES production(id) ON DELETE CASCADE,
    equipment_id TEXT NOT NULL REFERENCES equipment(id),
    sequence INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_production_equipment_production
    ON production_equipment(production_id);

CREATE TABLE IF NOT EXISTS quality_standard (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL REFERENCES product(id),
    name TEXT NOT NULL,
    description TEXT,
    criteria_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quality_check (
    id TEXT PRIMARY KEY,
    standard_id TEXT NOT NULL REFERENCES quality_standard(id),
    production_id TEXT REFERENCES production(id),
    batch_number TEXT NOT NULL,
    inspector TEXT NOT NULL,
    check_date TEXT NOT NULL,
    results_json TEXT NOT NULL,
    status TEXT NOT NULL,
    notes TEXT,
    images_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_quality_check_date ON quality_check(check_date);

CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    item_name TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    location TEXT NOT NULL,
    min_quantity INTEGER NOT NULL DEFAULT 0,
    max_quantity INTEGER NOT NULL DEFAULT 1000,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库（测试用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开连接、建表，返回共享句柄
pub fn open_shared(db_path: &str) -> rusqlite::Result<SharedConnection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;

    match read_schema_version(&conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                "数据库 schema_version={} 高于程序期望的 {}",
                v,
                CURRENT_SCHEMA_VERSION
            );
        }
        _ => {}
    }

    Ok(Arc::new(Mutex::new(conn)))
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
