// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、基础数据写入等功能
// ==========================================

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use factory_mes::db::{self, SharedConnection};
use factory_mes::domain::{Equipment, EquipmentType, Location, Product, RecipeLine};
use factory_mes::repository::{
    EquipmentRepository, EquipmentTypeRepository, LocationRepository, ProductRepository,
};
use factory_mes::{EquipmentStatus, OperationStatus};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 固定基准时间，避免测试依赖系统时钟
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（已建表）
pub fn open_shared(db_path: &str) -> Result<SharedConnection, Box<dyn Error>> {
    let conn = db::open_sqlite_connection(db_path)?;
    db::init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 统计表行数
pub fn count_rows(conn: &SharedConnection, table: &str) -> i64 {
    let conn = conn.lock().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

// ==========================================
// 基础数据
// ==========================================

pub fn insert_equipment_type(conn: &SharedConnection, id: &str, name: &str) {
    EquipmentTypeRepository::new(conn.clone())
        .create(&EquipmentType {
            id: id.to_string(),
            name: name.to_string(),
        })
        .unwrap();
}

pub fn insert_location(conn: &SharedConnection, id: &str, name: &str) {
    LocationRepository::new(conn.clone())
        .create(&Location {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        })
        .unwrap();
}

/// 写入一台设备（保养日期以基准时间为参照，不需要保养）
pub fn insert_equipment(
    conn: &SharedConnection,
    id: &str,
    type_id: &str,
    location_id: &str,
    operation_status: OperationStatus,
) {
    let now = base_time();
    EquipmentRepository::new(conn.clone())
        .create(&Equipment {
            id: id.to_string(),
            name: format!("设备 {}", id),
            type_id: type_id.to_string(),
            location_id: location_id.to_string(),
            status: EquipmentStatus::Active,
            operation_status,
            last_maintenance: now - Duration::days(3),
            next_maintenance: now + Duration::days(30),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
}

/// 写入产品及配方，recipe 为 (设备类型, 数量, 工序)
pub fn insert_product(conn: &SharedConnection, id: &str, name: &str, recipe: &[(&str, i64, i64)]) {
    let product = Product {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        base_quantity: 100,
        base_days: 1,
        created_at: base_time(),
    };
    let lines: Vec<RecipeLine> = recipe
        .iter()
        .map(|(type_id, quantity, sequence)| RecipeLine {
            product_id: id.to_string(),
            equipment_type_id: type_id.to_string(),
            equipment_type_name: String::new(),
            quantity: *quantity,
            sequence: *sequence,
        })
        .collect();
    ProductRepository::new(conn.clone())
        .create_with_recipe(&product, &lines)
        .unwrap();
}

/// 标准车间: PRESS x2, INSPECTION x1，均为待机
pub fn seed_basic_floor(conn: &SharedConnection) {
    insert_equipment_type(conn, "PRESS", "压力机");
    insert_equipment_type(conn, "INSPECTION", "检测设备");
    insert_location(conn, "F1-A", "1层A区");
    insert_equipment(conn, "PRESS-001", "PRESS", "F1-A", OperationStatus::Standby);
    insert_equipment(conn, "PRESS-002", "PRESS", "F1-A", OperationStatus::Standby);
    insert_equipment(conn, "INSPECTION-001", "INSPECTION", "F1-A", OperationStatus::Standby);
}

/// 读取设备运行状态
pub fn operation_status_of(conn: &SharedConnection, equipment_id: &str) -> String {
    let conn = conn.lock().unwrap();
    conn.query_row(
        "SELECT operation_status FROM equipment WHERE id = ?1",
        [equipment_id],
        |row| row.get(0),
    )
    .unwrap()
}
