// ==========================================
// 工厂管理系统 - 设备数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: equipment_type / location / equipment
// ==========================================

use crate::db::SharedConnection;
use crate::domain::equipment::{
    Equipment, EquipmentDetail, EquipmentType, Location, LocationSummary,
};
use crate::repository::common::{enum_column, lock_conn};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

// ==========================================
// EquipmentTypeRepository - 设备类型仓储
// ==========================================
pub struct EquipmentTypeRepository {
    conn: SharedConnection,
}

impl EquipmentTypeRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, equipment_type: &EquipmentType) -> RepositoryResult<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO equipment_type (id, name) VALUES (?1, ?2)",
            params![equipment_type.id, equipment_type.name],
        )?;
        Ok(())
    }

    /// 按名称升序
    pub fn list(&self) -> RepositoryResult<Vec<EquipmentType>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name FROM equipment_type ORDER BY name ASC")?;
        let types = stmt
            .query_map([], |row| {
                Ok(EquipmentType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(types)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<EquipmentType>> {
        let conn = lock_conn(&self.conn)?;
        let found = conn
            .query_row(
                "SELECT id, name FROM equipment_type WHERE id = ?1",
                params![id],
                |row| {
                    Ok(EquipmentType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }
}

// ==========================================
// LocationRepository - 位置仓储
// ==========================================
pub struct LocationRepository {
    conn: SharedConnection,
}

impl LocationRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, location: &Location) -> RepositoryResult<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO location (id, name, description) VALUES (?1, ?2, ?3)",
            params![location.id, location.name, location.description],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Location>> {
        let conn = lock_conn(&self.conn)?;
        let found = conn
            .query_row(
                "SELECT id, name, description FROM location WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Location {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Location>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name, description FROM location ORDER BY name ASC")?;
        let locations = stmt
            .query_map([], |row| {
                Ok(Location {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(locations)
    }

    /// 位置列表 + 每个位置的设备数量，按名称升序
    pub fn list_with_counts(&self) -> RepositoryResult<Vec<LocationSummary>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT l.id, l.name, l.description, COUNT(e.id)
            FROM location l
            LEFT JOIN equipment e ON e.location_id = l.id
            GROUP BY l.id, l.name, l.description
            ORDER BY l.name ASC
            "#,
        )?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(LocationSummary {
                    location: Location {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    },
                    equipment_count: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(summaries)
    }
}

// ==========================================
// EquipmentRepository - 设备仓储
// ==========================================
// operation_status 的变更只发生在分配事务里（见 ProductionRepository）
pub struct EquipmentRepository {
    conn: SharedConnection,
}

const EQUIPMENT_COLUMNS: &str = "e.id, e.name, e.type_id, e.location_id, e.status, e.operation_status, \
     e.last_maintenance, e.next_maintenance, e.created_at, e.updated_at";

pub(crate) fn map_equipment(row: &Row<'_>) -> SqliteResult<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        name: row.get(1)?,
        type_id: row.get(2)?,
        location_id: row.get(3)?,
        status: enum_column(row, 4)?,
        operation_status: enum_column(row, 5)?,
        last_maintenance: row.get(6)?,
        next_maintenance: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl EquipmentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, equipment: &Equipment) -> RepositoryResult<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO equipment (
                id, name, type_id, location_id, status, operation_status,
                last_maintenance, next_maintenance, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                equipment.id,
                equipment.name,
                equipment.type_id,
                equipment.location_id,
                equipment.status.to_db_str(),
                equipment.operation_status.to_db_str(),
                equipment.last_maintenance,
                equipment.next_maintenance,
                equipment.created_at,
                equipment.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Equipment>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM equipment e WHERE e.id = ?1", EQUIPMENT_COLUMNS);
        let found = conn.query_row(&sql, params![id], map_equipment).optional()?;
        Ok(found)
    }

    /// 全部设备，按 id 升序
    pub fn list(&self) -> RepositoryResult<Vec<Equipment>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM equipment e ORDER BY e.id ASC", EQUIPMENT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let equipments = stmt
            .query_map([], map_equipment)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(equipments)
    }

    /// 设备 + 类型 + 位置，按 id 升序
    pub fn list_details(&self) -> RepositoryResult<Vec<EquipmentDetail>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("{} ORDER BY e.id ASC", detail_select());
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map([], map_equipment_detail)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(details)
    }

    pub fn find_detail_by_id(&self, id: &str) -> RepositoryResult<Option<EquipmentDetail>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("{} WHERE e.id = ?1", detail_select());
        let found = conn
            .query_row(&sql, params![id], map_equipment_detail)
            .optional()?;
        Ok(found)
    }
}

fn detail_select() -> String {
    format!(
        r#"
        SELECT {}, t.id, t.name, l.id, l.name, l.description
        FROM equipment e
        JOIN equipment_type t ON t.id = e.type_id
        JOIN location l ON l.id = e.location_id
        "#,
        EQUIPMENT_COLUMNS
    )
}

fn map_equipment_detail(row: &Row<'_>) -> SqliteResult<EquipmentDetail> {
    Ok(EquipmentDetail {
        equipment: map_equipment(row)?,
        equipment_type: EquipmentType {
            id: row.get(10)?,
            name: row.get(11)?,
        },
        location: Location {
            id: row.get(12)?,
            name: row.get(13)?,
            description: row.get(14)?,
        },
    })
}
