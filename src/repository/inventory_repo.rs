// ==========================================
// 工厂管理系统 - 库存仓储
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

use crate::db::SharedConnection;
use crate::domain::inventory::{InventoryFields, InventoryItem};
use crate::repository::common::lock_conn;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct InventoryRepository {
    conn: SharedConnection,
}

const INVENTORY_COLUMNS: &str =
    "id, item_name, quantity, location, min_quantity, max_quantity, created_at, updated_at";

fn map_item(row: &Row<'_>) -> SqliteResult<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        item_name: row.get(1)?,
        quantity: row.get(2)?,
        location: row.get(3)?,
        min_quantity: row.get(4)?,
        max_quantity: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl InventoryRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, item: &InventoryItem) -> RepositoryResult<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO inventory (id, item_name, quantity, location, min_quantity, max_quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                item.id,
                item.item_name,
                item.quantity,
                item.location,
                item.min_quantity,
                item.max_quantity,
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<InventoryItem>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM inventory WHERE id = ?1", INVENTORY_COLUMNS);
        let found = conn.query_row(&sql, params![id], map_item).optional()?;
        Ok(found)
    }

    /// 按创建时间倒序
    pub fn list(&self) -> RepositoryResult<Vec<InventoryItem>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM inventory ORDER BY created_at DESC, id ASC",
            INVENTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], map_item)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    /// 更新库存项，记录不存在时返回 NotFound
    pub fn update(
        &self,
        id: &str,
        fields: &InventoryFields,
        now: DateTime<Utc>,
    ) -> RepositoryResult<InventoryItem> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            r#"
            UPDATE inventory
            SET item_name = ?1, quantity = ?2, location = ?3,
                min_quantity = ?4, max_quantity = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
            params![
                fields.item_name,
                fields.quantity,
                fields.location,
                fields.min_quantity,
                fields.max_quantity,
                now,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("InventoryItem", id));
        }

        let sql = format!("SELECT {} FROM inventory WHERE id = ?1", INVENTORY_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_item)?)
    }

    /// 删除库存项，记录不存在时返回 NotFound
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute("DELETE FROM inventory WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::not_found("InventoryItem", id));
        }
        Ok(())
    }
}
