// ==========================================
// 工厂管理系统 - 产品与配方仓储
// ==========================================
// 表: product / product_equipment_type
// ==========================================

use crate::db::SharedConnection;
use crate::domain::product::{Product, RecipeLine};
use crate::repository::common::lock_conn;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

pub struct ProductRepository {
    conn: SharedConnection,
}

const PRODUCT_COLUMNS: &str = "id, name, description, base_quantity, base_days, created_at";

pub(crate) fn map_product(row: &Row<'_>) -> SqliteResult<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        base_quantity: row.get(3)?,
        base_days: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl ProductRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 创建产品及其配方（同一事务）
    pub fn create_with_recipe(&self, product: &Product, recipe: &[RecipeLine]) -> RepositoryResult<()> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO product (id, name, description, base_quantity, base_days, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                product.id,
                product.name,
                product.description,
                product.base_quantity,
                product.base_days,
                product.created_at,
            ],
        )?;

        for line in recipe {
            tx.execute(
                r#"
                INSERT INTO product_equipment_type (product_id, equipment_type_id, quantity, sequence)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![product.id, line.equipment_type_id, line.quantity, line.sequence],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 按名称升序
    pub fn list(&self) -> RepositoryResult<Vec<Product>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM product ORDER BY name ASC", PRODUCT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map([], map_product)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(products)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM product WHERE id = ?1", PRODUCT_COLUMNS);
        let found = conn.query_row(&sql, params![id], map_product).optional()?;
        Ok(found)
    }

    /// 产品配方，按工序升序
    pub fn find_recipe(&self, product_id: &str) -> RepositoryResult<Vec<RecipeLine>> {
        let conn = lock_conn(&self.conn)?;
        Ok(query_recipe(&conn, product_id)?)
    }
}

/// 读取配方（供事务内复用）
pub(crate) fn query_recipe(conn: &Connection, product_id: &str) -> SqliteResult<Vec<RecipeLine>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT pet.product_id, pet.equipment_type_id, t.name, pet.quantity, pet.sequence
        FROM product_equipment_type pet
        JOIN equipment_type t ON t.id = pet.equipment_type_id
        WHERE pet.product_id = ?1
        ORDER BY pet.sequence ASC, pet.equipment_type_id ASC
        "#,
    )?;
    let lines = stmt
        .query_map(params![product_id], |row| {
            Ok(RecipeLine {
                product_id: row.get(0)?,
                equipment_type_id: row.get(1)?,
                equipment_type_name: row.get(2)?,
                quantity: row.get(3)?,
                sequence: row.get(4)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(lines)
}
