// ==========================================
// 工厂管理系统 - 生产计划仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// - 状态扫描与设备分配的判定由 engine 以闭包形式传入
// - 仓储只负责在同一事务里读取候选数据、落库
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row, TransactionBehavior};
use uuid::Uuid;

use crate::db::SharedConnection;
use crate::domain::equipment::Equipment;
use crate::domain::product::Product;
use crate::domain::production::{
    AllocatedEquipment, EquipmentAssignment, Production, ProductionEquipment,
    ProductionWithProduct, StatusTransition,
};
use crate::domain::types::{OperationStatus, ProductionStatus};
use crate::repository::common::{enum_column, lock_conn};
use crate::repository::equipment_repo::map_equipment;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct ProductionRepository {
    conn: SharedConnection,
}

const PRODUCTION_COLUMNS: &str =
    "p.id, p.product_id, p.quantity, p.start_time, p.end_time, p.status, p.created_at, p.updated_at";

fn map_production(row: &Row<'_>) -> SqliteResult<Production> {
    Ok(Production {
        id: row.get(0)?,
        product_id: row.get(1)?,
        quantity: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        status: enum_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// 生产列 (0..8) 之后紧跟产品列
fn map_production_with_product(row: &Row<'_>) -> SqliteResult<ProductionWithProduct> {
    let production = map_production(row)?;
    let product = Product {
        id: row.get(8)?,
        name: row.get(9)?,
        description: row.get(10)?,
        base_quantity: row.get(11)?,
        base_days: row.get(12)?,
        created_at: row.get(13)?,
    };
    Ok(ProductionWithProduct { production, product })
}

fn with_product_select() -> String {
    format!(
        r#"
        SELECT {}, pr.id, pr.name, pr.description, pr.base_quantity, pr.base_days, pr.created_at
        FROM production p
        JOIN product pr ON pr.id = p.product_id
        "#,
        PRODUCTION_COLUMNS
    )
}

impl ProductionRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Production>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM production p WHERE p.id = ?1", PRODUCTION_COLUMNS);
        let found = conn.query_row(&sql, params![id], map_production).optional()?;
        Ok(found)
    }

    pub fn find_with_product(&self, id: &str) -> RepositoryResult<Option<ProductionWithProduct>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("{} WHERE p.id = ?1", with_product_select());
        let found = conn
            .query_row(&sql, params![id], map_production_with_product)
            .optional()?;
        Ok(found)
    }

    /// 全部生产计划，按创建时间倒序
    pub fn list_with_products(&self) -> RepositoryResult<Vec<ProductionWithProduct>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("{} ORDER BY p.created_at DESC, p.id ASC", with_product_select());
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_production_with_product)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Production>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM production p ORDER BY p.created_at DESC, p.id ASC",
            PRODUCTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_production)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 已分配设备的展示行（含类型、位置、配方需求数量）
    pub fn list_allocated_equipment(
        &self,
        production_id: &str,
    ) -> RepositoryResult<Vec<AllocatedEquipment>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.name, t.name, l.name, pe.sequence, e.operation_status,
                   COALESCE((
                       SELECT pet.quantity FROM product_equipment_type pet
                       WHERE pet.product_id = p.product_id
                         AND pet.equipment_type_id = e.type_id
                         AND pet.sequence = pe.sequence
                   ), 1)
            FROM production_equipment pe
            JOIN production p ON p.id = pe.production_id
            JOIN equipment e ON e.id = pe.equipment_id
            JOIN equipment_type t ON t.id = e.type_id
            JOIN location l ON l.id = e.location_id
            WHERE pe.production_id = ?1
            ORDER BY pe.sequence ASC, e.id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![production_id], |row| {
                Ok(AllocatedEquipment {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    type_name: row.get(2)?,
                    location: row.get(3)?,
                    sequence: row.get(4)?,
                    status: enum_column(row, 5)?,
                    required: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 状态扫描
    ///
    /// # 说明
    /// - 在一个 IMMEDIATE 事务里读取未终结的生产计划（PLANNED / IN_PROGRESS）
    /// - `plan` 给出迁移列表，仓储按 `WHERE status = from` 条件更新
    /// - 返回实际生效的迁移
    pub fn apply_status_sweep<F>(
        &self,
        now: DateTime<Utc>,
        plan: F,
    ) -> RepositoryResult<Vec<StatusTransition>>
    where
        F: FnOnce(&[Production]) -> Vec<StatusTransition>,
    {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let candidates = {
            let sql = format!(
                "SELECT {} FROM production p WHERE p.status IN (?1, ?2) ORDER BY p.id ASC",
                PRODUCTION_COLUMNS
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![
                        ProductionStatus::Planned.to_db_str(),
                        ProductionStatus::InProgress.to_db_str()
                    ],
                    map_production,
                )?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        let transitions = plan(&candidates);
        let mut applied = Vec::with_capacity(transitions.len());
        for transition in transitions {
            let changed = tx.execute(
                "UPDATE production SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    transition.to.to_db_str(),
                    now,
                    transition.production_id,
                    transition.from.to_db_str(),
                ],
            )?;
            if changed == 1 {
                applied.push(transition);
            }
        }

        tx.commit()?;
        Ok(applied)
    }

    /// 创建生产计划并分配设备（全有或全无）
    ///
    /// # 参数
    /// - production: 待创建的生产计划（状态应为 PLANNED）
    /// - equipment_type_ids: 配方涉及的设备类型
    /// - plan: 根据事务内读取的待机设备池给出分配方案；返回 Err 时整个事务回滚
    ///
    /// # 返回
    /// - Ok(Vec<ProductionEquipment>): 已创建的分配记录
    /// - Err(InsufficientEquipment 等): 未写入任何数据
    pub fn create_with_allocation<F>(
        &self,
        production: &Production,
        equipment_type_ids: &[String],
        plan: F,
    ) -> RepositoryResult<Vec<ProductionEquipment>>
    where
        F: FnOnce(&[Equipment]) -> RepositoryResult<Vec<EquipmentAssignment>>,
    {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // 1. 事务内读取待机设备池（按 id 升序）
        let mut pool: Vec<Equipment> = Vec::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT e.id, e.name, e.type_id, e.location_id, e.status, e.operation_status,
                       e.last_maintenance, e.next_maintenance, e.created_at, e.updated_at
                FROM equipment e
                WHERE e.type_id = ?1 AND e.operation_status = ?2
                ORDER BY e.id ASC
                "#,
            )?;
            let mut seen_types: Vec<&str> = Vec::new();
            for type_id in equipment_type_ids {
                if seen_types.contains(&type_id.as_str()) {
                    continue;
                }
                seen_types.push(type_id.as_str());
                let rows = stmt
                    .query_map(
                        params![type_id, OperationStatus::Standby.to_db_str()],
                        map_equipment,
                    )?
                    .collect::<SqliteResult<Vec<_>>>()?;
                pool.extend(rows);
            }
        }
        pool.sort_by(|a, b| a.id.cmp(&b.id));

        // 2. 分配方案（失败则 tx 被 drop，自动回滚）
        let assignments = plan(&pool)?;

        // 3. 生产计划
        tx.execute(
            r#"
            INSERT INTO production (id, product_id, quantity, start_time, end_time, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                production.id,
                production.product_id,
                production.quantity,
                production.start_time,
                production.end_time,
                production.status.to_db_str(),
                production.created_at,
                production.updated_at,
            ],
        )?;

        // 4. 设备状态 + 分配记录
        let mut allocations = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let changed = tx.execute(
                r#"
                UPDATE equipment SET operation_status = ?1, updated_at = ?2
                WHERE id = ?3 AND operation_status = ?4
                "#,
                params![
                    OperationStatus::Operating.to_db_str(),
                    production.created_at,
                    assignment.equipment_id,
                    OperationStatus::Standby.to_db_str(),
                ],
            )?;
            if changed != 1 {
                return Err(RepositoryError::DatabaseTransactionError(format!(
                    "设备{}已不处于待机状态",
                    assignment.equipment_id
                )));
            }

            let row = ProductionEquipment {
                id: Uuid::new_v4().to_string(),
                production_id: production.id.clone(),
                equipment_id: assignment.equipment_id,
                sequence: assignment.sequence,
            };
            tx.execute(
                r#"
                INSERT INTO production_equipment (id, production_id, equipment_id, sequence)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![row.id, row.production_id, row.equipment_id, row.sequence],
            )?;
            allocations.push(row);
        }

        tx.commit()?;
        Ok(allocations)
    }
}
