// ==========================================
// 工厂管理系统 - 质量数据仓储
// ==========================================
// 表: quality_standard / quality_check
// criteria / results / images 以 JSON 文本存储
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;

use crate::db::SharedConnection;
use crate::domain::quality::{QualityCheck, QualityCheckFilter, QualityCheckView, QualityStandard};
use crate::domain::types::QualityStatus;
use crate::repository::common::{enum_column, json_column, lock_conn};
use crate::repository::error::RepositoryResult;

// ==========================================
// QualityStandardRepository - 质检标准仓储
// ==========================================
pub struct QualityStandardRepository {
    conn: SharedConnection,
}

fn map_standard(row: &Row<'_>) -> SqliteResult<QualityStandard> {
    Ok(QualityStandard {
        id: row.get(0)?,
        product_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        criteria: json_column(row, 4)?,
        created_at: row.get(5)?,
    })
}

impl QualityStandardRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, standard: &QualityStandard) -> RepositoryResult<()> {
        let criteria_json = serde_json::to_string(&standard.criteria)?;
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO quality_standard (id, product_id, name, description, criteria_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                standard.id,
                standard.product_id,
                standard.name,
                standard.description,
                criteria_json,
                standard.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<QualityStandard>> {
        let conn = lock_conn(&self.conn)?;
        let found = conn
            .query_row(
                r#"
                SELECT id, product_id, name, description, criteria_json, created_at
                FROM quality_standard WHERE id = ?1
                "#,
                params![id],
                map_standard,
            )
            .optional()?;
        Ok(found)
    }

    /// 按产品过滤（可选），按创建时间倒序
    pub fn list(&self, product_id: Option<&str>) -> RepositoryResult<Vec<QualityStandard>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, product_id, name, description, criteria_json, created_at
            FROM quality_standard
            WHERE (?1 IS NULL OR product_id = ?1)
            ORDER BY created_at DESC, id ASC
            "#,
        )?;
        let standards = stmt
            .query_map(params![product_id], map_standard)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(standards)
    }
}

// ==========================================
// QualityCheckRepository - 质检记录仓储
// ==========================================
pub struct QualityCheckRepository {
    conn: SharedConnection,
}

const CHECK_VIEW_SELECT: &str = r#"
    SELECT qc.id, qc.standard_id, qc.production_id, qc.batch_number, qc.inspector,
           qc.check_date, qc.results_json, qc.status, qc.notes, qc.images_json, qc.created_at,
           qs.name, p.id, p.name
    FROM quality_check qc
    JOIN quality_standard qs ON qs.id = qc.standard_id
    JOIN product p ON p.id = qs.product_id
"#;

fn map_check_view(row: &Row<'_>) -> SqliteResult<QualityCheckView> {
    Ok(QualityCheckView {
        check: QualityCheck {
            id: row.get(0)?,
            standard_id: row.get(1)?,
            production_id: row.get(2)?,
            batch_number: row.get(3)?,
            inspector: row.get(4)?,
            check_date: row.get(5)?,
            results: json_column(row, 6)?,
            status: enum_column(row, 7)?,
            notes: row.get(8)?,
            images: json_column(row, 9)?,
            created_at: row.get(10)?,
        },
        standard_name: row.get(11)?,
        product_id: row.get(12)?,
        product_name: row.get(13)?,
    })
}

impl QualityCheckRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, check: &QualityCheck) -> RepositoryResult<()> {
        let results_json = serde_json::to_string(&check.results)?;
        let images_json = serde_json::to_string(&check.images)?;
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO quality_check (
                id, standard_id, production_id, batch_number, inspector,
                check_date, results_json, status, notes, images_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                check.id,
                check.standard_id,
                check.production_id,
                check.batch_number,
                check.inspector,
                check.check_date,
                results_json,
                check.status.to_db_str(),
                check.notes,
                images_json,
                check.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_view_by_id(&self, id: &str) -> RepositoryResult<Option<QualityCheckView>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("{} WHERE qc.id = ?1", CHECK_VIEW_SELECT);
        let found = conn.query_row(&sql, params![id], map_check_view).optional()?;
        Ok(found)
    }

    /// 条件查询，按检测日期倒序、创建时间倒序
    pub fn list(&self, filter: &QualityCheckFilter) -> RepositoryResult<Vec<QualityCheckView>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(standard_id) = &filter.standard_id {
            clauses.push("qc.standard_id = ?");
            values.push(Value::Text(standard_id.clone()));
        }
        if let Some(production_id) = &filter.production_id {
            clauses.push("qc.production_id = ?");
            values.push(Value::Text(production_id.clone()));
        }
        if let Some(status) = filter.status {
            clauses.push("qc.status = ?");
            values.push(Value::Text(status.to_db_str().to_string()));
        }

        let mut sql = CHECK_VIEW_SELECT.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY qc.check_date DESC, qc.created_at DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::from(limit)));
        }

        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(&sql)?;
        let checks = stmt
            .query_map(params_from_iter(values), map_check_view)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(checks)
    }

    /// check_date >= since 的记录
    pub fn list_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<QualityCheckView>> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!(
            "{} WHERE qc.check_date >= ?1 ORDER BY qc.check_date ASC",
            CHECK_VIEW_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let checks = stmt
            .query_map(params![since], map_check_view)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(checks)
    }

    /// 各结论计数
    pub fn count_by_status(&self) -> RepositoryResult<HashMap<QualityStatus, i64>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM quality_check GROUP BY status")?;
        let pairs = stmt
            .query_map([], |row| Ok((enum_column::<QualityStatus>(row, 0)?, row.get::<_, i64>(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(pairs.into_iter().collect())
    }

    /// 最近的不合格记录
    pub fn recent_failures(&self, limit: u32) -> RepositoryResult<Vec<QualityCheckView>> {
        self.list(&QualityCheckFilter {
            status: Some(QualityStatus::Failed),
            limit: Some(limit),
            ..QualityCheckFilter::default()
        })
    }
}
