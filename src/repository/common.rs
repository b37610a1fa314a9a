// ==========================================
// 工厂管理系统 - 仓储公共工具
// ==========================================
// 连接加锁 / 枚举列 / JSON 列的统一解析
// 解析失败作为 FromSql 错误上抛
// ==========================================

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::MutexGuard;

use crate::db::SharedConnection;
use crate::domain::types::UnknownVariant;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 获取数据库连接
pub(crate) fn lock_conn(conn: &SharedConnection) -> RepositoryResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

/// 读取枚举列（TEXT）
pub(crate) fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 读取 JSON 列（TEXT）
pub(crate) fn json_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: DeserializeOwned,
{
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
