// ==========================================
// 工厂管理系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 业务规则错误 =====
    /// 配方某一行的待机设备不足（分配整体失败）
    #[error("设备不足: {equipment_type_name}({equipment_type_id}) 需要{required}台, 可用{available}台")]
    InsufficientEquipment {
        equipment_type_id: String,
        equipment_type_name: String,
        required: i64,
        available: i64,
    },

    // ===== 数据质量错误 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error("JSON 序列化失败: {0}")]
    SerializationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_insufficient_equipment_message_names_type() {
        let err = RepositoryError::InsufficientEquipment {
            equipment_type_id: "PRESS".to_string(),
            equipment_type_name: "压力机".to_string(),
            required: 3,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("PRESS"));
        assert!(msg.contains("需要3台"));
        assert!(msg.contains("可用2台"));
    }
}
