// ==========================================
// 工厂管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 每个错误带稳定的 code，供 HTTP 层输出
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// 字段级校验违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("数据验证失败: {}", summarize(.violations))]
    ValidationFailed { violations: Vec<FieldViolation> },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("设备不足: {equipment_type_name}({equipment_type_id}) 需要{required}台, 可用{available}台")]
    InsufficientEquipment {
        equipment_type_id: String,
        equipment_type_name: String,
        required: i64,
        available: i64,
    },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// 单字段校验失败
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationFailed {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InsufficientEquipment { .. } => "INSUFFICIENT_EQUIPMENT",
            ApiError::BusinessRuleViolation(_) => "CONFLICT",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为服务端错误（需要记录 error 日志）
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::DatabaseTransactionError(_)
                | ApiError::InternalError(_)
                | ApiError::Other(_)
        )
    }

    /// 错误详情（可选）
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ValidationFailed { violations } => Some(json!({ "violations": violations })),
            ApiError::InsufficientEquipment {
                equipment_type_id,
                equipment_type_name,
                required,
                available,
            } => Some(json!({
                "equipmentTypeId": equipment_type_id,
                "equipmentTypeName": equipment_type_name,
                "required": required,
                "available": available,
            })),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::InsufficientEquipment {
                equipment_type_id,
                equipment_type_name,
                required,
                available,
            } => ApiError::InsufficientEquipment {
                equipment_type_id,
                equipment_type_name,
                required,
                available,
            },

            // 数据库错误
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::invalid_field(field, message)
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Product".to_string(),
            id: "P001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Product"));
                assert!(msg.contains("P001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::UniqueConstraintViolation("UNIQUE".into()).into();
        assert_eq!(api_err.code(), "CONFLICT");
    }

    #[test]
    fn test_insufficient_equipment_details() {
        let api_err: ApiError = RepositoryError::InsufficientEquipment {
            equipment_type_id: "PRESS".into(),
            equipment_type_name: "压力机".into(),
            required: 3,
            available: 2,
        }
        .into();
        assert_eq!(api_err.code(), "INSUFFICIENT_EQUIPMENT");
        let details = api_err.details().unwrap();
        assert_eq!(details["equipmentTypeId"], "PRESS");
        assert_eq!(details["required"], 3);
        assert_eq!(details["available"], 2);
        assert!(!api_err.is_server_error());
    }

    #[test]
    fn test_validation_failed_lists_fields() {
        let err = ApiError::ValidationFailed {
            violations: vec![
                FieldViolation::new("quantity", "必须大于0"),
                FieldViolation::new("endTime", "必须晚于开始时间"),
            ],
        };
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert!(err.to_string().contains("quantity: 必须大于0"));
        let details = err.details().unwrap();
        assert_eq!(details["violations"][1]["field"], "endTime");
    }

    #[test]
    fn test_database_errors_are_server_errors() {
        let err: ApiError = RepositoryError::LockError("poisoned".into()).into();
        assert!(err.is_server_error());
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
