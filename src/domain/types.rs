// ==========================================
// 工厂管理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 枚举解析失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知的{}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// 生成 Display / FromStr / to_db_str 的样板
macro_rules! db_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// 转换为数据库存储的字符串
            pub fn to_db_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// 全部取值
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.to_db_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

// ==========================================
// 生产状态 (Production Status)
// ==========================================
// PLANNED -> IN_PROGRESS -> COMPLETED 由时间扫描推进
// CANCELLED 为外部终止状态，扫描不触碰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Planned,    // 计划中
    InProgress, // 生产中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

db_enum!(ProductionStatus, "生产状态", {
    Planned => "PLANNED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl ProductionStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductionStatus::Completed | ProductionStatus::Cancelled)
    }
}

// ==========================================
// 设备健康状态 (Equipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Active,      // 正常
    Inactive,    // 停用
    Maintenance, // 保养中
    Repair,      // 维修中
}

db_enum!(EquipmentStatus, "设备状态", {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Maintenance => "MAINTENANCE",
    Repair => "REPAIR",
});

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Active
    }
}

// ==========================================
// 设备分配状态 (Operation Status)
// ==========================================
// 只有分配器会把 STANDBY 改为 OPERATING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Operating, // 已分配
    Standby,   // 待机
}

db_enum!(OperationStatus, "运行状态", {
    Operating => "OPERATING",
    Standby => "STANDBY",
});

impl Default for OperationStatus {
    fn default() -> Self {
        OperationStatus::Standby
    }
}

// ==========================================
// 质检结论 (Quality Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityStatus {
    Passed,      // 合格
    Failed,      // 不合格
    NeedsReview, // 待复核
}

db_enum!(QualityStatus, "质检结论", {
    Passed => "PASSED",
    Failed => "FAILED",
    NeedsReview => "NEEDS_REVIEW",
});

// ==========================================
// 单项检测结果 (Check Result Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckResultStatus {
    Pass,
    Fail,
}

db_enum!(CheckResultStatus, "检测结果", {
    Pass => "PASS",
    Fail => "FAIL",
});

// ==========================================
// 质检标准项类型 (Criteria Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriteriaType {
    Numeric, // 数值测量
    Visual,  // 目视检查
    Image,   // 图像检查
}

db_enum!(CriteriaType, "标准项类型", {
    Numeric => "NUMERIC",
    Visual => "VISUAL",
    Image => "IMAGE",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_status_db_roundtrip() {
        for status in ProductionStatus::all() {
            let parsed: ProductionStatus = status.to_db_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
        assert_eq!("in_progress".parse::<ProductionStatus>().unwrap(), ProductionStatus::InProgress);
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let err = "RUNNING".parse::<OperationStatus>().unwrap_err();
        assert_eq!(err.value, "RUNNING");
        assert!(err.to_string().contains("运行状态"));
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&QualityStatus::NeedsReview).unwrap();
        assert_eq!(json, "\"NEEDS_REVIEW\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProductionStatus::Completed.is_terminal());
        assert!(ProductionStatus::Cancelled.is_terminal());
        assert!(!ProductionStatus::Planned.is_terminal());
    }
}
