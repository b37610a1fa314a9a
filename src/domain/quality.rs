// ==========================================
// 工厂管理系统 - 质量领域模型
// ==========================================
// 质检标准 / 质检记录
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{CheckResultStatus, CriteriaType, QualityStatus};

// ==========================================
// QualityStandard - 质检标准
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaItem {
    pub name: String,
    #[serde(rename = "type")]
    pub criteria_type: CriteriaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStandard {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub criteria: Vec<CriteriaItem>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// QualityCheck - 质检记录
// ==========================================

/// 检测值：数值或文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub criteria_id: String,
    pub value: CheckValue,
    pub status: CheckResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheck {
    pub id: String,
    pub standard_id: String,
    pub production_id: Option<String>,
    pub batch_number: String,
    pub inspector: String,
    pub check_date: DateTime<Utc>,
    pub results: Vec<CheckResult>,
    pub status: QualityStatus,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl QualityCheck {
    /// 根据单项结果得出总结论：任一 FAIL 即 FAILED
    pub fn overall_status(results: &[CheckResult]) -> QualityStatus {
        if results.iter().any(|r| r.status == CheckResultStatus::Fail) {
            QualityStatus::Failed
        } else {
            QualityStatus::Passed
        }
    }
}

/// 质检记录 + 所属产品名（统计/列表使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckView {
    #[serde(flatten)]
    pub check: QualityCheck,
    pub standard_name: String,
    pub product_id: String,
    pub product_name: String,
}

/// 质检记录查询条件
#[derive(Debug, Clone, Default)]
pub struct QualityCheckFilter {
    pub standard_id: Option<String>,
    pub production_id: Option<String>,
    pub status: Option<QualityStatus>,
    pub limit: Option<u32>,
}
