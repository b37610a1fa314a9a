// ==========================================
// 工厂管理系统 - 质量 API
// ==========================================
// 职责: 质检标准、质检记录、质量统计与趋势
// 配置: quality_trend_days / quality_recent_failures_limit
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::config::ConfigManager;
use crate::domain::quality::{
    CheckResult, CriteriaItem, QualityCheck, QualityCheckFilter, QualityCheckView, QualityStandard,
};
use crate::domain::types::QualityStatus;
use crate::engine::clock::SharedClock;
use crate::engine::stats::{
    product_defect_stats, quality_stats, quality_trends, trend_window_start, ProductDefectStat,
    QualityTrendPoint,
};
use crate::repository::{
    ProductRepository, ProductionRepository, QualityCheckRepository, QualityStandardRepository,
};

// ==========================================
// 请求 / 响应
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQualityStandardRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Vec<CriteriaItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckQuery {
    pub standard_id: Option<String>,
    pub production_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQualityCheckRequest {
    pub standard_id: Option<String>,
    pub production_id: Option<String>,
    pub batch_number: Option<String>,
    pub inspector: Option<String>,
    pub check_date: Option<String>,
    #[serde(default)]
    pub results: Vec<CheckResult>,
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStatsResponse {
    pub total_checks: i64,
    pub counts_by_status: BTreeMap<String, i64>,
    pub pass_rate: f64,
    pub recent_failures: Vec<QualityCheckView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTrendsResponse {
    pub trends: Vec<QualityTrendPoint>,
    pub product_stats: Vec<ProductDefectStat>,
}

// ==========================================
// QualityApi - 质量 API
// ==========================================
pub struct QualityApi {
    standard_repo: Arc<QualityStandardRepository>,
    check_repo: Arc<QualityCheckRepository>,
    product_repo: Arc<ProductRepository>,
    production_repo: Arc<ProductionRepository>,
    config_manager: Arc<ConfigManager>,
    clock: SharedClock,
}

impl QualityApi {
    pub fn new(
        standard_repo: Arc<QualityStandardRepository>,
        check_repo: Arc<QualityCheckRepository>,
        product_repo: Arc<ProductRepository>,
        production_repo: Arc<ProductionRepository>,
        config_manager: Arc<ConfigManager>,
        clock: SharedClock,
    ) -> Self {
        Self {
            standard_repo,
            check_repo,
            product_repo,
            production_repo,
            config_manager,
            clock,
        }
    }

    // ==========================================
    // 质检标准
    // ==========================================

    pub fn list_standards(&self, product_id: Option<&str>) -> ApiResult<Vec<QualityStandard>> {
        let product_id = product_id.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.standard_repo.list(product_id)?)
    }

    /// 创建质检标准
    ///
    /// # 校验
    /// - productId / name 必填，产品必须存在
    /// - 标准项名称非空；minValue 不大于 maxValue
    pub fn create_standard(&self, request: CreateQualityStandardRequest) -> ApiResult<QualityStandard> {
        let mut v = FieldValidator::new();
        let product_id = v.required_str("productId", request.product_id.as_deref());
        let name = v.required_str("name", request.name.as_deref());
        for (i, item) in request.criteria.iter().enumerate() {
            v.check(
                !item.name.trim().is_empty(),
                &format!("criteria[{}].name", i),
                "不能为空",
            );
            if let (Some(min), Some(max)) = (item.min_value, item.max_value) {
                v.check(min <= max, &format!("criteria[{}].maxValue", i), "不能小于 minValue");
            }
        }
        v.finish()?;

        let (Some(product_id), Some(name)) = (product_id, name) else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };
        if self.product_repo.find_by_id(&product_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Product(id={})不存在", product_id)));
        }

        let standard = QualityStandard {
            id: Uuid::new_v4().to_string(),
            product_id,
            name,
            description: FieldValidator::optional_str(request.description.as_deref()),
            criteria: request.criteria,
            created_at: self.clock.now(),
        };
        self.standard_repo.create(&standard)?;
        info!(standard_id = %standard.id, criteria = standard.criteria.len(), "质检标准已创建");
        Ok(standard)
    }

    // ==========================================
    // 质检记录
    // ==========================================

    pub fn list_checks(&self, query: QualityCheckQuery) -> ApiResult<Vec<QualityCheckView>> {
        let mut v = FieldValidator::new();
        let status = v.optional_enum::<QualityStatus>("status", query.status.as_deref());
        v.finish()?;

        let filter = QualityCheckFilter {
            standard_id: FieldValidator::optional_str(query.standard_id.as_deref()),
            production_id: FieldValidator::optional_str(query.production_id.as_deref()),
            status,
            limit: query.limit,
        };
        Ok(self.check_repo.list(&filter)?)
    }

    /// 创建质检记录
    ///
    /// 总结论由单项结果得出: 任一 FAIL 为 FAILED，否则 PASSED
    /// checkDate 缺省为当前时间
    pub fn create_check(&self, request: CreateQualityCheckRequest) -> ApiResult<QualityCheckView> {
        let mut v = FieldValidator::new();
        let standard_id = v.required_str("standardId", request.standard_id.as_deref());
        let batch_number = v.required_str("batchNumber", request.batch_number.as_deref());
        let inspector = v.required_str("inspector", request.inspector.as_deref());
        let check_date = v.optional_datetime("checkDate", request.check_date.as_deref());
        for (i, result) in request.results.iter().enumerate() {
            v.check(
                !result.criteria_id.trim().is_empty(),
                &format!("results[{}].criteriaId", i),
                "不能为空",
            );
        }
        v.finish()?;

        let (Some(standard_id), Some(batch_number), Some(inspector)) = (standard_id, batch_number, inspector)
        else {
            return Err(ApiError::InternalError("校验通过但字段缺失".to_string()));
        };

        if self.standard_repo.find_by_id(&standard_id)?.is_none() {
            return Err(ApiError::NotFound(format!("QualityStandard(id={})不存在", standard_id)));
        }
        let production_id = FieldValidator::optional_str(request.production_id.as_deref());
        if let Some(production_id) = &production_id {
            if self.production_repo.find_by_id(production_id)?.is_none() {
                return Err(ApiError::NotFound(format!("Production(id={})不存在", production_id)));
            }
        }

        let now = self.clock.now();
        let check = QualityCheck {
            id: Uuid::new_v4().to_string(),
            standard_id,
            production_id,
            batch_number,
            inspector,
            check_date: check_date.unwrap_or(now),
            status: QualityCheck::overall_status(&request.results),
            results: request.results,
            notes: FieldValidator::optional_str(request.notes.as_deref()),
            images: request.images,
            created_at: now,
        };
        self.check_repo.create(&check)?;
        info!(check_id = %check.id, status = %check.status, "质检记录已创建");

        self.check_repo
            .find_view_by_id(&check.id)?
            .ok_or_else(|| ApiError::NotFound(format!("QualityCheck(id={})不存在", check.id)))
    }

    // ==========================================
    // 统计
    // ==========================================

    pub fn get_stats(&self) -> ApiResult<QualityStatsResponse> {
        let counts = self.check_repo.count_by_status()?;
        let stats = quality_stats(&counts);
        let limit = self.config_manager.get_quality_recent_failures_limit()?;
        let recent_failures = self.check_repo.recent_failures(limit)?;

        let counts_by_status = QualityStatus::all()
            .iter()
            .map(|s| (s.to_db_str().to_string(), counts.get(s).copied().unwrap_or(0)))
            .collect();

        Ok(QualityStatsResponse {
            total_checks: stats.total,
            counts_by_status,
            pass_rate: stats.pass_rate,
            recent_failures,
        })
    }

    /// 最近 N 天（UTC 日期）的趋势与按产品的不合格率
    pub fn get_trends(&self) -> ApiResult<QualityTrendsResponse> {
        let days = self.config_manager.get_quality_trend_days()?;
        let today = self.clock.now().date_naive();
        let checks = self.check_repo.list_since(trend_window_start(today, days))?;

        Ok(QualityTrendsResponse {
            trends: quality_trends(&checks, today, days),
            product_stats: product_defect_stats(&checks),
        })
    }
}
