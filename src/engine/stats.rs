// ==========================================
// 工厂管理系统 - 统计引擎
// ==========================================
// 职责: 设备/生产/质量/库存的汇总指标
// 输入: 仓储读出的实体列表
// 输出: 可直接序列化的统计结构（camelCase）
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::equipment::Equipment;
use crate::domain::inventory::{InventoryItem, StockLevel};
use crate::domain::production::Production;
use crate::domain::quality::QualityCheckView;
use crate::domain::types::{EquipmentStatus, OperationStatus, ProductionStatus, QualityStatus};

/// 百分比，保留两位小数；分母为 0 时返回 0
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

// ==========================================
// 设备统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStats {
    pub total: i64,
    pub active: i64,
    pub needs_maintenance: i64,
    pub operating: i64,
    pub standby: i64,
}

pub fn equipment_stats<'a, I>(equipments: I, now: DateTime<Utc>) -> EquipmentStats
where
    I: IntoIterator<Item = &'a Equipment>,
{
    let mut stats = EquipmentStats::default();
    for e in equipments {
        stats.total += 1;
        if e.status == EquipmentStatus::Active {
            stats.active += 1;
        }
        if e.needs_maintenance(now) {
            stats.needs_maintenance += 1;
        }
        match e.operation_status {
            OperationStatus::Operating => stats.operating += 1,
            OperationStatus::Standby => stats.standby += 1,
        }
    }
    stats
}

// ==========================================
// 生产统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStats {
    pub total: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub planned: i64,
}

pub fn production_stats<'a, I>(productions: I) -> ProductionStats
where
    I: IntoIterator<Item = &'a Production>,
{
    let mut stats = ProductionStats::default();
    for p in productions {
        stats.total += 1;
        match p.status {
            ProductionStatus::Planned => stats.planned += 1,
            ProductionStatus::InProgress => stats.in_progress += 1,
            ProductionStatus::Completed => stats.completed += 1,
            ProductionStatus::Cancelled => {}
        }
    }
    stats
}

// ==========================================
// 质量统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub needs_review: i64,
    pub pass_rate: f64,
}

pub fn quality_stats(counts: &HashMap<QualityStatus, i64>) -> QualityStats {
    let get = |s: QualityStatus| counts.get(&s).copied().unwrap_or(0);
    let passed = get(QualityStatus::Passed);
    let failed = get(QualityStatus::Failed);
    let needs_review = get(QualityStatus::NeedsReview);
    let total = passed + failed + needs_review;
    QualityStats {
        total,
        passed,
        failed,
        needs_review,
        pass_rate: percentage(passed, total),
    }
}

// ==========================================
// 库存统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total: i64,
    pub low_stock: i64,
    pub optimal_stock: i64,
    pub high_stock: i64,
}

pub fn inventory_stats(items: &[InventoryItem]) -> InventoryStats {
    let mut stats = InventoryStats::default();
    for item in items {
        stats.total += 1;
        match item.stock_level() {
            StockLevel::Low => stats.low_stock += 1,
            StockLevel::Optimal => stats.optimal_stock += 1,
            StockLevel::High => stats.high_stock += 1,
        }
    }
    stats
}

// ==========================================
// 质量趋势
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTrendPoint {
    pub date: NaiveDate,
    pub pass: i64,
    pub fail: i64,
    pub review: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDefectStat {
    pub product_id: String,
    pub product_name: String,
    pub total: i64,
    pub fail: i64,
    pub defect_rate: f64,
}

/// 趋势窗口天数上限
pub const MAX_TREND_DAYS: u32 = 366;

/// 窗口天数限制在 [1, MAX_TREND_DAYS]
pub fn clamp_trend_days(days: u32) -> u32 {
    days.clamp(1, MAX_TREND_DAYS)
}

// today 往前 back 天；越过日期下界时取 NaiveDate::MIN
fn days_before(today: NaiveDate, back: u32) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(i64::from(back)))
        .unwrap_or(NaiveDate::MIN)
}

/// 趋势窗口的起点（含）：today 往前 days-1 天的 00:00 UTC
pub fn trend_window_start(today: NaiveDate, days: u32) -> DateTime<Utc> {
    let first = days_before(today, clamp_trend_days(days) - 1);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// 按 UTC 日期分桶，空日期也输出
pub fn quality_trends(checks: &[QualityCheckView], today: NaiveDate, days: u32) -> Vec<QualityTrendPoint> {
    let days = clamp_trend_days(days);
    let mut buckets: BTreeMap<NaiveDate, QualityTrendPoint> = (0..days)
        .map(|offset| {
            let date = days_before(today, days - 1 - offset);
            (
                date,
                QualityTrendPoint {
                    date,
                    pass: 0,
                    fail: 0,
                    review: 0,
                },
            )
        })
        .collect();

    for view in checks {
        let Some(point) = buckets.get_mut(&view.check.check_date.date_naive()) else {
            continue;
        };
        match view.check.status {
            QualityStatus::Passed => point.pass += 1,
            QualityStatus::Failed => point.fail += 1,
            QualityStatus::NeedsReview => point.review += 1,
        }
    }

    buckets.into_values().collect()
}

/// 按产品汇总不合格率，降序
pub fn product_defect_stats(checks: &[QualityCheckView]) -> Vec<ProductDefectStat> {
    let mut by_product: HashMap<&str, ProductDefectStat> = HashMap::new();
    for view in checks {
        let entry = by_product
            .entry(view.product_id.as_str())
            .or_insert_with(|| ProductDefectStat {
                product_id: view.product_id.clone(),
                product_name: view.product_name.clone(),
                total: 0,
                fail: 0,
                defect_rate: 0.0,
            });
        entry.total += 1;
        if view.check.status == QualityStatus::Failed {
            entry.fail += 1;
        }
    }

    let mut stats: Vec<ProductDefectStat> = by_product
        .into_values()
        .map(|mut s| {
            s.defect_rate = percentage(s.fail, s.total);
            s
        })
        .collect();
    stats.sort_by(|a, b| {
        b.defect_rate
            .total_cmp(&a.defect_rate)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    stats
}
