// ==========================================
// 工厂管理系统 - 生产状态扫描引擎
// ==========================================
// 职责: 根据 now 与计划起止时间推进生产状态
// 规则:
//   PLANNED     且 start <= now < end -> IN_PROGRESS
//   IN_PROGRESS 且 now >= end         -> COMPLETED
//   其余不变（CANCELLED 永不触碰）
// 红线: Engine 不拼 SQL，迁移由仓储在同一事务内落库
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::production::{Production, StatusTransition};
use crate::domain::types::ProductionStatus;
use crate::engine::clock::SharedClock;
use crate::repository::{ProductionRepository, RepositoryResult};

/// 单条记录的下一个状态（纯函数）
pub fn next_status(
    status: ProductionStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ProductionStatus {
    match status {
        ProductionStatus::Planned if now >= start_time && now < end_time => {
            ProductionStatus::InProgress
        }
        ProductionStatus::InProgress if now >= end_time => ProductionStatus::Completed,
        other => other,
    }
}

/// 计算一批记录的状态迁移，不变的记录不出现在结果里
pub fn plan_transitions(productions: &[Production], now: DateTime<Utc>) -> Vec<StatusTransition> {
    productions
        .iter()
        .filter_map(|p| {
            let next = next_status(p.status, p.start_time, p.end_time, now);
            (next != p.status).then(|| StatusTransition {
                production_id: p.id.clone(),
                from: p.status,
                to: next,
            })
        })
        .collect()
}

/// 一次扫描的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub swept_at: DateTime<Utc>,
    pub transitions: Vec<StatusTransition>,
}

impl SweepReport {
    pub fn started(&self) -> usize {
        self.count_to(ProductionStatus::InProgress)
    }

    pub fn completed(&self) -> usize {
        self.count_to(ProductionStatus::Completed)
    }

    fn count_to(&self, status: ProductionStatus) -> usize {
        self.transitions.iter().filter(|t| t.to == status).count()
    }
}

// ==========================================
// StatusSweeper - 状态扫描器
// ==========================================
pub struct StatusSweeper {
    clock: SharedClock,
    production_repo: Arc<ProductionRepository>,
}

impl StatusSweeper {
    pub fn new(clock: SharedClock, production_repo: Arc<ProductionRepository>) -> Self {
        Self {
            clock,
            production_repo,
        }
    }

    /// 执行一次扫描
    ///
    /// 幂等：同一 now 下重复执行不会产生新的迁移
    pub fn sweep(&self) -> RepositoryResult<SweepReport> {
        let now = self.clock.now();
        let transitions = self
            .production_repo
            .apply_status_sweep(now, |candidates| {
                debug!(candidates = candidates.len(), now = %now, "生产状态扫描");
                plan_transitions(candidates, now)
            })?;

        let report = SweepReport {
            swept_at: now,
            transitions,
        };
        if !report.transitions.is_empty() {
            info!(
                started = report.started(),
                completed = report.completed(),
                "生产状态已推进"
            );
        }
        Ok(report)
    }
}
