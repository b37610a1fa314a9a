// ==========================================
// 工厂管理系统 - 驾驶舱 API
// ==========================================
// 职责: 四个模块的汇总指标
// 读前先执行生产状态扫描
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::engine::clock::SharedClock;
use crate::engine::stats::{
    equipment_stats, inventory_stats, production_stats, quality_stats, EquipmentStats,
    InventoryStats, ProductionStats, QualityStats,
};
use crate::engine::status_sweeper::StatusSweeper;
use crate::repository::{
    EquipmentRepository, InventoryRepository, ProductionRepository, QualityCheckRepository,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub equipment: EquipmentStats,
    pub production: ProductionStats,
    pub quality: QualityStats,
    pub inventory: InventoryStats,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    equipment_repo: Arc<EquipmentRepository>,
    production_repo: Arc<ProductionRepository>,
    check_repo: Arc<QualityCheckRepository>,
    inventory_repo: Arc<InventoryRepository>,
    sweeper: Arc<StatusSweeper>,
    clock: SharedClock,
}

impl DashboardApi {
    pub fn new(
        equipment_repo: Arc<EquipmentRepository>,
        production_repo: Arc<ProductionRepository>,
        check_repo: Arc<QualityCheckRepository>,
        inventory_repo: Arc<InventoryRepository>,
        sweeper: Arc<StatusSweeper>,
        clock: SharedClock,
    ) -> Self {
        Self {
            equipment_repo,
            production_repo,
            check_repo,
            inventory_repo,
            sweeper,
            clock,
        }
    }

    pub fn get_stats(&self) -> ApiResult<DashboardStats> {
        let report = self.sweeper.sweep()?;
        let now = report.swept_at;

        let equipments = self.equipment_repo.list()?;
        let productions = self.production_repo.list()?;
        let counts = self.check_repo.count_by_status()?;
        let items = self.inventory_repo.list()?;

        Ok(DashboardStats {
            equipment: equipment_stats(&equipments, now),
            production: production_stats(&productions),
            quality: quality_stats(&counts),
            inventory: inventory_stats(&items),
            updated_at: self.clock.now(),
        })
    }
}
