// ==========================================
// 工厂管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: 规则为纯函数,落库交给仓储
// ==========================================

pub mod clock;
pub mod equipment_allocator;
pub mod stats;
pub mod status_sweeper;

// 重导出核心引擎
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use equipment_allocator::{plan_assignments, AllocationOutcome, EquipmentAllocator};
pub use stats::{
    EquipmentStats, InventoryStats, ProductDefectStat, ProductionStats, QualityStats,
    QualityTrendPoint,
};
pub use status_sweeper::{next_status, plan_transitions, StatusSweeper, SweepReport};
