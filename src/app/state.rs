// ==========================================
// 工厂管理系统 - 应用状态
// ==========================================
// 职责: 组装仓储 / 引擎 / API，供 HTTP 层共享
// ==========================================

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use crate::api::{DashboardApi, EquipmentApi, InventoryApi, ProductApi, ProductionApi, QualityApi};
use crate::config::ConfigManager;
use crate::db::{self, SharedConnection};
use crate::engine::{EquipmentAllocator, SharedClock, StatusSweeper};
use crate::repository::{
    EquipmentRepository, EquipmentTypeRepository, InventoryRepository, LocationRepository,
    ProductRepository, ProductionRepository, QualityCheckRepository, QualityStandardRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 共享数据库连接
    pub conn: SharedConnection,

    /// 时钟（状态扫描与时间戳）
    pub clock: SharedClock,

    /// 业务配置
    pub config_manager: Arc<ConfigManager>,

    pub equipment_api: Arc<EquipmentApi>,
    pub product_api: Arc<ProductApi>,
    pub production_api: Arc<ProductionApi>,
    pub quality_api: Arc<QualityApi>,
    pub inventory_api: Arc<InventoryApi>,
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 打开（必要时创建）数据库文件并组装状态
    pub fn open(db_path: &Path, clock: SharedClock) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
        }
        let path = db_path.to_string_lossy();
        tracing::info!("初始化AppState，数据库路径: {}", path);

        let conn = db::open_shared(&path).with_context(|| format!("无法打开数据库: {}", path))?;
        Ok(Self::from_connection(conn, clock))
    }

    /// 基于已建表的共享连接组装状态
    pub fn from_connection(conn: SharedConnection, clock: SharedClock) -> Self {
        // ==========================================
        // Repository 层
        // ==========================================
        let equipment_type_repo = Arc::new(EquipmentTypeRepository::new(conn.clone()));
        let location_repo = Arc::new(LocationRepository::new(conn.clone()));
        let equipment_repo = Arc::new(EquipmentRepository::new(conn.clone()));
        let product_repo = Arc::new(ProductRepository::new(conn.clone()));
        let production_repo = Arc::new(ProductionRepository::new(conn.clone()));
        let standard_repo = Arc::new(QualityStandardRepository::new(conn.clone()));
        let check_repo = Arc::new(QualityCheckRepository::new(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // Engine 层
        // ==========================================
        let sweeper = Arc::new(StatusSweeper::new(clock.clone(), production_repo.clone()));
        let allocator = Arc::new(EquipmentAllocator::new(
            clock.clone(),
            product_repo.clone(),
            production_repo.clone(),
        ));

        // ==========================================
        // API 层
        // ==========================================
        let equipment_api = Arc::new(EquipmentApi::new(
            equipment_type_repo.clone(),
            location_repo.clone(),
            equipment_repo.clone(),
            clock.clone(),
        ));
        let product_api = Arc::new(ProductApi::new(
            product_repo.clone(),
            equipment_type_repo,
            clock.clone(),
        ));
        let production_api = Arc::new(ProductionApi::new(
            production_repo.clone(),
            sweeper.clone(),
            allocator,
        ));
        let quality_api = Arc::new(QualityApi::new(
            standard_repo,
            check_repo.clone(),
            product_repo,
            production_repo.clone(),
            config_manager.clone(),
            clock.clone(),
        ));
        let inventory_api = Arc::new(InventoryApi::new(
            inventory_repo.clone(),
            location_repo,
            config_manager.clone(),
            clock.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            equipment_repo,
            production_repo,
            check_repo,
            inventory_repo,
            sweeper,
            clock.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Self {
            conn,
            clock,
            config_manager,
            equipment_api,
            product_api,
            production_api,
            quality_api,
            inventory_api,
            dashboard_api,
        }
    }
}
