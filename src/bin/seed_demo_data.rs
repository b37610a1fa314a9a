// ==========================================
// 工厂管理系统 - 演示数据初始化
// ==========================================
// 用法: seed_demo_data [db_path]
// - 备份并删除已有数据库文件
// - 写入设备类型 / 位置 / 设备 / 产品配方 / 生产计划 / 质检 / 库存
// 生产计划经由分配引擎创建，并用手动时钟推进状态
// ==========================================

use chrono::{Duration, Local, NaiveTime, TimeZone, Utc};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use factory_mes::api::{
    CreateEquipmentRequest, CreateEquipmentTypeRequest, CreateLocationRequest,
    CreateProductRequest, CreateProductionRequest, CreateQualityCheckRequest,
    CreateQualityStandardRequest, InventoryItemRequest, RecipeLineRequest,
};
use factory_mes::config::default_db_path;
use factory_mes::domain::{CheckResult, CheckValue, CriteriaItem};
use factory_mes::logging::{self, LogFormat};
use factory_mes::{AppState, CheckResultStatus, CriteriaType, ManualClock};

const EQUIPMENT_TYPES: &[(&str, &str)] = &[
    ("PRESS", "压力机"),
    ("CONVEYOR", "输送机"),
    ("ROBOT", "机器人"),
    ("CNC", "CNC加工机"),
    ("ASSEMBLY", "装配线"),
    ("PACKAGING", "包装机"),
    ("INSPECTION", "检测设备"),
    ("WELDING", "焊接机"),
];

// (id, 名称, 描述)
const LOCATIONS: &[(&str, &str, &str)] = &[
    ("F1-A", "1层A区", "压力机作业区"),
    ("F1-B", "1层B区", "装配线区"),
    ("F1-C", "1层C区", "包装区"),
    ("F1-D", "1层D区", "出货区"),
    ("F2-A", "2层A区", "CNC加工区"),
    ("F2-B", "2层B区", "焊接作业区"),
    ("F2-C", "2层C区", "机器人作业区"),
    ("F2-D", "2层D区", "物料存放区"),
    ("F3-A", "3层A区", "质量检测区"),
    ("F3-B", "3层B区", "办公区"),
    ("F3-C", "3层C区", "会议区"),
    ("F3-D", "3层D区", "休息区"),
];

// 设备类型 -> 所在位置
const EQUIPMENT_PLACEMENT: &[(&str, &str)] = &[
    ("PRESS", "F1-A"),
    ("CONVEYOR", "F2-A"),
    ("ROBOT", "F2-C"),
    ("CNC", "F2-A"),
    ("ASSEMBLY", "F1-B"),
    ("PACKAGING", "F1-C"),
    ("INSPECTION", "F3-A"),
    ("WELDING", "F2-B"),
];

const UNITS_PER_TYPE: usize = 4;

struct ProductSeed {
    name: &'static str,
    description: &'static str,
    base_days: i64,
    recipe: &'static [(&'static str, i64, i64)], // (类型, 数量, 工序)
}

const PRODUCTS: &[ProductSeed] = &[
    ProductSeed {
        name: "PCB板",
        description: "电子电路板",
        base_days: 3,
        recipe: &[("ROBOT", 2, 1), ("CNC", 2, 2), ("INSPECTION", 1, 3)],
    },
    ProductSeed {
        name: "传感器模块",
        description: "温湿度传感器",
        base_days: 2,
        recipe: &[("PRESS", 1, 1), ("ROBOT", 1, 2), ("INSPECTION", 1, 3)],
    },
    ProductSeed {
        name: "电池组",
        description: "锂离子电池包",
        base_days: 4,
        recipe: &[("ASSEMBLY", 2, 1), ("ROBOT", 1, 2), ("INSPECTION", 1, 3)],
    },
    ProductSeed {
        name: "显示面板",
        description: "LCD显示模块",
        base_days: 5,
        recipe: &[("ROBOT", 2, 1), ("ASSEMBLY", 2, 2), ("INSPECTION", 1, 3)],
    },
    ProductSeed {
        name: "外壳组件",
        description: "产品外壳",
        base_days: 2,
        recipe: &[("PRESS", 2, 1), ("WELDING", 1, 2), ("INSPECTION", 1, 3)],
    },
];

fn main() -> Result<(), Box<dyn Error>> {
    logging::init(LogFormat::Text);

    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_db_path);

    backup_and_reset_db(&db_path)?;

    // 以当天 00:00 UTC 为基准
    let today = Utc::now().date_naive();
    let midnight = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let state = AppState::open(&db_path, clock.clone())?;

    seed_equipment(&state)?;
    let product_ids = seed_products(&state)?;

    // (产品下标, 数量, 开始偏移天, 结束偏移天)
    let productions = [(0usize, 2000, -5, 1), (1, 1500, -2, 2), (2, 3000, -10, -5)];
    let mut production_ids = Vec::new();
    for (idx, quantity, start_days, end_days) in productions {
        let start = midnight + Duration::days(start_days);
        let end = midnight + Duration::days(end_days);

        // 在计划开始时刻创建并扫描，使状态按时间推进
        clock.set(start);
        let outcome = state.production_api.create_production(CreateProductionRequest {
            product_id: Some(product_ids[idx].clone()),
            quantity: Some(quantity),
            start_time: Some(start.to_rfc3339()),
            end_time: Some(end.to_rfc3339()),
        })?;
        state.production_api.list_productions()?;
        production_ids.push(outcome.production.id);
    }
    clock.set(Utc::now());
    state.production_api.list_productions()?;

    seed_quality(&state, &product_ids, &production_ids)?;
    seed_inventory(&state)?;

    print_quick_counts(&state)?;
    Ok(())
}

fn backup_and_reset_db(db_path: &Path) -> Result<(), Box<dyn Error>> {
    if !db_path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = PathBuf::from(format!("{}.bak.{}", db_path.display(), ts));
    fs::copy(db_path, &backup_path)?;
    fs::remove_file(db_path)?;

    eprintln!("Backed up {} -> {}", db_path.display(), backup_path.display());
    Ok(())
}

fn seed_equipment(state: &AppState) -> Result<(), Box<dyn Error>> {
    let api = &state.equipment_api;
    for (id, name) in EQUIPMENT_TYPES {
        api.create_equipment_type(CreateEquipmentTypeRequest {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
        })?;
    }
    for (id, name, description) in LOCATIONS {
        api.create_location(CreateLocationRequest {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        })?;
    }

    let now = Utc::now();
    for (type_id, location_id) in EQUIPMENT_PLACEMENT {
        let type_name = EQUIPMENT_TYPES
            .iter()
            .find(|(id, _)| id == type_id)
            .map(|(_, name)| *name)
            .unwrap_or(*type_id);
        for n in 1..=UNITS_PER_TYPE {
            let last = now - Duration::days(7 + n as i64);
            api.create_equipment(CreateEquipmentRequest {
                name: Some(format!("{} {:03}", type_name, n)),
                type_id: Some(type_id.to_string()),
                location_id: Some(location_id.to_string()),
                status: None,
                operation_status: None,
                last_maintenance: Some(last.to_rfc3339()),
                next_maintenance: Some((last + Duration::days(10)).to_rfc3339()),
            })?;
        }
    }
    Ok(())
}

fn seed_products(state: &AppState) -> Result<Vec<String>, Box<dyn Error>> {
    let mut ids = Vec::with_capacity(PRODUCTS.len());
    for seed in PRODUCTS {
        let created = state.product_api.create_product(CreateProductRequest {
            name: Some(seed.name.to_string()),
            description: Some(seed.description.to_string()),
            base_quantity: Some(1000),
            base_days: Some(seed.base_days),
            equipment_types: seed
                .recipe
                .iter()
                .map(|(type_id, quantity, sequence)| RecipeLineRequest {
                    type_id: Some(type_id.to_string()),
                    quantity: Some(*quantity),
                    sequence: Some(*sequence),
                })
                .collect(),
        })?;
        ids.push(created.product.id);
    }
    Ok(ids)
}

fn seed_quality(
    state: &AppState,
    product_ids: &[String],
    production_ids: &[String],
) -> Result<(), Box<dyn Error>> {
    let standard = state.quality_api.create_standard(CreateQualityStandardRequest {
        product_id: Some(product_ids[0].clone()),
        name: Some("PCB板出厂检验".to_string()),
        description: Some("尺寸与外观".to_string()),
        criteria: vec![
            CriteriaItem {
                name: "板厚".to_string(),
                criteria_type: CriteriaType::Numeric,
                min_value: Some(1.5),
                max_value: Some(1.7),
                unit: Some("mm".to_string()),
                description: "游标卡尺测量".to_string(),
            },
            CriteriaItem {
                name: "焊点外观".to_string(),
                criteria_type: CriteriaType::Visual,
                min_value: None,
                max_value: None,
                unit: None,
                description: "无虚焊、无桥连".to_string(),
            },
        ],
    })?;

    let now = Utc::now();
    let samples = [(0, 1.62, CheckResultStatus::Pass), (1, 1.58, CheckResultStatus::Pass), (2, 1.74, CheckResultStatus::Fail)];
    for (days_ago, thickness, status) in samples {
        state.quality_api.create_check(CreateQualityCheckRequest {
            standard_id: Some(standard.id.clone()),
            production_id: production_ids.first().cloned(),
            batch_number: Some(format!("PCB-{:03}", days_ago + 1)),
            inspector: Some("质检员".to_string()),
            check_date: Some((now - Duration::days(days_ago)).to_rfc3339()),
            results: vec![
                CheckResult {
                    criteria_id: "板厚".to_string(),
                    value: CheckValue::Number(thickness),
                    status,
                    notes: None,
                },
                CheckResult {
                    criteria_id: "焊点外观".to_string(),
                    value: CheckValue::Text("OK".to_string()),
                    status: CheckResultStatus::Pass,
                    notes: None,
                },
            ],
            notes: None,
            images: vec![],
        })?;
    }
    Ok(())
}

fn seed_inventory(state: &AppState) -> Result<(), Box<dyn Error>> {
    let items = [("螺丝 M3", 50, "F2-D", 100, 5000), ("焊锡丝", 800, "F2-D", 200, 1000), ("包装纸箱", 1200, "F1-C", 100, 1000)];
    for (name, quantity, location, min, max) in items {
        state.inventory_api.create_item(InventoryItemRequest {
            item_name: Some(name.to_string()),
            quantity: Some(quantity),
            location: Some(location.to_string()),
            min_quantity: Some(min),
            max_quantity: Some(max),
        })?;
    }
    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    let conn = state
        .conn
        .lock()
        .map_err(|e| format!("锁获取失败: {}", e))?;
    let tables = [
        "equipment_type",
        "location",
        "equipment",
        "product",
        "product_equipment_type",
        "production",
        "production_equipment",
        "quality_standard",
        "quality_check",
        "inventory",
    ];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<24} {}", t, c);
    }
    Ok(())
}
