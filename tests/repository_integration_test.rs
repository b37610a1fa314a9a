// ==========================================
// Repository 集成测试
// ==========================================
// 测试范围:
// 1. 设备 / 位置查询与计数
// 2. 配方读取顺序
// 3. 分配事务（全有或全无）
// 4. 状态扫描事务
// 5. 库存更新 / 删除
// ==========================================

mod test_helpers;

use chrono::Duration;
use factory_mes::domain::{
    EquipmentAssignment, InventoryFields, InventoryItem, Production, StatusTransition,
};
use factory_mes::repository::{
    EquipmentRepository, InventoryRepository, LocationRepository, ProductRepository,
    ProductionRepository, RepositoryError,
};
use factory_mes::{OperationStatus, ProductionStatus};
use test_helpers::*;

fn planned_production(id: &str, product_id: &str) -> Production {
    let now = base_time();
    Production {
        id: id.to_string(),
        product_id: product_id.to_string(),
        quantity: 10,
        start_time: now + Duration::hours(1),
        end_time: now + Duration::hours(5),
        status: ProductionStatus::Planned,
        created_at: now,
        updated_at: now,
    }
}

// ==========================================
// 设备 / 位置
// ==========================================

#[test]
fn test_location_counts_include_empty_locations() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_location(&conn, "F3-D", "3层D区");

    let summaries = LocationRepository::new(conn.clone()).list_with_counts().unwrap();
    assert_eq!(summaries.len(), 2);

    let floor_a = summaries.iter().find(|s| s.location.id == "F1-A").unwrap();
    assert_eq!(floor_a.equipment_count, 3);
    let floor_d = summaries.iter().find(|s| s.location.id == "F3-D").unwrap();
    assert_eq!(floor_d.equipment_count, 0);
}

#[test]
fn test_equipment_details_join_type_and_location() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);

    let details = EquipmentRepository::new(conn.clone()).list_details().unwrap();
    let ids: Vec<&str> = details.iter().map(|d| d.equipment.id.as_str()).collect();
    assert_eq!(ids, vec!["INSPECTION-001", "PRESS-001", "PRESS-002"]);
    assert_eq!(details[1].equipment_type.name, "压力机");
    assert_eq!(details[1].location.name, "1层A区");
}

#[test]
fn test_equipment_with_unknown_type_violates_foreign_key() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);

    let repo = EquipmentRepository::new(conn.clone());
    let mut equipment = repo.find_by_id("PRESS-001").unwrap().unwrap();
    equipment.id = "GHOST-001".to_string();
    equipment.type_id = "GHOST".to_string();

    let err = repo.create(&equipment).unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)), "实际: {:?}", err);
}

// ==========================================
// 配方
// ==========================================

#[test]
fn test_recipe_ordered_by_sequence_with_type_name() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_product(&conn, "P1", "小部件", &[("INSPECTION", 1, 2), ("PRESS", 2, 1)]);

    let recipe = ProductRepository::new(conn.clone()).find_recipe("P1").unwrap();
    assert_eq!(recipe.len(), 2);
    assert_eq!(recipe[0].equipment_type_id, "PRESS");
    assert_eq!(recipe[0].equipment_type_name, "压力机");
    assert_eq!(recipe[0].quantity, 2);
    assert_eq!(recipe[1].sequence, 2);
}

// ==========================================
// 分配事务
// ==========================================

#[test]
fn test_create_with_allocation_commits_all_rows() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_product(&conn, "P1", "小部件", &[("PRESS", 1, 1)]);

    let repo = ProductionRepository::new(conn.clone());
    let production = planned_production("PR-1", "P1");
    let types = vec!["PRESS".to_string()];

    let allocations = repo
        .create_with_allocation(&production, &types, |pool| {
            // 池中只应有待机的 PRESS，按 id 升序
            let ids: Vec<&str> = pool.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["PRESS-001", "PRESS-002"]);
            Ok(vec![EquipmentAssignment {
                equipment_id: pool[0].id.clone(),
                sequence: 1,
            }])
        })
        .unwrap();

    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].production_id, "PR-1");
    assert_eq!(operation_status_of(&conn, "PRESS-001"), "OPERATING");
    assert_eq!(operation_status_of(&conn, "PRESS-002"), "STANDBY");
    assert_eq!(count_rows(&conn, "production_equipment"), 1);
}

#[test]
fn test_create_with_allocation_rolls_back_on_plan_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_product(&conn, "P1", "小部件", &[("PRESS", 3, 1)]);

    let repo = ProductionRepository::new(conn.clone());
    let production = planned_production("PR-1", "P1");
    let types = vec!["PRESS".to_string()];

    let err = repo
        .create_with_allocation(&production, &types, |pool| {
            Err(RepositoryError::InsufficientEquipment {
                equipment_type_id: "PRESS".to_string(),
                equipment_type_name: "压力机".to_string(),
                required: 3,
                available: pool.len() as i64,
            })
        })
        .unwrap_err();

    match err {
        RepositoryError::InsufficientEquipment { available, .. } => assert_eq!(available, 2),
        other => panic!("Expected InsufficientEquipment, got {:?}", other),
    }
    assert_eq!(count_rows(&conn, "production"), 0);
    assert_eq!(count_rows(&conn, "production_equipment"), 0);
    assert_eq!(operation_status_of(&conn, "PRESS-001"), "STANDBY");
}

#[test]
fn test_create_with_allocation_rejects_non_standby_assignment() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_equipment(&conn, "PRESS-009", "PRESS", "F1-A", OperationStatus::Operating);
    insert_product(&conn, "P1", "小部件", &[("PRESS", 1, 1)]);

    let repo = ProductionRepository::new(conn.clone());
    let production = planned_production("PR-1", "P1");

    // 分配方案强行指向运行中的设备，事务必须整体回滚
    let result = repo.create_with_allocation(&production, &["PRESS".to_string()], |_| {
        Ok(vec![EquipmentAssignment {
            equipment_id: "PRESS-009".to_string(),
            sequence: 1,
        }])
    });

    assert!(matches!(result, Err(RepositoryError::DatabaseTransactionError(_))));
    assert_eq!(count_rows(&conn, "production"), 0);
}

// ==========================================
// 状态扫描
// ==========================================

#[test]
fn test_status_sweep_only_applies_matching_from_status() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    seed_basic_floor(&conn);
    insert_product(&conn, "P1", "小部件", &[]);

    let repo = ProductionRepository::new(conn.clone());
    repo.create_with_allocation(&planned_production("PR-1", "P1"), &[], |_| Ok(vec![]))
        .unwrap();

    let now = base_time() + Duration::hours(2);
    let applied = repo
        .apply_status_sweep(now, |candidates| {
            assert_eq!(candidates.len(), 1);
            vec![
                StatusTransition {
                    production_id: "PR-1".to_string(),
                    from: ProductionStatus::Planned,
                    to: ProductionStatus::InProgress,
                },
                // from 不匹配，不应生效
                StatusTransition {
                    production_id: "PR-1".to_string(),
                    from: ProductionStatus::Planned,
                    to: ProductionStatus::Completed,
                },
            ]
        })
        .unwrap();

    assert_eq!(applied.len(), 1);
    let stored = repo.find_by_id("PR-1").unwrap().unwrap();
    assert_eq!(stored.status, ProductionStatus::InProgress);
    assert_eq!(stored.updated_at, now);
}

// ==========================================
// 库存
// ==========================================

#[test]
fn test_inventory_update_and_delete_missing_item() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let repo = InventoryRepository::new(conn.clone());

    let now = base_time();
    repo.create(&InventoryItem {
        id: "INV-1".to_string(),
        item_name: "螺丝".to_string(),
        quantity: 50,
        location: "F2-D".to_string(),
        min_quantity: 100,
        max_quantity: 1000,
        created_at: now,
        updated_at: now,
    })
    .unwrap();

    let fields = InventoryFields {
        item_name: "螺丝 M3".to_string(),
        quantity: 500,
        location: "F2-D".to_string(),
        min_quantity: 100,
        max_quantity: 1000,
    };
    let later = now + Duration::minutes(5);
    let updated = repo.update("INV-1", &fields, later).unwrap();
    assert_eq!(updated.quantity, 500);
    assert_eq!(updated.item_name, "螺丝 M3");
    assert_eq!(updated.created_at, now);
    assert_eq!(updated.updated_at, later);

    assert!(matches!(
        repo.update("INV-404", &fields, later),
        Err(RepositoryError::NotFound { .. })
    ));

    repo.delete("INV-1").unwrap();
    assert!(repo.find_by_id("INV-1").unwrap().is_none());
    assert!(matches!(repo.delete("INV-1"), Err(RepositoryError::NotFound { .. })));
}
