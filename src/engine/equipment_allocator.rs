// ==========================================
// 工厂管理系统 - 设备分配引擎
// ==========================================
// 职责: 按产品配方为新生产计划挑选待机设备
// 规则:
//   - 每个配方行需要 quantity 台同类型 STANDBY 设备
//   - 按设备 id 升序挑选，同一设备不会被两行重复选中
//   - 任一行不足则整体失败（InsufficientEquipment），不写任何数据
// 红线: Engine 不拼 SQL，读池/落库由仓储在同一 IMMEDIATE 事务内完成
// ==========================================

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::equipment::Equipment;
use crate::domain::product::RecipeLine;
use crate::domain::production::{EquipmentAssignment, NewProduction, Production, ProductionEquipment};
use crate::domain::types::ProductionStatus;
use crate::engine::clock::SharedClock;
use crate::repository::{ProductRepository, ProductionRepository, RepositoryError, RepositoryResult};

/// 根据配方与待机设备池生成分配方案（纯函数）
///
/// # 参数
/// - recipe: 配方行（顺序即处理顺序）
/// - pool: 待机设备池，调用方不必预先排序
///
/// # 返回
/// - Ok: 每台被选中设备一行，携带所在配方行的 sequence
/// - Err(InsufficientEquipment): 第一条无法满足的配方行
pub fn plan_assignments(
    recipe: &[RecipeLine],
    pool: &[Equipment],
) -> RepositoryResult<Vec<EquipmentAssignment>> {
    let mut standby: Vec<&Equipment> = pool.iter().filter(|e| e.is_standby()).collect();
    standby.sort_by(|a, b| a.id.cmp(&b.id));

    let mut used: HashSet<&str> = HashSet::new();
    let mut assignments = Vec::new();

    for line in recipe {
        let required = line.quantity.max(0) as usize;
        let picked: Vec<&Equipment> = standby
            .iter()
            .copied()
            .filter(|e| e.type_id == line.equipment_type_id && !used.contains(e.id.as_str()))
            .take(required)
            .collect();

        if picked.len() < required {
            return Err(RepositoryError::InsufficientEquipment {
                equipment_type_id: line.equipment_type_id.clone(),
                equipment_type_name: line.equipment_type_name.clone(),
                required: line.quantity,
                available: picked.len() as i64,
            });
        }

        for equipment in picked {
            used.insert(equipment.id.as_str());
            assignments.push(EquipmentAssignment {
                equipment_id: equipment.id.clone(),
                sequence: line.sequence,
            });
        }
    }

    Ok(assignments)
}

/// 分配成功的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    pub production: Production,
    pub allocations: Vec<ProductionEquipment>,
}

// ==========================================
// EquipmentAllocator - 设备分配器
// ==========================================
pub struct EquipmentAllocator {
    clock: SharedClock,
    product_repo: Arc<ProductRepository>,
    production_repo: Arc<ProductionRepository>,
}

impl EquipmentAllocator {
    pub fn new(
        clock: SharedClock,
        product_repo: Arc<ProductRepository>,
        production_repo: Arc<ProductionRepository>,
    ) -> Self {
        Self {
            clock,
            product_repo,
            production_repo,
        }
    }

    /// 创建生产计划并预留设备
    ///
    /// # 返回
    /// - Ok(AllocationOutcome): 计划状态为 PLANNED，设备已置为 OPERATING
    /// - Err(NotFound): 产品不存在
    /// - Err(InsufficientEquipment): 某类设备不足，未写入任何数据
    pub fn allocate(&self, request: NewProduction) -> RepositoryResult<AllocationOutcome> {
        let product = self
            .product_repo
            .find_by_id(&request.product_id)?
            .ok_or_else(|| RepositoryError::not_found("Product", &request.product_id))?;
        let recipe = self.product_repo.find_recipe(&product.id)?;

        let now = self.clock.now();
        let production = Production {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            quantity: request.quantity,
            start_time: request.start_time,
            end_time: request.end_time,
            status: ProductionStatus::Planned,
            created_at: now,
            updated_at: now,
        };

        let type_ids: Vec<String> = recipe.iter().map(|l| l.equipment_type_id.clone()).collect();
        let result = self
            .production_repo
            .create_with_allocation(&production, &type_ids, |pool| plan_assignments(&recipe, pool));

        match result {
            Ok(allocations) => {
                info!(
                    production_id = %production.id,
                    product_id = %product.id,
                    equipment_count = allocations.len(),
                    "生产计划已创建并完成设备分配"
                );
                Ok(AllocationOutcome {
                    production,
                    allocations,
                })
            }
            Err(err @ RepositoryError::InsufficientEquipment { .. }) => {
                warn!(product_id = %product.id, error = %err, "设备分配被拒绝");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EquipmentStatus, OperationStatus};
    use chrono::{TimeZone, Utc};

    fn unit(id: &str, type_id: &str, op: OperationStatus) -> Equipment {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Equipment {
            id: id.to_string(),
            name: format!("设备{}", id),
            type_id: type_id.to_string(),
            location_id: "L1".to_string(),
            status: EquipmentStatus::Active,
            operation_status: op,
            last_maintenance: t,
            next_maintenance: t,
            created_at: t,
            updated_at: t,
        }
    }

    fn line(type_id: &str, quantity: i64, sequence: i64) -> RecipeLine {
        RecipeLine {
            product_id: "P1".to_string(),
            equipment_type_id: type_id.to_string(),
            equipment_type_name: type_id.to_lowercase(),
            quantity,
            sequence,
        }
    }

    #[test]
    fn test_picks_lowest_ids_first() {
        let pool = vec![
            unit("E3", "PRESS", OperationStatus::Standby),
            unit("E1", "PRESS", OperationStatus::Standby),
            unit("E2", "PRESS", OperationStatus::Standby),
        ];
        let plan = plan_assignments(&[line("PRESS", 2, 1)], &pool).unwrap();
        let ids: Vec<_> = plan.iter().map(|a| a.equipment_id.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E2"]);
        assert!(plan.iter().all(|a| a.sequence == 1));
    }

    #[test]
    fn test_unit_not_reused_across_lines() {
        let pool = vec![
            unit("E1", "PRESS", OperationStatus::Standby),
            unit("E2", "PRESS", OperationStatus::Standby),
        ];
        let recipe = [line("PRESS", 1, 1), line("PRESS", 1, 3)];
        let plan = plan_assignments(&recipe, &pool).unwrap();
        assert_eq!(
            plan,
            vec![
                EquipmentAssignment { equipment_id: "E1".into(), sequence: 1 },
                EquipmentAssignment { equipment_id: "E2".into(), sequence: 3 },
            ]
        );

        let err = plan_assignments(&[line("PRESS", 2, 1), line("PRESS", 1, 2)], &pool).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InsufficientEquipment { required: 1, available: 0, .. }
        ));
    }

    #[test]
    fn test_shortfall_names_type_and_counts() {
        let pool = vec![
            unit("E1", "PRESS", OperationStatus::Standby),
            unit("E2", "PRESS", OperationStatus::Standby),
            unit("E3", "PRESS", OperationStatus::Operating),
        ];
        let err = plan_assignments(&[line("PRESS", 3, 1)], &pool).unwrap_err();
        match err {
            RepositoryError::InsufficientEquipment {
                equipment_type_id,
                required,
                available,
                ..
            } => {
                assert_eq!(equipment_type_id, "PRESS");
                assert_eq!(required, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_recipe_allocates_nothing() {
        let pool = vec![unit("E1", "PRESS", OperationStatus::Standby)];
        assert!(plan_assignments(&[], &pool).unwrap().is_empty());
    }

    #[test]
    fn test_other_types_ignored() {
        let pool = vec![
            unit("A1", "WELDING", OperationStatus::Standby),
            unit("B1", "INSPECTION", OperationStatus::Standby),
        ];
        let plan = plan_assignments(&[line("INSPECTION", 1, 2)], &pool).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].equipment_id, "B1");
    }
}
