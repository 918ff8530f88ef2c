// ==========================================
// 物料需求 / 产出品 等比缩放
// ==========================================
// 物料需求: 按工序投入数量变化比例缩放 (成本按配置保留小数)
// 产出品:   按工序产出数量变化比例缩放
// ==========================================

use crate::domain::ids::OpId;
use crate::engine::error::EngineResult;
use crate::engine::quantity::rounding::round_to;
use crate::repository::RoutingStore;

/// 重算前的工序数量快照
#[derive(Debug, Clone, Copy)]
pub(crate) struct PriorQty {
    pub op: OpId,
    pub start_qty: f64,
    pub finish_qty: f64,
}

pub(crate) fn rescale_downstream(
    store: &mut RoutingStore,
    prior: &[PriorQty],
    cost_decimals: u32,
) -> EngineResult<()> {
    for snapshot in prior {
        let (new_start, new_finish, requirement_ids, product_ids) = {
            let op = store.operation(snapshot.op)?;
            (
                op.required_start_qty,
                op.required_finish_qty,
                op.material_requirements().to_vec(),
                op.products().to_vec(),
            )
        };

        if snapshot.start_qty > 0.0 {
            let ratio = (new_start / snapshot.start_qty).max(0.0);
            for id in requirement_ids {
                let requirement = store.material_requirement_mut(id)?;
                requirement.total_required_qty *= ratio;
                requirement.total_cost = round_to(requirement.total_cost * ratio, cost_decimals);
            }
        }

        if snapshot.finish_qty > 0.0 {
            let ratio = (new_finish / snapshot.finish_qty).max(0.0);
            for id in product_ids {
                store.product_mut(id)?.total_output_qty *= ratio;
            }
        }
    }
    Ok(())
}
