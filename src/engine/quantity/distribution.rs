// ==========================================
// 作业数量分摊
// ==========================================
// 规则: 工序需求产出数量平均分摊到未完工作业
// 整数拆分: 每份向下取整, 余数全部给第一个未完工作业
// 红线: FINISHED 作业不被改写, 只贡献已报良品数量
// ==========================================

use crate::domain::ids::OpId;
use crate::engine::error::EngineResult;
use crate::engine::quantity::rounding::{floor_qty, scrap_adjusted_start};
use crate::repository::RoutingStore;
use tracing::debug;

/// 把 `required_op_finish_qty` 分摊到工序的未完工作业上
///
/// 返回该工序的预计产出数量, 同时刷新工序的剩余待产出数量。
pub(crate) fn distribute_to_activities(
    store: &mut RoutingStore,
    op_id: OpId,
    required_op_finish_qty: f64,
) -> EngineResult<f64> {
    let (scrap_percent, whole_number, deduct_scrap, activity_ids) = {
        let op = store.operation(op_id)?;
        (
            op.planning_scrap_percent,
            op.whole_number_splits,
            op.deduct_scrap_from_required,
            op.activities().to_vec(),
        )
    };

    let mut unfinished_count = 0usize;
    for id in &activity_ids {
        if !store.activity(*id)?.is_finished() {
            unfinished_count += 1;
        }
    }

    let mut expected_finish_qty = 0.0;
    let mut remaining_finish_qty = 0.0;

    if unfinished_count == 0 {
        for id in &activity_ids {
            let activity = store.activity(*id)?;
            expected_finish_qty += activity.reported_good_qty;
            if deduct_scrap {
                expected_finish_qty -= activity.reported_scrap_qty;
            }
        }
    } else {
        let n = unfinished_count as f64;
        let (per_activity, mut remainder) = if whole_number {
            let per_activity = floor_qty(required_op_finish_qty / n);
            (per_activity, required_op_finish_qty - per_activity * n)
        } else {
            (required_op_finish_qty / n, 0.0)
        };

        for id in &activity_ids {
            let activity = store.activity_mut(*id)?;
            if activity.is_finished() {
                expected_finish_qty += activity.reported_good_qty;
                continue;
            }

            let finish_qty = per_activity + remainder;
            remainder = 0.0;

            let (start_qty, _) = scrap_adjusted_start(finish_qty, scrap_percent, whole_number);
            activity.required_finish_qty = finish_qty;
            activity.required_start_qty = start_qty;
            activity.remaining_qty = finish_qty - activity.reported_good_qty;

            remaining_finish_qty += activity.remaining_qty;
            expected_finish_qty += if deduct_scrap {
                finish_qty - activity.reported_scrap_qty
            } else {
                finish_qty
            };
        }
    }

    store.operation_mut(op_id)?.remaining_finish_qty = remaining_finish_qty;

    debug!(
        op = %op_id,
        required_op_finish_qty = required_op_finish_qty,
        unfinished_count = unfinished_count,
        expected_finish_qty = expected_finish_qty,
        "作业数量分摊完成"
    );

    Ok(expected_finish_qty)
}
