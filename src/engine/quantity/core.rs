// ==========================================
// 制造订单工艺路线 - 数量传播引擎
// ==========================================
// 职责: 订单需求数量变化后, 沿每条替代路径从末道工序反推到首道工序,
//       重算工序/作业的投入与产出数量, 并等比缩放物料需求与产出品
// 输入: 路线存储 + 订单 + 新需求数量
// 输出: 订单预计完工数量 (所有末道工序预计产出的最小值)
// ==========================================
// 红线: 成环路线由访问预算兜底, 超出预算即报路径校验失败
// ==========================================

use crate::domain::ids::{MoId, OpId, PathId};
use crate::engine::engine_config::EngineConfig;
use crate::engine::error::{EngineError, EngineResult, PathValidationReason};
use crate::engine::quantity::distribution::distribute_to_activities;
use crate::engine::quantity::rescale::{rescale_downstream, PriorQty};
use crate::engine::quantity::rounding::{floor_qty, scrap_adjusted_start, yield_factor};
use crate::engine::rollback::with_rollback;
use crate::repository::RoutingStore;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// QuantityPropagator - 数量传播引擎
// ==========================================
pub struct QuantityPropagator {
    config: EngineConfig,
}

impl QuantityPropagator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 按各订单自身的需求数量重算全部订单
    #[instrument(skip(self, store))]
    pub fn update_all_mo_quantities(&self, store: &mut RoutingStore) -> EngineResult<()> {
        with_rollback(store, self.config.rollback_on_failure, |store| {
            let mo_ids = store.mo_ids();
            for mo_id in &mo_ids {
                let qty = store.mo(*mo_id)?.required_qty;
                self.propagate_mo(store, *mo_id, qty)?;
            }
            info!(mo_count = mo_ids.len(), "全部订单数量重算完成");
            Ok(())
        })
    }

    /// 需求数量不变, 重算单个订单
    #[instrument(skip(self, store))]
    pub fn update_quantities(&self, store: &mut RoutingStore, mo_id: MoId) -> EngineResult<f64> {
        with_rollback(store, self.config.rollback_on_failure, |store| {
            let qty = store.mo(mo_id)?.required_qty;
            self.propagate_mo(store, mo_id, qty)
        })
    }

    /// 修改订单需求数量并重算整条路线
    ///
    /// # 返回
    /// 订单的预计完工数量
    #[instrument(skip(self, store))]
    pub fn update_mo_required_qty(
        &self,
        store: &mut RoutingStore,
        mo_id: MoId,
        new_qty: f64,
    ) -> EngineResult<f64> {
        with_rollback(store, self.config.rollback_on_failure, |store| {
            store.mo_mut(mo_id)?.required_qty = new_qty;
            self.propagate_mo(store, mo_id, new_qty)
        })
    }

    // ==========================================
    // 单订单重算
    // ==========================================

    fn propagate_mo(&self, store: &mut RoutingStore, mo_id: MoId, new_qty: f64) -> EngineResult<f64> {
        let (mo_external_id, op_ids, path_ids) = {
            let mo = store.mo(mo_id)?;
            (mo.external_id.clone(), mo.operations().to_vec(), mo.paths().to_vec())
        };

        // 1. 清零: 多条路径/多个后序会累加到同一工序
        let mut prior = Vec::with_capacity(op_ids.len());
        for op_id in &op_ids {
            let op = store.operation_mut(*op_id)?;
            prior.push(PriorQty {
                op: *op_id,
                start_qty: op.required_start_qty,
                finish_qty: op.required_finish_qty,
            });
            op.required_start_qty = 0.0;
            op.required_finish_qty = 0.0;
        }

        // 2. 逐条路径从末道工序反推
        let mut walker = PathWalker::new(mo_external_id.clone());
        let mut expected_finish_qty: Option<f64> = None;
        for path_id in path_ids {
            if let Some(path_qty) = walker.walk(store, path_id, new_qty)? {
                expected_finish_qty = Some(match expected_finish_qty {
                    Some(current) => current.min(path_qty),
                    None => path_qty,
                });
            }
        }
        let expected_finish_qty = expected_finish_qty.unwrap_or(0.0);
        store.mo_mut(mo_id)?.expected_finish_qty = expected_finish_qty;

        // 3. 物料需求与产出品等比缩放
        rescale_downstream(store, &prior, self.config.cost_decimals)?;

        info!(
            mo = %mo_external_id,
            required_qty = new_qty,
            expected_finish_qty = expected_finish_qty,
            "订单数量重算完成"
        );
        Ok(expected_finish_qty)
    }
}

impl Default for QuantityPropagator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

// ==========================================
// PathWalker - 单订单内的路径遍历状态
// ==========================================

#[derive(Debug, Clone, Copy)]
struct PredecessorEdge {
    predecessor: OpId,
    usage_qty_per_cycle: f64,
}

struct PathWalker {
    mo_external_id: String,
    path_external_id: String,
    // 当前路径: 工序 -> 指向它的前序边 (不含自环)
    predecessors: HashMap<OpId, Vec<PredecessorEdge>>,
    visits: usize,
    visit_budget: usize,
    // (前序, 后序) -> 已向前序传递的需求; 整个订单共用,
    // 后序被再次访问时只传递增量, 前序累计值始终等于 后序投入 × 单耗
    passed_demand: HashMap<(OpId, OpId), f64>,
}

impl PathWalker {
    fn new(mo_external_id: String) -> Self {
        Self {
            mo_external_id,
            path_external_id: String::new(),
            predecessors: HashMap::new(),
            visits: 0,
            visit_budget: 0,
            passed_demand: HashMap::new(),
        }
    }

    fn path_error(&self, reason: PathValidationReason) -> EngineError {
        EngineError::PathValidation {
            mo_external_id: self.mo_external_id.clone(),
            path_external_id: self.path_external_id.clone(),
            reason,
        }
    }

    /// 遍历一条路径; 路径没有节点时返回 None
    fn walk(&mut self, store: &mut RoutingStore, path_id: PathId, new_qty: f64) -> EngineResult<Option<f64>> {
        let node_ids = {
            let path = store.path(path_id)?;
            self.path_external_id = path.external_id.clone();
            path.nodes().to_vec()
        };
        if node_ids.is_empty() {
            return Ok(None);
        }

        self.predecessors.clear();
        let mut leaves = Vec::new();
        for node_id in &node_ids {
            let node = store.node(*node_id)?;
            match node.successor {
                None => leaves.push(node.predecessor),
                Some(_) if node.is_self_edge() => {}
                Some(successor) => self.predecessors.entry(successor).or_default().push(PredecessorEdge {
                    predecessor: node.predecessor,
                    usage_qty_per_cycle: node.usage_qty_per_cycle,
                }),
            }
        }

        if leaves.is_empty() {
            return Err(self.path_error(PathValidationReason::NoLeafOperation));
        }

        self.visits = 0;
        self.visit_budget = node_ids.len() * leaves.len();

        let mut path_qty: Option<f64> = None;
        for leaf in leaves {
            let leaf_qty = self.update_operation(store, leaf, new_qty)?;
            path_qty = Some(match path_qty {
                Some(current) => current.min(leaf_qty),
                None => leaf_qty,
            });
        }

        debug!(
            mo = %self.mo_external_id,
            path = %self.path_external_id,
            visits = self.visits,
            visit_budget = self.visit_budget,
            "路径遍历完成"
        );
        Ok(path_qty)
    }

    /// 递归更新工序数量, 返回该工序的预计产出数量
    fn update_operation(
        &mut self,
        store: &mut RoutingStore,
        op_id: OpId,
        demanded_finish_qty: f64,
    ) -> EngineResult<f64> {
        self.visits += 1;
        if self.visits > self.visit_budget {
            return Err(self.path_error(PathValidationReason::VisitBudgetExceeded {
                budget: self.visit_budget,
            }));
        }

        let (required_finish_qty, required_start_qty, scrap_percent, whole_number, deduct_scrap) = {
            let op = store.operation_mut(op_id)?;
            op.required_finish_qty += demanded_finish_qty;
            let (start_qty, scrap_qty) =
                scrap_adjusted_start(op.required_finish_qty, op.planning_scrap_percent, op.whole_number_splits);
            op.required_start_qty = start_qty;
            op.expected_scrap_qty = scrap_qty;
            (
                op.required_finish_qty,
                start_qty,
                op.planning_scrap_percent,
                op.whole_number_splits,
                op.deduct_scrap_from_required,
            )
        };

        let edges = self.predecessors.get(&op_id).cloned().unwrap_or_default();
        let mut max_allowable_start_qty: Option<f64> = None;
        for edge in &edges {
            let demand = required_start_qty * edge.usage_qty_per_cycle;
            let delta = {
                let passed = self.passed_demand.entry((edge.predecessor, op_id)).or_insert(0.0);
                let delta = demand - *passed;
                *passed = demand;
                delta
            };

            let predecessor_finish_qty = self.update_operation(store, edge.predecessor, delta)?;
            let allowable = predecessor_finish_qty / edge.usage_qty_per_cycle.max(1.0);
            max_allowable_start_qty = Some(match max_allowable_start_qty {
                Some(current) => current.min(allowable),
                None => allowable,
            });
        }

        let required_op_finish_qty = match max_allowable_start_qty {
            Some(max_start) if deduct_scrap => {
                let max_start = if whole_number { floor_qty(max_start) } else { max_start };
                let capped = max_start * yield_factor(scrap_percent);
                if whole_number {
                    floor_qty(capped)
                } else {
                    capped
                }
            }
            _ => required_finish_qty,
        };

        distribute_to_activities(store, op_id, required_op_finish_qty)
    }
}
