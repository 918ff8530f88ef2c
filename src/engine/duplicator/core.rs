// ==========================================
// 制造订单工艺路线 - 结构复制引擎
// ==========================================
// 职责: 订单深拷贝 (工序/作业/物料需求/产出品/路径/节点/后继订单链接)
//       工序复制并接入当前路径
// 红线: 新编号/新名称在 Job (订单) 或 订单 (工序) 范围内唯一
// 红线: 复制出的作业清空报工, 状态回到 READY
// ==========================================

use crate::domain::ids::{MoId, OpId};
use crate::engine::duplicator::naming::next_unique_key;
use crate::engine::engine_config::EngineConfig;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rollback::with_rollback;
use crate::repository::{RepositoryError, RoutingStore};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

// ==========================================
// StructuralDuplicator - 结构复制引擎
// ==========================================
pub struct StructuralDuplicator {
    config: EngineConfig,
}

impl StructuralDuplicator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// 按外部编号复制订单 `count` 份
    pub fn copy_mo_by_external_id(
        &self,
        store: &mut RoutingStore,
        job_external_id: &str,
        mo_external_id: &str,
        count: u32,
    ) -> EngineResult<Vec<MoId>> {
        let source = store
            .find_mo(job_external_id, mo_external_id)
            .ok_or_else(|| {
                EngineError::not_found(
                    "ManufacturingOrder",
                    format!("{}/{}", job_external_id, mo_external_id),
                )
            })?;
        self.copy_mo_n(store, source, count)
    }

    /// 复制订单 `count` 份
    #[instrument(skip(self, store))]
    pub fn copy_mo_n(&self, store: &mut RoutingStore, source: MoId, count: u32) -> EngineResult<Vec<MoId>> {
        if count == 0 || count > self.config.max_copy_count {
            return Err(EngineError::InvalidCopyCount {
                count,
                max: self.config.max_copy_count,
            });
        }

        with_rollback(store, self.config.rollback_on_failure, |store| {
            (0..count).map(|_| self.copy_mo_rows(store, source)).collect()
        })
    }

    /// 复制订单一份, 返回新订单句柄
    pub fn copy_mo(&self, store: &mut RoutingStore, source: MoId) -> EngineResult<MoId> {
        with_rollback(store, self.config.rollback_on_failure, |store| {
            self.copy_mo_rows(store, source)
        })
    }

    /// 复制订单内的一个工序, 并把副本接在源工序之后 (当前路径)
    ///
    /// 插入 源 -> 副本 节点, 原先以源工序为前序的节点改为以副本为前序。
    #[instrument(skip(self, store))]
    pub fn insert_operation_copy(
        &self,
        store: &mut RoutingStore,
        job_external_id: &str,
        mo_external_id: &str,
        op_external_id: &str,
    ) -> EngineResult<OpId> {
        let (mo_id, source_op) = store
            .find_mo(job_external_id, mo_external_id)
            .and_then(|mo| store.find_operation(mo, op_external_id).map(|op| (mo, op)))
            .ok_or_else(|| {
                EngineError::not_found(
                    "ResourceOperation",
                    format!("{}/{}/{}", job_external_id, mo_external_id, op_external_id),
                )
            })?;

        with_rollback(store, self.config.rollback_on_failure, |store| {
            let copy = self.copy_operation_rows(store, source_op, mo_id)?;

            if let Some(path_id) = store.mo(mo_id)?.current_path {
                let existing_nodes = store.path(path_id)?.nodes().to_vec();
                store.insert_node(path_id, source_op, Some(copy), 1.0)?;

                let mut rewired = 0usize;
                for node_id in existing_nodes {
                    let node = store.node_mut(node_id)?;
                    if node.predecessor == source_op {
                        node.predecessor = copy;
                        rewired += 1;
                    }
                }
                debug!(path = %path_id, rewired = rewired, "副本工序已接入当前路径");
            }

            let copy_external_id = store.operation(copy)?.external_id.clone();
            info!(
                mo = %mo_external_id,
                source_op = %op_external_id,
                copy_op = %copy_external_id,
                "工序复制完成"
            );
            Ok(copy)
        })
    }

    // ==========================================
    // 内部实现
    // ==========================================

    fn copy_mo_rows(&self, store: &mut RoutingStore, source: MoId) -> EngineResult<MoId> {
        let source_mo = store.mo(source)?.clone();

        // 编号与名称分别探测
        let (taken_ids, taken_names): (HashSet<String>, HashSet<String>) = store
            .mos_in_job(&source_mo.job_external_id)
            .map(|(_, mo)| (mo.external_id.clone(), mo.name.clone()))
            .unzip();

        let mut new_mo = source_mo.clone();
        new_mo.external_id =
            next_unique_key(&source_mo.external_id, self.config.copy_suffix_start, &taken_ids);
        new_mo.name = next_unique_key(&source_mo.name, self.config.copy_suffix_start, &taken_names);
        let new_mo_id = store.insert_mo(new_mo)?;

        // 工序 (含作业/物料需求/产出品)
        let mut op_map: HashMap<OpId, OpId> = HashMap::with_capacity(source_mo.operations().len());
        for op_id in source_mo.operations() {
            let copy = self.copy_operation_rows(store, *op_id, new_mo_id)?;
            op_map.insert(*op_id, copy);
        }

        // 路径与节点
        for path_id in source_mo.paths() {
            let path = store.path(*path_id)?.clone();
            let new_path_id = store.insert_path(new_mo_id, path.clone())?;
            if source_mo.current_path == Some(*path_id) {
                store.set_current_path(new_mo_id, new_path_id)?;
            }

            for node_id in path.nodes() {
                let node = store.node(*node_id)?.clone();
                let predecessor = remap(&op_map, node.predecessor)?;
                let successor = node.successor.map(|s| remap(&op_map, s)).transpose()?;
                store.insert_node(new_path_id, predecessor, successor, node.usage_qty_per_cycle)?;
            }
        }

        let new_mo = store.mo(new_mo_id)?;
        info!(
            source = %source_mo.external_id,
            copy = %new_mo.external_id,
            operations = new_mo.operations().len(),
            paths = new_mo.paths().len(),
            "订单复制完成"
        );
        Ok(new_mo_id)
    }

    /// 复制工序及其作业/物料需求/产出品到 `target_mo`
    ///
    /// 工序编号仅在订单内唯一, 同订单复制时才需要改号改名。
    fn copy_operation_rows(
        &self,
        store: &mut RoutingStore,
        source_op: OpId,
        target_mo: MoId,
    ) -> EngineResult<OpId> {
        let source = store.operation(source_op)?.clone();
        let mut copy = source.clone();

        if source.mo == target_mo {
            let (taken_ids, taken_names): (HashSet<String>, HashSet<String>) = store
                .mo(target_mo)?
                .operations()
                .iter()
                .map(|id| store.operation(*id).map(|op| (op.external_id.clone(), op.name.clone())))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .unzip();
            copy.external_id =
                next_unique_key(&source.external_id, self.config.copy_suffix_start, &taken_ids);
            copy.name = next_unique_key(&source.name, self.config.copy_suffix_start, &taken_names);
        }

        let new_op = store.insert_operation(target_mo, copy)?;

        for activity_id in source.activities() {
            let mut activity = store.activity(*activity_id)?.clone();
            activity.reset_reported();
            store.insert_activity(new_op, activity)?;
        }
        for requirement_id in source.material_requirements() {
            let requirement = store.material_requirement(*requirement_id)?.clone();
            store.insert_material_requirement(new_op, requirement)?;
        }
        for product_id in source.products() {
            let product = store.product(*product_id)?.clone();
            store.insert_product(new_op, product)?;
        }

        Ok(new_op)
    }
}

impl Default for StructuralDuplicator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn remap(op_map: &HashMap<OpId, OpId>, source: OpId) -> EngineResult<OpId> {
    op_map.get(&source).copied().ok_or_else(|| {
        EngineError::Repository(RepositoryError::ForeignKeyViolation(format!(
            "路径节点引用了订单外的工序 {}",
            source
        )))
    })
}
