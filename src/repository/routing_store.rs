// ==========================================
// 制造订单工艺路线 - 路线存储
// ==========================================
// 职责: 按场景保存订单/路径/节点/工序/作业/物料需求/产出品
// 结构: 每类实体一个数组 (arena), 通过整数句柄引用
// 索引: 父实体持有子实体句柄列表, 插入时维护; 订单另有外部编号索引
// 红线: 存储不含业务逻辑
// ==========================================

use crate::domain::ids::{ActivityId, MaterialReqId, MoId, NodeId, OpId, PathId, ProductId};
use crate::domain::material::{MaterialRequirement, Product};
use crate::domain::operation::{Activity, ResourceOperation};
use crate::domain::routing::{AlternatePath, ManufacturingOrder, NodeView, PathNode};
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RoutingStore - 路线存储
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingStore {
    mos: Vec<ManufacturingOrder>,
    paths: Vec<AlternatePath>,
    nodes: Vec<PathNode>,
    operations: Vec<ResourceOperation>,
    activities: Vec<Activity>,
    material_requirements: Vec<MaterialRequirement>,
    products: Vec<Product>,

    // (job_external_id, mo_external_id) -> MoId
    #[serde(skip)]
    mo_index: HashMap<(String, String), MoId>,
}

fn row<'a, T>(rows: &'a [T], index: usize, entity: &str, handle: impl ToString) -> RepositoryResult<&'a T> {
    rows.get(index)
        .ok_or_else(|| RepositoryError::not_found(entity, handle))
}

fn row_mut<'a, T>(
    rows: &'a mut [T],
    index: usize,
    entity: &str,
    handle: impl ToString,
) -> RepositoryResult<&'a mut T> {
    rows.get_mut(index)
        .ok_or_else(|| RepositoryError::not_found(entity, handle))
}

fn check_owner(owned: bool, child: impl std::fmt::Display, parent: impl std::fmt::Display) -> RepositoryResult<()> {
    if owned {
        Ok(())
    } else {
        Err(RepositoryError::ForeignKeyViolation(format!(
            "{} 不属于 {}",
            child, parent
        )))
    }
}

impl RoutingStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 重建外部编号索引 (反序列化之后调用)
    pub(crate) fn rebuild_index(&mut self) {
        self.mo_index = self
            .mos
            .iter()
            .enumerate()
            .map(|(i, mo)| ((mo.job_external_id.clone(), mo.external_id.clone()), MoId(i)))
            .collect();
    }

    /// 校验句柄引用 (反序列化之后调用)
    ///
    /// 父实体的子实体列表、当前路径、节点工序必须指向存在且归属一致的记录。
    pub(crate) fn validate_references(&self) -> RepositoryResult<()> {
        self.check_references().map_err(|err| match err {
            RepositoryError::NotFound { entity, id } => {
                RepositoryError::ForeignKeyViolation(format!("引用了不存在的 {} {}", entity, id))
            }
            other => other,
        })
    }

    fn check_references(&self) -> RepositoryResult<()> {
        if self.mo_index.len() != self.mos.len() {
            return Err(RepositoryError::UniqueConstraintViolation(
                "场景中存在重复的制造订单编号".to_string(),
            ));
        }

        for (i, mo) in self.mos.iter().enumerate() {
            let mo_id = MoId(i);
            for path_id in &mo.paths {
                check_owner(self.path(*path_id)?.mo == mo_id, *path_id, mo_id)?;
            }
            for op_id in &mo.operations {
                check_owner(self.operation(*op_id)?.mo == mo_id, *op_id, mo_id)?;
            }
            if let Some(current) = mo.current_path {
                check_owner(mo.paths.contains(&current), current, mo_id)?;
            }
        }

        for (i, path) in self.paths.iter().enumerate() {
            let path_id = PathId(i);
            self.mo(path.mo)?;
            for node_id in &path.nodes {
                let node = self.node(*node_id)?;
                check_owner(node.path == path_id && node.mo == path.mo, *node_id, path_id)?;
                self.ensure_operation_in_mo(node.predecessor, node.mo)?;
                if let Some(successor) = node.successor {
                    self.ensure_operation_in_mo(successor, node.mo)?;
                }
            }
        }

        for (i, op) in self.operations.iter().enumerate() {
            let op_id = OpId(i);
            self.mo(op.mo)?;
            for id in &op.activities {
                check_owner(self.activity(*id)?.operation == op_id, *id, op_id)?;
            }
            for id in &op.material_requirements {
                check_owner(self.material_requirement(*id)?.operation == op_id, *id, op_id)?;
            }
            for id in &op.products {
                check_owner(self.product(*id)?.operation == op_id, *id, op_id)?;
            }
        }

        Ok(())
    }

    // ==========================================
    // 制造订单
    // ==========================================

    /// 插入制造订单
    ///
    /// 子实体索引与当前路径会被清空, 之后通过 insert_* 逐个挂接。
    pub fn insert_mo(&mut self, mut mo: ManufacturingOrder) -> RepositoryResult<MoId> {
        let key = (mo.job_external_id.clone(), mo.external_id.clone());
        if self.mo_index.contains_key(&key) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "制造订单 {}/{} 已存在",
                key.0, key.1
            )));
        }

        mo.paths.clear();
        mo.operations.clear();
        mo.current_path = None;

        let id = MoId(self.mos.len());
        self.mos.push(mo);
        self.mo_index.insert(key, id);
        Ok(id)
    }

    pub fn mo(&self, id: MoId) -> RepositoryResult<&ManufacturingOrder> {
        row(&self.mos, id.0, "ManufacturingOrder", id)
    }

    pub fn mo_mut(&mut self, id: MoId) -> RepositoryResult<&mut ManufacturingOrder> {
        row_mut(&mut self.mos, id.0, "ManufacturingOrder", id)
    }

    /// 按外部编号查找制造订单
    pub fn find_mo(&self, job_external_id: &str, mo_external_id: &str) -> Option<MoId> {
        self.mo_index
            .get(&(job_external_id.to_string(), mo_external_id.to_string()))
            .copied()
    }

    /// 所有制造订单句柄 (插入顺序)
    pub fn mo_ids(&self) -> Vec<MoId> {
        (0..self.mos.len()).map(MoId).collect()
    }

    /// 某个 Job 下的所有制造订单
    pub fn mos_in_job<'a>(
        &'a self,
        job_external_id: &'a str,
    ) -> impl Iterator<Item = (MoId, &'a ManufacturingOrder)> + 'a {
        self.mos
            .iter()
            .enumerate()
            .filter(move |(_, mo)| mo.job_external_id == job_external_id)
            .map(|(i, mo)| (MoId(i), mo))
    }

    pub fn mo_count(&self) -> usize {
        self.mos.len()
    }

    // ==========================================
    // 替代路径与节点
    // ==========================================

    /// 插入替代路径; 订单的第一条路径自动成为当前路径
    pub fn insert_path(&mut self, mo_id: MoId, mut path: AlternatePath) -> RepositoryResult<PathId> {
        let mo = self.mo(mo_id)?;
        if mo
            .paths
            .iter()
            .filter_map(|p| self.paths.get(p.0))
            .any(|p| p.external_id == path.external_id)
        {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "路径 {} 在订单 {} 中已存在",
                path.external_id, mo.external_id
            )));
        }

        path.mo = mo_id;
        path.nodes.clear();

        let id = PathId(self.paths.len());
        self.paths.push(path);

        let mo = self.mo_mut(mo_id)?;
        mo.paths.push(id);
        if mo.current_path.is_none() {
            mo.current_path = Some(id);
        }
        Ok(id)
    }

    pub fn set_current_path(&mut self, mo_id: MoId, path_id: PathId) -> RepositoryResult<()> {
        let owner = self.path(path_id)?.mo;
        if owner != mo_id {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "路径 {} 不属于订单 {}",
                path_id, mo_id
            )));
        }
        self.mo_mut(mo_id)?.current_path = Some(path_id);
        Ok(())
    }

    pub fn path(&self, id: PathId) -> RepositoryResult<&AlternatePath> {
        row(&self.paths, id.0, "AlternatePath", id)
    }

    /// 插入路径节点 (前序 -> 后序); successor 为 None 表示前序为叶子工序
    pub fn insert_node(
        &mut self,
        path_id: PathId,
        predecessor: OpId,
        successor: Option<OpId>,
        usage_qty_per_cycle: f64,
    ) -> RepositoryResult<NodeId> {
        let mo_id = self.path(path_id)?.mo;
        self.ensure_operation_in_mo(predecessor, mo_id)?;
        if let Some(successor) = successor {
            self.ensure_operation_in_mo(successor, mo_id)?;
        }

        let duplicate = self
            .path(path_id)?
            .nodes
            .iter()
            .filter_map(|n| self.nodes.get(n.0))
            .any(|node| node.predecessor == predecessor && node.successor == successor);
        if duplicate {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "路径 {} 中已存在节点 {} -> {:?}",
                path_id, predecessor, successor
            )));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(PathNode {
            mo: mo_id,
            path: path_id,
            predecessor,
            successor,
            usage_qty_per_cycle,
        });
        row_mut(&mut self.paths, path_id.0, "AlternatePath", path_id)?.nodes.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> RepositoryResult<&PathNode> {
        row(&self.nodes, id.0, "PathNode", id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> RepositoryResult<&mut PathNode> {
        row_mut(&mut self.nodes, id.0, "PathNode", id)
    }

    /// 节点展示视图 (工序名称/描述实时派生)
    pub fn node_view(&self, id: NodeId) -> RepositoryResult<NodeView> {
        let node = self.node(id)?;
        let path = self.path(node.path)?;
        let predecessor = self.operation(node.predecessor)?;
        let successor = node.successor.map(|s| self.operation(s)).transpose()?;

        Ok(NodeView {
            path_external_id: path.external_id.clone(),
            predecessor_external_id: predecessor.external_id.clone(),
            predecessor_name: predecessor.name.clone(),
            predecessor_description: predecessor.description.clone(),
            successor_external_id: successor.map(|op| op.external_id.clone()),
            successor_name: successor.map(|op| op.name.clone()),
            successor_description: successor.map(|op| op.description.clone()),
            usage_qty_per_cycle: node.usage_qty_per_cycle,
        })
    }

    // ==========================================
    // 工序
    // ==========================================

    pub fn insert_operation(
        &mut self,
        mo_id: MoId,
        mut op: ResourceOperation,
    ) -> RepositoryResult<OpId> {
        if self.find_operation(mo_id, &op.external_id).is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "工序 {} 在订单 {} 中已存在",
                op.external_id,
                self.mo(mo_id)?.external_id
            )));
        }

        op.mo = mo_id;
        op.activities.clear();
        op.material_requirements.clear();
        op.products.clear();

        let id = OpId(self.operations.len());
        self.mo_mut(mo_id)?.operations.push(id);
        self.operations.push(op);
        Ok(id)
    }

    pub fn operation(&self, id: OpId) -> RepositoryResult<&ResourceOperation> {
        row(&self.operations, id.0, "ResourceOperation", id)
    }

    pub fn operation_mut(&mut self, id: OpId) -> RepositoryResult<&mut ResourceOperation> {
        row_mut(&mut self.operations, id.0, "ResourceOperation", id)
    }

    /// 按外部编号查找订单内的工序
    pub fn find_operation(&self, mo_id: MoId, op_external_id: &str) -> Option<OpId> {
        let mo = self.mos.get(mo_id.0)?;
        mo.operations
            .iter()
            .copied()
            .find(|id| {
                self.operations
                    .get(id.0)
                    .is_some_and(|op| op.external_id == op_external_id)
            })
    }

    fn ensure_operation_in_mo(&self, op_id: OpId, mo_id: MoId) -> RepositoryResult<()> {
        if self.operation(op_id)?.mo != mo_id {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "工序 {} 不属于订单 {}",
                op_id, mo_id
            )));
        }
        Ok(())
    }

    // ==========================================
    // 作业 / 物料需求 / 产出品
    // ==========================================

    pub fn insert_activity(&mut self, op_id: OpId, mut activity: Activity) -> RepositoryResult<ActivityId> {
        let op = self.operation(op_id)?;
        if op
            .activities
            .iter()
            .filter_map(|a| self.activities.get(a.0))
            .any(|a| a.external_id == activity.external_id)
        {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "作业 {} 在工序 {} 中已存在",
                activity.external_id, op.external_id
            )));
        }

        activity.mo = op.mo;
        activity.operation = op_id;

        let id = ActivityId(self.activities.len());
        self.activities.push(activity);
        self.operation_mut(op_id)?.activities.push(id);
        Ok(id)
    }

    pub fn activity(&self, id: ActivityId) -> RepositoryResult<&Activity> {
        row(&self.activities, id.0, "Activity", id)
    }

    pub fn activity_mut(&mut self, id: ActivityId) -> RepositoryResult<&mut Activity> {
        row_mut(&mut self.activities, id.0, "Activity", id)
    }

    pub fn insert_material_requirement(
        &mut self,
        op_id: OpId,
        mut requirement: MaterialRequirement,
    ) -> RepositoryResult<MaterialReqId> {
        let op = self.operation(op_id)?;
        if op
            .material_requirements
            .iter()
            .filter_map(|m| self.material_requirements.get(m.0))
            .any(|m| m.external_id == requirement.external_id)
        {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "物料需求 {} 在工序 {} 中已存在",
                requirement.external_id, op.external_id
            )));
        }

        requirement.mo = op.mo;
        requirement.operation = op_id;

        let id = MaterialReqId(self.material_requirements.len());
        self.material_requirements.push(requirement);
        self.operation_mut(op_id)?.material_requirements.push(id);
        Ok(id)
    }

    pub fn material_requirement(&self, id: MaterialReqId) -> RepositoryResult<&MaterialRequirement> {
        row(&self.material_requirements, id.0, "MaterialRequirement", id)
    }

    pub fn material_requirement_mut(
        &mut self,
        id: MaterialReqId,
    ) -> RepositoryResult<&mut MaterialRequirement> {
        row_mut(&mut self.material_requirements, id.0, "MaterialRequirement", id)
    }

    pub fn insert_product(&mut self, op_id: OpId, mut product: Product) -> RepositoryResult<ProductId> {
        let op = self.operation(op_id)?;
        if op
            .products
            .iter()
            .filter_map(|p| self.products.get(p.0))
            .any(|p| p.external_id == product.external_id)
        {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "产出品 {} 在工序 {} 中已存在",
                product.external_id, op.external_id
            )));
        }

        product.mo = op.mo;
        product.operation = op_id;

        let id = ProductId(self.products.len());
        self.products.push(product);
        self.operation_mut(op_id)?.products.push(id);
        Ok(id)
    }

    pub fn product(&self, id: ProductId) -> RepositoryResult<&Product> {
        row(&self.products, id.0, "Product", id)
    }

    pub fn product_mut(&mut self, id: ProductId) -> RepositoryResult<&mut Product> {
        row_mut(&mut self.products, id.0, "Product", id)
    }
}
