// ==========================================
// 制造订单工艺路线 - 订单与路径领域模型
// ==========================================
// 实体: ManufacturingOrder / AlternatePath / PathNode
// 红线: 同一 (MO, 路径) 内的节点构成 DAG, 由传播预算兜底
// ==========================================

use crate::domain::ids::{MoId, NodeId, OpId, PathId};
use serde::{Deserialize, Serialize};

// ==========================================
// ManufacturingOrder - 制造订单
// ==========================================
// 主键: (job_external_id, external_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingOrder {
    pub job_external_id: String,         // 所属作业单(Job)
    pub external_id: String,             // 外部编号 (Job 内唯一)
    pub name: String,                    // 名称
    pub description: String,             // 描述
    pub required_qty: f64,               // 需求数量 (输入)
    pub expected_finish_qty: f64,        // 预计完工数量 (引擎计算)
    pub current_path: Option<PathId>,    // 当前使用的替代路径
    pub successor_mos: Vec<SuccessorMoLink>, // 后继订单链接

    // ===== 子实体索引 (由存储维护) =====
    #[serde(default)]
    pub(crate) paths: Vec<PathId>,
    #[serde(default)]
    pub(crate) operations: Vec<OpId>,
}

impl ManufacturingOrder {
    pub fn new(job_external_id: &str, external_id: &str, name: &str, required_qty: f64) -> Self {
        Self {
            job_external_id: job_external_id.to_string(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            required_qty,
            expected_finish_qty: 0.0,
            current_path: None,
            successor_mos: Vec::new(),
            paths: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// 该订单下的所有替代路径
    pub fn paths(&self) -> &[PathId] {
        &self.paths
    }

    /// 该订单下的所有工序
    pub fn operations(&self) -> &[OpId] {
        &self.operations
    }
}

/// 后继订单链接 (MO 间的物料流转)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessorMoLink {
    pub successor_job_external_id: String,
    pub successor_mo_external_id: String,
    pub successor_operation_external_id: Option<String>,
    pub usage_qty_per_cycle: f64,
    pub transfer_hours: f64,
}

// ==========================================
// AlternatePath - 替代路径
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternatePath {
    pub mo: MoId,             // 所属订单 (插入时由存储改写)
    pub external_id: String,  // 路径编号 (MO 内唯一)
    pub name: String,         // 路径名称
    pub preference: i32,      // 优先级 (越小越优先)

    #[serde(default)]
    pub(crate) nodes: Vec<NodeId>,
}

impl AlternatePath {
    pub fn new(external_id: &str, name: &str) -> Self {
        Self {
            mo: MoId(0),
            external_id: external_id.to_string(),
            name: name.to_string(),
            preference: 0,
            nodes: Vec::new(),
        }
    }

    /// 路径内的所有节点
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

// ==========================================
// PathNode - 路径节点 (前序工序 -> 后序工序)
// ==========================================
// successor 为空: 前序工序是该路径的末道(叶子)工序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub mo: MoId,
    pub path: PathId,
    pub predecessor: OpId,
    pub successor: Option<OpId>,
    pub usage_qty_per_cycle: f64, // 后序每周期消耗前序的数量
}

impl PathNode {
    /// 是否为自环边
    pub fn is_self_edge(&self) -> bool {
        self.successor == Some(self.predecessor)
    }
}

/// 路径节点的展示视图
///
/// 展示文本总是从引用的工序实时派生, 节点本身不保存冗余文本,
/// 因此结构变更(复制/插入工序)之后无需同步。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub path_external_id: String,
    pub predecessor_external_id: String,
    pub predecessor_name: String,
    pub predecessor_description: String,
    pub successor_external_id: Option<String>,
    pub successor_name: Option<String>,
    pub successor_description: Option<String>,
    pub usage_qty_per_cycle: f64,
}
