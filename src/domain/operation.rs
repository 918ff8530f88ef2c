// ==========================================
// 制造订单工艺路线 - 工序与作业领域模型
// ==========================================
// 实体: ResourceOperation / Activity
// 值对象: ResourceRequirement / OperationAttribute
// ==========================================

use crate::domain::ids::{ActivityId, MaterialReqId, MoId, OpId, ProductId};
use crate::domain::types::ProductionStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ResourceOperation - 工序
// ==========================================
// 主键: (mo, external_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOperation {
    pub mo: MoId,
    pub external_id: String,
    pub name: String,
    pub description: String,

    // ===== 引擎写入 =====
    pub required_start_qty: f64,   // 需求投入数量
    pub required_finish_qty: f64,  // 需求产出数量
    pub remaining_finish_qty: f64, // 剩余待产出数量
    pub expected_scrap_qty: f64,   // 预计报废数量

    // ===== 引擎读取 =====
    pub planning_scrap_percent: f64,      // 计划报废率 (0~1)
    pub whole_number_splits: bool,        // 整数拆分 (向上/向下取整)
    pub deduct_scrap_from_required: bool, // 按前序可供量扣减产出

    pub resource_requirements: Vec<ResourceRequirement>,
    pub attributes: Vec<OperationAttribute>,

    // ===== 子实体索引 (由存储维护) =====
    #[serde(default)]
    pub(crate) activities: Vec<ActivityId>,
    #[serde(default)]
    pub(crate) material_requirements: Vec<MaterialReqId>,
    #[serde(default)]
    pub(crate) products: Vec<ProductId>,
}

impl ResourceOperation {
    pub fn new(external_id: &str, name: &str) -> Self {
        Self {
            mo: MoId(0),
            external_id: external_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            required_start_qty: 0.0,
            required_finish_qty: 0.0,
            remaining_finish_qty: 0.0,
            expected_scrap_qty: 0.0,
            planning_scrap_percent: 0.0,
            whole_number_splits: false,
            deduct_scrap_from_required: false,
            resource_requirements: Vec::new(),
            attributes: Vec::new(),
            activities: Vec::new(),
            material_requirements: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn activities(&self) -> &[ActivityId] {
        &self.activities
    }

    pub fn material_requirements(&self) -> &[MaterialReqId] {
        &self.material_requirements
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }
}

/// 资源需求 (随工序一起复制)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub external_id: String,
    pub description: String,
    pub usage_start: bool,          // 是否占用换型阶段
    pub usage_end: bool,            // 是否占用后处理阶段
    pub capabilities: Vec<String>,  // 所需能力编码
}

/// 工序属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationAttribute {
    pub code: String,
    pub value: String,
}

// ==========================================
// Activity - 作业 (工序的拆分单元)
// ==========================================
// 主键: (mo, operation, external_id)
// 红线: FINISHED 后数量不可被引擎改写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub mo: MoId,
    pub operation: OpId,
    pub external_id: String,

    // ===== 引擎写入 =====
    pub required_start_qty: f64,
    pub required_finish_qty: f64,
    pub remaining_qty: f64,

    // ===== 报工写入 =====
    pub reported_good_qty: f64,
    pub reported_scrap_qty: f64,
    pub reported_setup_hours: f64,
    pub reported_run_hours: f64,
    pub reported_post_processing_hours: f64,
    pub reported_start: Option<NaiveDateTime>,
    pub reported_finish: Option<NaiveDateTime>,
    pub production_status: ProductionStatus,
}

impl Activity {
    pub fn new(external_id: &str) -> Self {
        Self {
            mo: MoId(0),
            operation: OpId(0),
            external_id: external_id.to_string(),
            required_start_qty: 0.0,
            required_finish_qty: 0.0,
            remaining_qty: 0.0,
            reported_good_qty: 0.0,
            reported_scrap_qty: 0.0,
            reported_setup_hours: 0.0,
            reported_run_hours: 0.0,
            reported_post_processing_hours: 0.0,
            reported_start: None,
            reported_finish: None,
            production_status: ProductionStatus::Ready,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.production_status.is_finished()
    }

    /// 清空报工数据, 状态回到 READY (用于复制出的新作业)
    pub fn reset_reported(&mut self) {
        self.reported_good_qty = 0.0;
        self.reported_scrap_qty = 0.0;
        self.reported_setup_hours = 0.0;
        self.reported_run_hours = 0.0;
        self.reported_post_processing_hours = 0.0;
        self.reported_start = None;
        self.reported_finish = None;
        self.production_status = ProductionStatus::Ready;
    }
}
