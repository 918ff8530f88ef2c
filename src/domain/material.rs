// ==========================================
// 制造订单工艺路线 - 物料需求与产出品
// ==========================================
// MaterialRequirement 随工序投入数量等比缩放
// Product 随工序产出数量等比缩放
// ==========================================

use crate::domain::ids::{MoId, OpId};
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialRequirement - 物料需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub mo: MoId,
    pub operation: OpId,
    pub external_id: String,
    pub item_external_id: String, // 物料编码
    pub total_required_qty: f64,  // 总需求量
    pub total_cost: f64,          // 总成本
}

impl MaterialRequirement {
    pub fn new(external_id: &str, item_external_id: &str, total_required_qty: f64, total_cost: f64) -> Self {
        Self {
            mo: MoId(0),
            operation: OpId(0),
            external_id: external_id.to_string(),
            item_external_id: item_external_id.to_string(),
            total_required_qty,
            total_cost,
        }
    }
}

// ==========================================
// Product - 产出品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub mo: MoId,
    pub operation: OpId,
    pub external_id: String,
    pub item_external_id: String,
    pub total_output_qty: f64, // 总产出量
}

impl Product {
    pub fn new(external_id: &str, item_external_id: &str, total_output_qty: f64) -> Self {
        Self {
            mo: MoId(0),
            operation: OpId(0),
            external_id: external_id.to_string(),
            item_external_id: item_external_id.to_string(),
            total_output_qty,
        }
    }
}
