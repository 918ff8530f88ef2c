// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构建测试路线场景 (订单/工序/作业/路径)
// ==========================================

#![allow(dead_code)]

use aps_routing::domain::ids::{MoId, OpId};
use aps_routing::domain::material::{MaterialRequirement, Product};
use aps_routing::domain::operation::{Activity, ResourceOperation};
use aps_routing::domain::routing::{AlternatePath, ManufacturingOrder};
use aps_routing::{EngineConfig, RoutingApi, RoutingStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 工序规格
// ==========================================

pub struct OpSpec {
    external_id: String,
    name: String,
    scrap_percent: f64,
    whole_number: bool,
    deduct_scrap: bool,
    activity_count: usize,
    material: Option<(f64, f64)>,
    product_qty: Option<f64>,
}

impl OpSpec {
    pub fn new(external_id: &str, name: &str) -> Self {
        Self {
            external_id: external_id.to_string(),
            name: name.to_string(),
            scrap_percent: 0.0,
            whole_number: true,
            deduct_scrap: false,
            activity_count: 1,
            material: None,
            product_qty: None,
        }
    }

    pub fn scrap(mut self, percent: f64) -> Self {
        self.scrap_percent = percent;
        self
    }

    pub fn fractional(mut self) -> Self {
        self.whole_number = false;
        self
    }

    pub fn deduct_scrap(mut self) -> Self {
        self.deduct_scrap = true;
        self
    }

    pub fn activities(mut self, count: usize) -> Self {
        self.activity_count = count;
        self
    }

    /// 物料需求 (数量, 成本)
    pub fn material(mut self, qty: f64, cost: f64) -> Self {
        self.material = Some((qty, cost));
        self
    }

    pub fn product(mut self, qty: f64) -> Self {
        self.product_qty = Some(qty);
        self
    }
}

// ==========================================
// 订单构建器
// ==========================================

pub struct MoBuilder {
    job_external_id: String,
    external_id: String,
    required_qty: f64,
    operations: Vec<OpSpec>,
    paths: Vec<(String, Vec<(String, Option<String>, f64)>)>,
}

impl MoBuilder {
    pub fn new(job_external_id: &str, external_id: &str, required_qty: f64) -> Self {
        Self {
            job_external_id: job_external_id.to_string(),
            external_id: external_id.to_string(),
            required_qty,
            operations: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn op(mut self, spec: OpSpec) -> Self {
        self.operations.push(spec);
        self
    }

    /// 路径边: (前序, 后序, 单耗); 后序为 None 表示末道工序
    pub fn path(mut self, external_id: &str, edges: &[(&str, Option<&str>, f64)]) -> Self {
        let edges = edges
            .iter()
            .map(|(pred, succ, usage)| (pred.to_string(), succ.map(|s| s.to_string()), *usage))
            .collect();
        self.paths.push((external_id.to_string(), edges));
        self
    }

    pub fn build(self, store: &mut RoutingStore) -> MoId {
        let mo = store
            .insert_mo(ManufacturingOrder::new(
                &self.job_external_id,
                &self.external_id,
                &format!("订单{}", self.external_id),
                self.required_qty,
            ))
            .unwrap();

        let mut ops: HashMap<String, OpId> = HashMap::new();
        for spec in self.operations {
            let mut op = ResourceOperation::new(&spec.external_id, &spec.name);
            op.planning_scrap_percent = spec.scrap_percent;
            op.whole_number_splits = spec.whole_number;
            op.deduct_scrap_from_required = spec.deduct_scrap;
            let op_id = store.insert_operation(mo, op).unwrap();

            for i in 0..spec.activity_count {
                store
                    .insert_activity(op_id, Activity::new(&format!("A{}", i + 1)))
                    .unwrap();
            }
            if let Some((qty, cost)) = spec.material {
                store
                    .insert_material_requirement(op_id, MaterialRequirement::new("M1", "STEEL", qty, cost))
                    .unwrap();
            }
            if let Some(qty) = spec.product_qty {
                store
                    .insert_product(op_id, Product::new("P1", "ITEM", qty))
                    .unwrap();
            }
            ops.insert(spec.external_id, op_id);
        }

        for (path_external_id, edges) in self.paths {
            let path = store
                .insert_path(mo, AlternatePath::new(&path_external_id, &path_external_id))
                .unwrap();
            for (pred, succ, usage) in edges {
                let succ = succ.map(|s| ops[&s]);
                store.insert_node(path, ops[&pred], succ, usage).unwrap();
            }
        }

        mo
    }
}

// ==========================================
// 常用场景
// ==========================================

/// 三道工序直线路线: 10 -> 20 -> 30 (整数拆分, 无报废)
pub fn linear_mo(job_external_id: &str, external_id: &str, required_qty: f64) -> MoBuilder {
    MoBuilder::new(job_external_id, external_id, required_qty)
        .op(OpSpec::new("10", "下料"))
        .op(OpSpec::new("20", "焊接"))
        .op(OpSpec::new("30", "喷涂"))
        .path(
            "MAIN",
            &[("10", Some("20"), 1.0), ("20", Some("30"), 1.0), ("30", None, 1.0)],
        )
}

/// 用默认引擎配置创建 API
pub fn create_test_api(store: RoutingStore) -> RoutingApi {
    aps_routing::logging::init_test();
    RoutingApi::new(Arc::new(Mutex::new(store)), EngineConfig::default())
}

/// 浮点数量比较
pub fn assert_qty(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "数量不符: actual={}, expected={}",
        actual,
        expected
    );
}
