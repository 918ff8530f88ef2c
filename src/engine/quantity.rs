// ==========================================
// 制造订单工艺路线 - 数量传播引擎
// ==========================================
// 职责: 需求数量 -> 工序/作业投入产出数量 -> 物料需求/产出品
// 红线: FINISHED 作业不可改写
// 红线: 路径必须有末道工序, 递归访问受预算约束
// ==========================================

mod core;
mod distribution;
mod rescale;
mod rounding;


pub use self::core::QuantityPropagator;
