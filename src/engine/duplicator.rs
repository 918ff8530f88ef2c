// ==========================================
// 制造订单工艺路线 - 结构复制引擎
// ==========================================
// 职责: 深拷贝制造订单 / 复制单个工序并接入当前路径
// 顺序: 先写父实体(订单/工序), 再写依赖实体(路径/节点/需求)
// ==========================================

mod core;
mod naming;


pub use self::core::StructuralDuplicator;
