// ==========================================
// 制造订单工艺路线 - 引擎层
// ==========================================
// 职责: 数量传播 / 结构复制
// 红线: 引擎只通过 RoutingStore 读写实体, 失败时整体回滚
// ==========================================

pub mod duplicator;
pub mod engine_config;
pub mod error;
pub mod quantity;
pub(crate) mod rollback;

// 重导出核心引擎
pub use duplicator::StructuralDuplicator;
pub use engine_config::EngineConfig;
pub use error::{EngineError, EngineResult, PathValidationReason};
pub use quantity::QuantityPropagator;
