// ==========================================
// 制造订单工艺路线 - 领域模型层
// ==========================================
// 职责: 定义路线实体、句柄与共享枚举
// 红线: 不含存储逻辑,不含引擎逻辑
// ==========================================

pub mod ids;
pub mod material;
pub mod operation;
pub mod routing;
pub mod types;

// 重导出核心类型
pub use ids::{ActivityId, MaterialReqId, MoId, NodeId, OpId, PathId, ProductId};
pub use material::{MaterialRequirement, Product};
pub use operation::{Activity, OperationAttribute, ResourceOperation, ResourceRequirement};
pub use routing::{AlternatePath, ManufacturingOrder, NodeView, PathNode, SuccessorMoLink};
pub use types::ProductionStatus;
