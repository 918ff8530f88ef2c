// ==========================================
// 制造订单工艺路线 - API 层
// ==========================================
// 职责: 以外部编号对外提供路线操作, 统一错误转换
// ==========================================

pub mod error;
pub mod routing_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use routing_api::{MoQuantitySummary, OperationQuantityRow, RoutingApi};
