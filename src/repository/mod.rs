// ==========================================
// 制造订单工艺路线 - 存储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 内存路线存储 + 场景快照导入导出
// ==========================================

pub mod error;
pub mod routing_store;
pub mod snapshot;

// 重导出核心存储
pub use error::{RepositoryError, RepositoryResult};
pub use routing_store::RoutingStore;
pub use snapshot::SNAPSHOT_FORMAT_VERSION;
