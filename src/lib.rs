// ==========================================
// 制造订单工艺路线 - 核心库
// ==========================================
// 职责: 订单需求数量沿替代路径反推到工序/作业,
//       订单与工序的结构复制
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 存储层 - 内存路线存储与场景快照
pub mod repository;

// 引擎层 - 数量传播与结构复制
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::ProductionStatus;

// 领域实体
pub use domain::{
    Activity, AlternatePath, ManufacturingOrder, MaterialRequirement, PathNode, Product,
    ResourceOperation,
};

// 存储
pub use repository::{RepositoryError, RoutingStore};

// 引擎
pub use engine::{EngineConfig, EngineError, QuantityPropagator, StructuralDuplicator};

// 配置
pub use config::ConfigManager;

// API
pub use api::{ApiError, RoutingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "制造订单工艺路线数量引擎";
