// ==========================================
// 制造订单工艺路线 - 配置层
// ==========================================
// 职责: 系统配置管理, 组装引擎配置
// 存储: JSON 配置文件 (key-value)
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_path, ConfigManager};
