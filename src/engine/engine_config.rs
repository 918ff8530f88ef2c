// ==========================================
// 制造订单工艺路线 - 引擎配置
// ==========================================
// 来源: ConfigManager::engine_config() 或 Default
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cost_decimals: u32,        // 物料成本缩放后保留小数位: 2
    pub rollback_on_failure: bool, // 失败时回滚到调用前状态: true
    pub copy_suffix_start: u32,    // 复制编号后缀起始值: 2 ("MO1-2")
    pub max_copy_count: u32,       // 单次最多复制份数: 100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_decimals: 2,
            rollback_on_failure: true,
            copy_suffix_start: 2,
            max_copy_count: 100,
        }
    }
}
