// ==========================================
// 制造订单工艺路线 - 领域类型定义
// ==========================================
// 共享枚举: 由排产器、报工、复制引擎共同使用
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 作业生产状态 (Production Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与场景文件一致)
// 红线: FINISHED 之后数量传播引擎不再改写该作业
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Waiting,        // 等待前序
    #[default]
    Ready,          // 就绪
    Started,        // 已开工
    SettingUp,      // 换型准备
    Running,        // 加工中
    PostProcessing, // 后处理
    Finished,       // 已完工
}

impl ProductionStatus {
    /// 是否为终态
    pub fn is_finished(&self) -> bool {
        matches!(self, ProductionStatus::Finished)
    }

    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WAITING" => Some(ProductionStatus::Waiting),
            "READY" => Some(ProductionStatus::Ready),
            "STARTED" => Some(ProductionStatus::Started),
            "SETTING_UP" => Some(ProductionStatus::SettingUp),
            "RUNNING" => Some(ProductionStatus::Running),
            "POST_PROCESSING" => Some(ProductionStatus::PostProcessing),
            "FINISHED" => Some(ProductionStatus::Finished),
            _ => None,
        }
    }

    /// 转换为存储使用的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProductionStatus::Waiting => "WAITING",
            ProductionStatus::Ready => "READY",
            ProductionStatus::Started => "STARTED",
            ProductionStatus::SettingUp => "SETTING_UP",
            ProductionStatus::Running => "RUNNING",
            ProductionStatus::PostProcessing => "POST_PROCESSING",
            ProductionStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
