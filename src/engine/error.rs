// ==========================================
// 制造订单工艺路线 - 引擎层错误类型
// ==========================================
// 两类失败: 路径校验失败 / 记录未找到
// 均同步返回给调用方, 引擎内部不重试
// ==========================================

use crate::repository::error::RepositoryError;
use std::fmt;
use thiserror::Error;

/// 路径校验失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValidationReason {
    /// 路径有节点但没有叶子工序 (路线畸形或成环)
    NoLeafOperation,
    /// 递归访问次数超过预算 (疑似成环)
    VisitBudgetExceeded { budget: usize },
}

impl fmt::Display for PathValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationReason::NoLeafOperation => write!(f, "路径没有末道工序"),
            PathValidationReason::VisitBudgetExceeded { budget } => {
                write!(f, "访问次数超过预算 {}", budget)
            }
        }
    }
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("工艺路径校验失败: mo={mo_external_id}, path={path_external_id}, 原因: {reason}")]
    PathValidation {
        mo_external_id: String,
        path_external_id: String,
        reason: PathValidationReason,
    },

    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("无效的复制数量: {count} (允许范围 1..={max})")]
    InvalidCopyCount { count: u32, max: u32 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
