// ==========================================
// 制造订单工艺路线 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 把存储层/引擎层错误转换为用户友好的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::{EngineError, PathValidationReason};
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 工艺路径畸形 (无末道工序/疑似成环)
    #[error("工艺路径校验失败: mo={mo}, path={path}, 原因: {reason}")]
    PathValidation {
        mo: String,
        path: String,
        reason: PathValidationReason,
    },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 存储/基础设施错误
    // ==========================================
    #[error("路线存储错误: {0}")]
    StoreError(String),

    #[error("存储锁获取失败: {0}")]
    LockError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 按当前语言渲染的错误消息 (面向界面)
    pub fn localized_message(&self) -> String {
        match self {
            ApiError::InvalidInput(detail) => t_with_args("error.invalid_input", &[("detail", detail)]),
            ApiError::NotFound(detail) => t_with_args("error.not_found", &[("detail", detail)]),
            ApiError::PathValidation { mo, path, reason } => {
                let reason = localized_reason(reason);
                t_with_args(
                    "error.path_validation",
                    &[("mo", mo), ("path", path), ("reason", &reason)],
                )
            }
            ApiError::BusinessRuleViolation(detail) => {
                t_with_args("error.business_rule", &[("detail", detail)])
            }
            ApiError::StoreError(detail) => t_with_args("error.store", &[("detail", detail)]),
            ApiError::LockError(detail) => t_with_args("error.lock", &[("detail", detail)]),
            ApiError::ConfigError(detail) => t_with_args("error.config", &[("detail", detail)]),
            ApiError::Other(err) => t_with_args("error.internal", &[("detail", &err.to_string())]),
        }
    }
}

fn localized_reason(reason: &PathValidationReason) -> String {
    match reason {
        PathValidationReason::NoLeafOperation => t_with_args("path_reason.no_leaf", &[]),
        PathValidationReason::VisitBudgetExceeded { budget } => {
            t_with_args("path_reason.visit_budget", &[("budget", &budget.to_string())])
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将存储层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::UnsupportedSnapshotVersion { found, expected } => ApiError::InvalidInput(
                format!("场景快照版本 {} 不受支持 (期望 {})", found, expected),
            ),
            RepositoryError::Serialization(e) => ApiError::StoreError(format!("场景快照解析失败: {}", e)),
            RepositoryError::Io(e) => ApiError::StoreError(format!("场景文件读写失败: {}", e)),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::PathValidation {
                mo_external_id,
                path_external_id,
                reason,
            } => ApiError::PathValidation {
                mo: mo_external_id,
                path: path_external_id,
                reason,
            },
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::InvalidCopyCount { count, max } => {
                ApiError::InvalidInput(format!("复制数量 {} 超出允许范围 1..={}", count, max))
            }
            EngineError::Repository(e) => ApiError::from(e),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::set_locale;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "ManufacturingOrder".to_string(),
            id: "J1/MO9".to_string(),
        }
        .into();

        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("ManufacturingOrder"));
                assert!(msg.contains("J1/MO9"));
            }
            _ => panic!("Expected NotFound error"),
        }

        let api_err: ApiError = RepositoryError::UniqueConstraintViolation("MO1".to_string()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_engine_error_conversion() {
        let api_err: ApiError = EngineError::PathValidation {
            mo_external_id: "MO1".to_string(),
            path_external_id: "MAIN".to_string(),
            reason: PathValidationReason::NoLeafOperation,
        }
        .into();

        match &api_err {
            ApiError::PathValidation { mo, path, reason } => {
                assert_eq!(mo, "MO1");
                assert_eq!(path, "MAIN");
                assert_eq!(*reason, PathValidationReason::NoLeafOperation);
            }
            _ => panic!("Expected PathValidation error"),
        }
        assert!(api_err.to_string().contains("路径没有末道工序"));

        let api_err: ApiError = EngineError::InvalidCopyCount { count: 0, max: 100 }.into();
        assert!(matches!(api_err, ApiError::InvalidInput(_)));

        let api_err: ApiError =
            EngineError::Repository(RepositoryError::ForeignKeyViolation("PATH#9".to_string())).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_localized_message() {
        let _guard = crate::i18n::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let err = ApiError::PathValidation {
            mo: "MO1".to_string(),
            path: "MAIN".to_string(),
            reason: PathValidationReason::VisitBudgetExceeded { budget: 6 },
        };

        set_locale("zh-CN");
        let msg = err.localized_message();
        assert!(msg.contains("MO1"));
        assert!(msg.contains("预算 6"));

        set_locale("en");
        let msg = err.localized_message();
        assert!(msg.contains("order MO1"));
        assert!(msg.contains("visit budget 6 exceeded"));

        set_locale("zh-CN");
    }
}
