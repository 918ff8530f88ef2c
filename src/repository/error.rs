// ==========================================
// 制造订单工艺路线 - 存储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 场景快照 =====
    #[error("不支持的场景快照版本: found={found}, expected={expected}")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    #[error("场景快照序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("场景文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
