//! 统一错误定义
//!
//! 覆盖序列化、快照存储、聚合工厂、仓储与命令校验等场景，
//! 各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 快照存储 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("invalid identifier: {reason}")]
    InvalidIdentifier { reason: String },
    #[error("storage error: {reason}")]
    Storage { reason: String },
    #[error("storage conflict: aggregate_id={aggregate_id}, version={version}")]
    StorageConflict { aggregate_id: String, version: usize },
    /// 事件已提交，但随后的快照写入失败
    #[error("events committed but snapshot not saved: aggregate_id={aggregate_id}, version={version}: {source}")]
    SnapshotNotSaved {
        aggregate_id: String,
        version: usize,
        #[source]
        source: Box<DomainError>,
    },

    // --- 工厂/仓储 ---
    #[error("aggregate factory error: {reason}")]
    Factory { reason: String },
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("event repository error: {reason}")]
    EventRepository { reason: String },
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict { expected: usize, actual: usize },

    // --- 领域规则/命令与状态 ---
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
}

impl DomainError {
    /// 是否为“未找到”错误（快照仓储会将其转换为 `None`）
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// 事件是否已经提交（仅快照失败）
    pub fn is_committed(&self) -> bool {
        matches!(self, DomainError::SnapshotNotSaved { .. })
    }

    /// 是否为同一 (aggregate_id, version) 的重复写入
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::StorageConflict { .. } | DomainError::VersionConflict { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----

#[cfg(any(feature = "postgres", feature = "sqlite"))]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound {
                reason: "row not found".to_string(),
            },
            other => DomainError::Storage {
                reason: other.to_string(),
            },
        }
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::InvalidIdentifier {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
