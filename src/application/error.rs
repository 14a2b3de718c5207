//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ChunkStorageError, RepositoryError};
use crate::domain::question::QuestionError;
use crate::domain::room::RoomError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::not_found("Entity", id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<ChunkStorageError> for ApplicationError {
    fn from(err: ChunkStorageError) -> Self {
        match err {
            ChunkStorageError::InvalidRoom(room) => {
                Self::ValidationError(format!("Invalid room id: {}", room))
            }
            other => Self::StorageError(other.to_string()),
        }
    }
}

impl From<RoomError> for ApplicationError {
    fn from(err: RoomError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<QuestionError> for ApplicationError {
    fn from(err: QuestionError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
