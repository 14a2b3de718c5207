//! Repository Ports - 出站端口
//!
//! 定义问题与音频块持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Question Repository
// ============================================================================

/// 问题实体（用于持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub id: String,
    pub room_id: String,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Question Repository Port
#[async_trait]
pub trait QuestionRepositoryPort: Send + Sync {
    /// 保存问题
    async fn save(&self, question: &QuestionRecord) -> Result<(), RepositoryError>;

    /// 获取房间内的所有问题，按 created_at 倒序
    ///
    /// 房间不存在与房间没有问题不做区分，都返回空列表
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<QuestionRecord>, RepositoryError>;
}

// ============================================================================
// Audio Chunk Repository
// ============================================================================

/// 已接收的音频块
#[derive(Debug, Clone)]
pub struct AudioChunkRecord {
    pub id: Uuid,
    pub room_id: String,
    pub file_path: PathBuf,
    pub mime_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Audio Chunk Repository Port
#[async_trait]
pub trait AudioChunkRepositoryPort: Send + Sync {
    /// 保存音频块元数据
    async fn save(&self, chunk: &AudioChunkRecord) -> Result<(), RepositoryError>;

    /// 获取房间内的音频块，按接收顺序
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<AudioChunkRecord>, RepositoryError>;
}
