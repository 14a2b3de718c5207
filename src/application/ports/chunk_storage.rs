//! Chunk Storage Port - 出站端口
//!
//! 定义上传音频块的文件存储抽象

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// 音频块存储错误
#[derive(Debug, Error)]
pub enum ChunkStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid room directory: {0}")]
    InvalidRoom(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Chunk Storage Port
#[async_trait]
pub trait ChunkStoragePort: Send + Sync {
    /// 音频块的存储路径
    fn chunk_path(&self, room_id: &str, chunk_id: Uuid) -> PathBuf;

    /// 保存音频块，返回存储路径
    async fn save_chunk(
        &self,
        room_id: &str,
        chunk_id: Uuid,
        data: &[u8],
    ) -> Result<PathBuf, ChunkStorageError>;

    /// 删除音频块（文件不存在时返回 FileNotFound）
    async fn delete_chunk(&self, room_id: &str, chunk_id: Uuid) -> Result<(), ChunkStorageError>;
}
