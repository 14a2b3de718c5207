//! File Storage - 文件系统音频块存储实现
//!
//! 实现 ChunkStoragePort trait
//!
//! 目录结构: `{base_dir}/{room_id}/{chunk_id}.webm`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{ChunkStorageError, ChunkStoragePort};

const CHUNK_EXTENSION: &str = "webm";

/// 文件系统音频块存储
pub struct FileChunkStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileChunkStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, ChunkStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ChunkStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    fn room_dir(&self, room_id: &str) -> Result<PathBuf, ChunkStorageError> {
        let safe = !room_id.is_empty()
            && room_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(ChunkStorageError::InvalidRoom(room_id.to_string()));
        }
        Ok(self.base_dir.join(room_id))
    }
}

#[async_trait]
impl ChunkStoragePort for FileChunkStorage {
    fn chunk_path(&self, room_id: &str, chunk_id: Uuid) -> PathBuf {
        self.base_dir
            .join(room_id)
            .join(format!("{}.{}", chunk_id, CHUNK_EXTENSION))
    }

    async fn save_chunk(
        &self,
        room_id: &str,
        chunk_id: Uuid,
        data: &[u8],
    ) -> Result<PathBuf, ChunkStorageError> {
        let room_dir = self.room_dir(room_id)?;

        fs::create_dir_all(&room_dir)
            .await
            .map_err(|e| ChunkStorageError::IoError(e.to_string()))?;

        let path = self.chunk_path(room_id, chunk_id);
        fs::write(&path, data)
            .await
            .map_err(|e| ChunkStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            "Saved audio chunk: room={}, chunk={}, size={} bytes",
            room_id,
            chunk_id,
            data.len()
        );

        Ok(path)
    }

    async fn delete_chunk(&self, room_id: &str, chunk_id: Uuid) -> Result<(), ChunkStorageError> {
        self.room_dir(room_id)?;
        let path = self.chunk_path(room_id, chunk_id);

        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ChunkStorageError::FileNotFound(path.to_string_lossy().to_string())
            }
            _ => ChunkStorageError::IoError(e.to_string()),
        })?;

        tracing::debug!("Deleted audio chunk: room={}, chunk={}", room_id, chunk_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_delete_chunk() {
        let temp_dir = tempdir().unwrap();
        let storage = FileChunkStorage::new(temp_dir.path()).await.unwrap();

        let chunk_id = Uuid::new_v4();
        let data = b"fake webm data";

        let path = storage.save_chunk("r1", chunk_id, data).await.unwrap();
        assert!(path.exists());
        assert_eq!(path, temp_dir.path().join("r1").join(format!("{}.webm", chunk_id)));

        assert_eq!(fs::read(&path).await.unwrap(), data);

        storage.delete_chunk("r1", chunk_id).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_missing_chunk() {
        let temp_dir = tempdir().unwrap();
        let storage = FileChunkStorage::new(temp_dir.path()).await.unwrap();

        let result = storage.delete_chunk("r1", Uuid::new_v4()).await;
        assert!(matches!(result, Err(ChunkStorageError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_unsafe_room_rejected() {
        let temp_dir = tempdir().unwrap();
        let storage = FileChunkStorage::new(temp_dir.path()).await.unwrap();

        let result = storage.save_chunk("../escape", Uuid::new_v4(), b"x").await;
        assert!(matches!(result, Err(ChunkStorageError::InvalidRoom(_))));
    }
}
