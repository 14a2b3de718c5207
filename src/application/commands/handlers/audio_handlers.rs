//! Audio Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::UploadAudioChunk;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioChunkRecord, AudioChunkRepositoryPort, ChunkStoragePort};

// ============================================================================
// UploadAudioChunk
// ============================================================================

/// 上传音频块响应
#[derive(Debug, Clone)]
pub struct UploadAudioChunkResponse {
    pub chunk_id: Uuid,
}

/// UploadAudioChunk Handler
///
/// 音频块相互独立，按到达顺序落盘，不做排序或合并
pub struct UploadAudioChunkHandler {
    chunk_storage: Arc<dyn ChunkStoragePort>,
    chunk_repo: Arc<dyn AudioChunkRepositoryPort>,
}

impl UploadAudioChunkHandler {
    pub fn new(
        chunk_storage: Arc<dyn ChunkStoragePort>,
        chunk_repo: Arc<dyn AudioChunkRepositoryPort>,
    ) -> Self {
        Self {
            chunk_storage,
            chunk_repo,
        }
    }

    pub async fn handle(
        &self,
        command: UploadAudioChunk,
    ) -> Result<UploadAudioChunkResponse, ApplicationError> {
        if command.data.is_empty() {
            return Err(ApplicationError::validation("Audio file is empty"));
        }
        if !command.room_id.is_path_safe() {
            return Err(ApplicationError::validation(format!(
                "Invalid room id: {}",
                command.room_id
            )));
        }

        let chunk_id = Uuid::new_v4();
        let room_id = command.room_id.as_str();

        let file_path = self
            .chunk_storage
            .save_chunk(room_id, chunk_id, &command.data)
            .await?;

        let record = AudioChunkRecord {
            id: chunk_id,
            room_id: room_id.to_string(),
            file_path,
            mime_type: command.mime_type,
            size_bytes: command.data.len() as u64,
            created_at: Utc::now(),
        };

        if let Err(e) = self.chunk_repo.save(&record).await {
            // 没有记录指向的文件不保留
            if let Err(cleanup) = self.chunk_storage.delete_chunk(room_id, chunk_id).await {
                tracing::warn!(
                    chunk_id = %chunk_id,
                    room_id = %record.room_id,
                    error = %cleanup,
                    "Failed to remove orphaned audio chunk"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            chunk_id = %chunk_id,
            room_id = %record.room_id,
            size = record.size_bytes,
            mime_type = %record.mime_type,
            "Audio chunk stored"
        );

        Ok(UploadAudioChunkResponse { chunk_id })
    }
}
