//! SQLite Audio Chunk Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::path::PathBuf;
use uuid::Uuid;

use super::{ensure_room, format_timestamp, DbPool};
use crate::application::ports::{AudioChunkRecord, AudioChunkRepositoryPort, RepositoryError};

/// SQLite Audio Chunk Repository
pub struct SqliteAudioChunkRepository {
    pool: DbPool,
}

impl SqliteAudioChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AudioChunkRow {
    id: String,
    room_id: String,
    file_path: String,
    mime_type: String,
    size_bytes: i64,
    created_at: String,
}

impl TryFrom<AudioChunkRow> for AudioChunkRecord {
    type Error = RepositoryError;

    fn try_from(row: AudioChunkRow) -> Result<Self, Self::Error> {
        Ok(AudioChunkRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            room_id: row.room_id,
            file_path: PathBuf::from(row.file_path),
            mime_type: row.mime_type,
            size_bytes: row.size_bytes as u64,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl AudioChunkRepositoryPort for SqliteAudioChunkRepository {
    async fn save(&self, chunk: &AudioChunkRecord) -> Result<(), RepositoryError> {
        let created_at = format_timestamp(&chunk.created_at);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        ensure_room(&mut *tx, &chunk.room_id, &created_at)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO audio_chunks (id, room_id, file_path, mime_type, size_bytes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chunk.id.to_string())
        .bind(&chunk.room_id)
        .bind(chunk.file_path.to_string_lossy().to_string())
        .bind(&chunk.mime_type)
        .bind(chunk.size_bytes as i64)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_room(&self, room_id: &str) -> Result<Vec<AudioChunkRecord>, RepositoryError> {
        let rows: Vec<AudioChunkRow> = sqlx::query_as(
            r#"
            SELECT id, room_id, file_path, mime_type, size_bytes, created_at
            FROM audio_chunks
            WHERE room_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(AudioChunkRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    #[tokio::test]
    async fn test_save_and_find_chunks() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteAudioChunkRepository::new(pool);

        let chunk = AudioChunkRecord {
            id: Uuid::new_v4(),
            room_id: "r1".to_string(),
            file_path: PathBuf::from("data/audio/r1/chunk.webm"),
            mime_type: "audio/webm".to_string(),
            size_bytes: 1234,
            created_at: Utc::now(),
        };
        repo.save(&chunk).await.unwrap();

        let chunks = repo.find_by_room("r1").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, chunk.id);
        assert_eq!(chunks[0].size_bytes, 1234);
        assert_eq!(chunks[0].file_path, chunk.file_path);

        assert!(repo.find_by_room("r2").await.unwrap().is_empty());
    }
}
