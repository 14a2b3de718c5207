//! Audio HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::UploadAudioChunk;
use crate::domain::capture::SEGMENT_FORM_FIELD;
use crate::domain::room::RoomId;
use crate::infrastructure::http::dto::UploadAudioResult;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// 上传音频分段
///
/// multipart 表单中必须包含 `file` 字段，其余字段忽略
pub async fn upload_audio(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadAudioResult>), ApiError> {
    let room_id = RoomId::new(room_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut audio: Option<(bytes::Bytes, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(SEGMENT_FORM_FIELD) {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read audio file: {}", e)))?;

        audio = Some((data, mime_type));
    }

    let (data, mime_type) = audio.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field: {}", SEGMENT_FORM_FIELD))
    })?;

    let response = state
        .upload_audio_handler
        .handle(UploadAudioChunk {
            room_id,
            data,
            mime_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(response.into())))
}
