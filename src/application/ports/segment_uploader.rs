//! Segment Uploader Port - 音频分段上传抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::AudioSegment;

/// 上传错误
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Server responded with HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Segment Uploader Port
///
/// 每个分段独立上传，不重试；响应体按 JSON 解析后原样返回
#[async_trait]
pub trait SegmentUploaderPort: Send + Sync {
    async fn upload(&self, segment: AudioSegment) -> Result<serde_json::Value, UploadError>;
}
