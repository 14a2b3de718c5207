//! HTTP Segment Uploader - 把音频分段上传到房间接口
//!
//! 实现 SegmentUploaderPort trait
//!
//! 后端 API:
//! POST {server_url}/rooms/{room_id}/audio
//! Request: multipart/form-data, field `file`, filename `audio.webm`
//! Response: JSON

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::application::ports::{SegmentUploaderPort, UploadError};
use crate::domain::capture::{AudioSegment, SEGMENT_FORM_FIELD};
use crate::domain::room::RoomId;

/// HTTP 上传客户端配置
#[derive(Debug, Clone)]
pub struct HttpSegmentUploaderConfig {
    /// 后端服务基础 URL
    pub server_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSegmentUploaderConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3333".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpSegmentUploaderConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 分段上传客户端
pub struct HttpSegmentUploader {
    client: Client,
    base_url: Url,
}

impl HttpSegmentUploader {
    /// 创建新的上传客户端
    pub fn new(config: HttpSegmentUploaderConfig) -> Result<Self, UploadError> {
        let base_url = Url::parse(&config.server_url)
            .map_err(|e| UploadError::NetworkError(format!("Invalid server URL: {}", e)))?;

        if base_url.cannot_be_a_base() {
            return Err(UploadError::NetworkError(format!(
                "Invalid server URL: {}",
                config.server_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploadError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// 房间音频上传 URL，room id 按路径段转义
    pub fn audio_url(&self, room_id: &RoomId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["rooms", room_id.as_str(), "audio"]);
        }
        url
    }
}

#[async_trait]
impl SegmentUploaderPort for HttpSegmentUploader {
    async fn upload(&self, segment: AudioSegment) -> Result<serde_json::Value, UploadError> {
        let url = self.audio_url(&segment.room_id);
        let size = segment.len();

        let part = Part::bytes(segment.data.to_vec())
            .file_name(segment.file_name)
            .mime_str(&segment.mime_type)
            .map_err(|e| UploadError::InvalidResponse(format!("Invalid mime type: {}", e)))?;
        let form = Form::new().part(SEGMENT_FORM_FIELD, part);

        tracing::debug!(url = %url, size, "Uploading audio segment");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else if e.is_connect() {
                    UploadError::NetworkError(format!("Cannot connect to server: {}", e))
                } else {
                    UploadError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| UploadError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpSegmentUploaderConfig::default();
        assert_eq!(config.server_url, "http://localhost:3333");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSegmentUploaderConfig::new("http://example.com:9000").with_timeout(5);
        assert_eq!(config.server_url, "http://example.com:9000");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_audio_url() {
        let uploader =
            HttpSegmentUploader::new(HttpSegmentUploaderConfig::new("http://localhost:3333/"))
                .unwrap();
        let room = RoomId::new("r1").unwrap();
        assert_eq!(
            uploader.audio_url(&room).as_str(),
            "http://localhost:3333/rooms/r1/audio"
        );
    }

    #[test]
    fn test_audio_url_escapes_room_id() {
        let uploader =
            HttpSegmentUploader::new(HttpSegmentUploaderConfig::new("http://localhost:3333/api"))
                .unwrap();
        let room = RoomId::new("a b/c").unwrap();
        assert_eq!(
            uploader.audio_url(&room).as_str(),
            "http://localhost:3333/api/rooms/a%20b%2Fc/audio"
        );
    }

    #[test]
    fn test_invalid_server_url() {
        let result = HttpSegmentUploader::new(HttpSegmentUploaderConfig::new("not a url"));
        assert!(matches!(result, Err(UploadError::NetworkError(_))));
    }
}
