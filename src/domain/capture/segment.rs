//! Capture Context - Audio Segment

use bytes::Bytes;

use crate::domain::room::RoomId;

/// 上传时使用的文件名
pub const SEGMENT_FILE_NAME: &str = "audio.webm";

/// multipart 表单字段名
pub const SEGMENT_FORM_FIELD: &str = "file";

/// 一段可独立解码的音频
///
/// 上传后所有权转移给后端，客户端不再保留引用
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub room_id: RoomId,
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: &'static str,
}

impl AudioSegment {
    pub fn new(room_id: RoomId, data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            room_id,
            data: data.into(),
            mime_type: mime_type.into(),
            file_name: SEGMENT_FILE_NAME,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
