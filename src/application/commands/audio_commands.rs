//! Audio Commands

use bytes::Bytes;

use crate::domain::room::RoomId;

/// 接收客户端上传的音频块
#[derive(Debug, Clone)]
pub struct UploadAudioChunk {
    pub room_id: RoomId,
    pub data: Bytes,
    pub mime_type: String,
}
