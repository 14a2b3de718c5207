//! Question Commands

use crate::domain::room::RoomId;

/// 在房间内创建问题
#[derive(Debug, Clone)]
pub struct CreateQuestion {
    pub room_id: RoomId,
    pub question: String,
}
