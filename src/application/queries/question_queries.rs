//! Question Queries

/// 列出房间内所有问题（最新在前）
///
/// 房间号按原样匹配，不做裁剪或长度限制；未知房间返回空列表
#[derive(Debug, Clone)]
pub struct GetRoomQuestions {
    pub room_id: String,
}
