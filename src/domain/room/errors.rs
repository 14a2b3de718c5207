//! Room Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("房间 ID 不能为空")]
    EmptyId,

    #[error("房间 ID 过长: {0} 字符")]
    IdTooLong(usize),
}
