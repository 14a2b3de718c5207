//! Room Context - 房间限界上下文
//!
//! 房间只作为问题和音频分段的归属容器，本身的生命周期不在此处管理

mod errors;
mod value_objects;

pub use errors::RoomError;
pub use value_objects::RoomId;
