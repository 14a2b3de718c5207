//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Room Context: 房间标识
//! - Question Context: 房间内的提问
//! - Capture Context: 音频采集与分段

pub mod capture;
pub mod question;
pub mod room;
