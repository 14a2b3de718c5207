//! 应用层 - 录音会话
//!
//! 驱动音频源与录音器，按固定间隔切分并上传音频分段

mod session;

pub use session::{RecordingConfig, RecordingSession};
