//! Capture Context - 音频采集限界上下文
//!
//! 职责:
//! - 采集参数（约束、编码选项、分段间隔）
//! - 录音器与会话状态
//! - 待上传的音频分段

mod segment;
mod value_objects;

pub use segment::{AudioSegment, SEGMENT_FILE_NAME, SEGMENT_FORM_FIELD};
pub use value_objects::{
    CaptureConstraints, RecorderOptions, RecorderState, SegmentationPolicy, SessionState,
    StreamFormat,
};
