//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_capture;
mod chunk_storage;
mod repositories;
mod segment_uploader;

pub use audio_capture::{
    AudioSourcePort, AudioStream, CaptureError, Recorder, RecorderFactoryPort,
};
pub use chunk_storage::{ChunkStorageError, ChunkStoragePort};
pub use repositories::{
    AudioChunkRecord, AudioChunkRepositoryPort, QuestionRecord, QuestionRepositoryPort,
    RepositoryError,
};
pub use segment_uploader::{SegmentUploaderPort, UploadError};
