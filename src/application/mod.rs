//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、ChunkStorage、AudioCapture、SegmentUploader）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - recording: 录音会话状态机（分段轮换与上传）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod recording;

// Re-exports
pub use commands::{
    // Question commands
    CreateQuestion,
    // Audio commands
    UploadAudioChunk,
    // Handlers
    handlers::{
        CreateQuestionHandler, CreateQuestionResponse, UploadAudioChunkHandler,
        UploadAudioChunkResponse,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Repositories
    AudioChunkRecord,
    AudioChunkRepositoryPort,
    QuestionRecord,
    QuestionRepositoryPort,
    RepositoryError,
    // Chunk storage
    ChunkStorageError,
    ChunkStoragePort,
    // Audio capture
    AudioSourcePort,
    AudioStream,
    CaptureError,
    Recorder,
    RecorderFactoryPort,
    // Segment uploader
    SegmentUploaderPort,
    UploadError,
};

pub use queries::{
    // Question queries
    GetRoomQuestions,
    // Handlers
    handlers::{GetRoomQuestionsHandler, QuestionView},
};

pub use recording::{RecordingConfig, RecordingSession};
