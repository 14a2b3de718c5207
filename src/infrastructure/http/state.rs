//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateQuestionHandler, UploadAudioChunkHandler,
    // Query handlers
    GetRoomQuestionsHandler,
    // Ports
    AudioChunkRepositoryPort, ChunkStoragePort, QuestionRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub question_repo: Arc<dyn QuestionRepositoryPort>,
    pub chunk_repo: Arc<dyn AudioChunkRepositoryPort>,
    pub chunk_storage: Arc<dyn ChunkStoragePort>,

    // ========== Command Handlers ==========
    pub create_question_handler: CreateQuestionHandler,
    pub upload_audio_handler: UploadAudioChunkHandler,

    // ========== Query Handlers ==========
    pub get_room_questions_handler: GetRoomQuestionsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        question_repo: Arc<dyn QuestionRepositoryPort>,
        chunk_repo: Arc<dyn AudioChunkRepositoryPort>,
        chunk_storage: Arc<dyn ChunkStoragePort>,
    ) -> Self {
        Self {
            // Ports
            question_repo: question_repo.clone(),
            chunk_repo: chunk_repo.clone(),
            chunk_storage: chunk_storage.clone(),

            // Command handlers
            create_question_handler: CreateQuestionHandler::new(question_repo.clone()),
            upload_audio_handler: UploadAudioChunkHandler::new(chunk_storage, chunk_repo),

            // Query handlers
            get_room_questions_handler: GetRoomQuestionsHandler::new(question_repo),
        }
    }
}
