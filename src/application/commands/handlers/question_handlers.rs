//! Question Command Handlers

use std::sync::Arc;

use crate::application::commands::CreateQuestion;
use crate::application::error::ApplicationError;
use crate::application::ports::{QuestionRecord, QuestionRepositoryPort};
use crate::domain::question::Question;

// ============================================================================
// CreateQuestion
// ============================================================================

/// 创建问题响应
#[derive(Debug, Clone)]
pub struct CreateQuestionResponse {
    pub question_id: String,
}

/// CreateQuestion Handler
pub struct CreateQuestionHandler {
    question_repo: Arc<dyn QuestionRepositoryPort>,
}

impl CreateQuestionHandler {
    pub fn new(question_repo: Arc<dyn QuestionRepositoryPort>) -> Self {
        Self { question_repo }
    }

    pub async fn handle(
        &self,
        command: CreateQuestion,
    ) -> Result<CreateQuestionResponse, ApplicationError> {
        let question = Question::new(command.room_id, command.question)?;

        let record = QuestionRecord {
            id: question.id().to_string(),
            room_id: question.room_id().to_string(),
            question: question.question().to_string(),
            answer: question.answer().map(str::to_string),
            created_at: question.created_at(),
        };

        self.question_repo.save(&record).await?;

        tracing::info!(
            question_id = %record.id,
            room_id = %record.room_id,
            "Question created"
        );

        Ok(CreateQuestionResponse {
            question_id: record.id,
        })
    }
}
