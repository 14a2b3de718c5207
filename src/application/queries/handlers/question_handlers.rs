//! Question Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{QuestionRecord, QuestionRepositoryPort};
use crate::application::queries::GetRoomQuestions;

// ============================================================================
// Response DTOs
// ============================================================================

/// 问题列表项
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub id: String,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<QuestionRecord> for QuestionView {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            question: record.question,
            answer: record.answer,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetRoomQuestions Handler
pub struct GetRoomQuestionsHandler {
    question_repo: Arc<dyn QuestionRepositoryPort>,
}

impl GetRoomQuestionsHandler {
    pub fn new(question_repo: Arc<dyn QuestionRepositoryPort>) -> Self {
        Self { question_repo }
    }

    pub async fn handle(
        &self,
        query: GetRoomQuestions,
    ) -> Result<Vec<QuestionView>, ApplicationError> {
        if query.room_id.is_empty() {
            return Err(ApplicationError::validation("Room id cannot be empty"));
        }

        let questions = self.question_repo.find_by_room(&query.room_id).await?;

        tracing::debug!(
            room_id = %query.room_id,
            count = questions.len(),
            "Room questions loaded"
        );

        Ok(questions.into_iter().map(QuestionView::from).collect())
    }
}
