//! Data Transfer Objects

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::application::{CreateQuestionResponse, QuestionView, UploadAudioChunkResponse};

// ============================================================================
// Question DTOs
// ============================================================================

/// 问题列表项
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: String,
}

impl From<QuestionView> for QuestionResponse {
    fn from(view: QuestionView) -> Self {
        Self {
            id: view.id,
            question: view.question,
            answer: view.answer,
            created_at: view.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionResult {
    pub question_id: String,
}

impl From<CreateQuestionResponse> for CreateQuestionResult {
    fn from(response: CreateQuestionResponse) -> Self {
        Self {
            question_id: response.question_id,
        }
    }
}

// ============================================================================
// Audio DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAudioResult {
    pub chunk_id: String,
}

impl From<UploadAudioChunkResponse> for UploadAudioResult {
    fn from(response: UploadAudioChunkResponse) -> Self {
        Self {
            chunk_id: response.chunk_id.to_string(),
        }
    }
}
