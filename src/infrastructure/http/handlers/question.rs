//! Question HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::{CreateQuestion, GetRoomQuestions};
use crate::domain::room::RoomId;
use crate::infrastructure::http::dto::{CreateQuestionRequest, CreateQuestionResult, QuestionResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 房间问题列表，按创建时间倒序；房间不存在时返回空数组
pub async fn list_room_questions(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = state
        .get_room_questions_handler
        .handle(GetRoomQuestions { room_id })
        .await?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

/// 提交问题，答案由外部流程异步填充
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<CreateQuestionResult>), ApiError> {
    let room_id = RoomId::new(room_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = state
        .create_question_handler
        .handle(CreateQuestion {
            room_id,
            question: req.question,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(response.into())))
}
