//! HTTP Routes
//!
//! API Endpoints:
//! - /health                  GET   健康检查
//! - /rooms/:id/questions     GET   房间问题列表（按创建时间倒序）
//! - /rooms/:id/questions     POST  提交问题
//! - /rooms/:id/audio         POST  上传音频分段（multipart，字段 file）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/rooms", room_routes())
}

/// Room 路由
fn room_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:room_id/questions",
            get(handlers::list_room_questions).post(handlers::create_question),
        )
        .route("/:room_id/audio", post(handlers::upload_audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use tower::util::ServiceExt;

    use crate::application::{
        AudioChunkRepositoryPort, QuestionRecord, QuestionRepositoryPort, RepositoryError,
    };
    use crate::infrastructure::adapters::FileChunkStorage;
    use crate::infrastructure::http::build_router;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteAudioChunkRepository,
        SqliteQuestionRepository,
    };

    const BOUNDARY: &str = "roomqa-test-boundary";

    struct TestApp {
        router: Router,
        question_repo: Arc<SqliteQuestionRepository>,
        chunk_repo: Arc<SqliteAudioChunkRepository>,
        _audio_dir: tempfile::TempDir,
    }

    async fn setup() -> TestApp {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let audio_dir = tempfile::tempdir().unwrap();
        let question_repo = Arc::new(SqliteQuestionRepository::new(pool.clone()));
        let chunk_repo = Arc::new(SqliteAudioChunkRepository::new(pool));
        let storage = Arc::new(FileChunkStorage::new(audio_dir.path()).await.unwrap());

        let state = AppState::new(question_repo.clone(), chunk_repo.clone(), storage);

        TestApp {
            router: build_router(Arc::new(state), 1024 * 1024),
            question_repo,
            chunk_repo,
            _audio_dir: audio_dir,
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"audio.webm\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: audio/webm\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(room_id: &str, field: &str, data: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/rooms/{}/audio", room_id))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, data)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup().await;
        let response = app
            .router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_questions_newest_first() {
        let app = setup().await;
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();

        for (id, question, answer, created_at) in [
            ("q1", "What is X?", Some("Y"), t1),
            ("q2", "What is Z?", None, t2),
        ] {
            app.question_repo
                .save(&QuestionRecord {
                    id: id.to_string(),
                    room_id: "r1".to_string(),
                    question: question.to_string(),
                    answer: answer.map(str::to_string),
                    created_at,
                })
                .await
                .unwrap();
        }

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/rooms/r1/questions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!([
                {
                    "id": "q2",
                    "question": "What is Z?",
                    "answer": null,
                    "createdAt": "2024-05-01T11:00:00.000Z"
                },
                {
                    "id": "q1",
                    "question": "What is X?",
                    "answer": "Y",
                    "createdAt": "2024-05-01T10:00:00.000Z"
                }
            ])
        );
    }

    #[tokio::test]
    async fn test_unknown_room_returns_empty_array() {
        let app = setup().await;
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/rooms/nobody-here/questions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_question() {
        let app = setup().await;
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rooms/r1/questions")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"question":"  Why?  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let question_id = json["questionId"].as_str().unwrap().to_string();

        let stored = app.question_repo.find_by_room("r1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, question_id);
        assert_eq!(stored[0].question, "Why?");
        assert!(stored[0].answer.is_none());
    }

    #[tokio::test]
    async fn test_create_empty_question_rejected() {
        let app = setup().await;
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rooms/r1/questions")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"question":"   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_audio_chunk() {
        let app = setup().await;
        let payload = b"\x1A\x45\xDF\xA3fake-webm-bytes";

        let response = app
            .router
            .oneshot(upload_request("r1", "file", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let chunk_id = json["chunkId"].as_str().unwrap().to_string();

        let chunks = app.chunk_repo.find_by_room("r1").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id.to_string(), chunk_id);
        assert_eq!(chunks[0].size_bytes, payload.len() as u64);
        assert_eq!(chunks[0].mime_type, "audio/webm");

        let stored = tokio::fs::read(&chunks[0].file_path).await.unwrap();
        assert_eq!(stored, payload);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_rejected() {
        let app = setup().await;
        let response = app
            .router
            .oneshot(upload_request("r1", "other", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.chunk_repo.find_by_room("r1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_unsafe_room_rejected() {
        let app = setup().await;
        let response = app
            .router
            .oneshot(upload_request("r1..x", "file", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    struct FailingQuestionRepository;

    #[async_trait::async_trait]
    impl QuestionRepositoryPort for FailingQuestionRepository {
        async fn save(&self, _question: &QuestionRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::DatabaseError("database is locked".to_string()))
        }

        async fn find_by_room(&self, _room_id: &str) -> Result<Vec<QuestionRecord>, RepositoryError> {
            Err(RepositoryError::DatabaseError("database is locked".to_string()))
        }
    }

    async fn get_questions(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_long_room_id_lists_empty() {
        let app = setup().await;
        let uri = format!("/rooms/{}/questions", "x".repeat(200));

        let (status, json) = get_questions(app.router, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_room_id_matched_verbatim() {
        let app = setup().await;
        app.question_repo
            .save(&QuestionRecord {
                id: "q1".to_string(),
                room_id: "r1".to_string(),
                question: "What is X?".to_string(),
                answer: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let (status, json) = get_questions(app.router.clone(), "/rooms/%20r1/questions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));

        let (_, json) = get_questions(app.router, "/rooms/r1/questions").await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_storage_failure_returns_500() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let audio_dir = tempfile::tempdir().unwrap();

        let state = AppState::new(
            Arc::new(FailingQuestionRepository),
            Arc::new(SqliteAudioChunkRepository::new(pool)),
            Arc::new(FileChunkStorage::new(audio_dir.path()).await.unwrap()),
        );
        let router = build_router(Arc::new(state), 1024 * 1024);

        let (status, json) = get_questions(router, "/rooms/r1/questions").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({ "error": "Internal server error" }));
    }
}
