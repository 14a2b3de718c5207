//! SQLite Question Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{ensure_room, format_timestamp, DbPool};
use crate::application::ports::{QuestionRecord, QuestionRepositoryPort, RepositoryError};

/// SQLite Question Repository
pub struct SqliteQuestionRepository {
    pool: DbPool,
}

impl SqliteQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct QuestionRow {
    id: String,
    room_id: String,
    question: String,
    answer: Option<String>,
    created_at: String,
}

impl TryFrom<QuestionRow> for QuestionRecord {
    type Error = RepositoryError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(QuestionRecord {
            id: row.id,
            room_id: row.room_id,
            question: row.question,
            answer: row.answer,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl QuestionRepositoryPort for SqliteQuestionRepository {
    async fn save(&self, question: &QuestionRecord) -> Result<(), RepositoryError> {
        let created_at = format_timestamp(&question.created_at);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        ensure_room(&mut *tx, &question.room_id, &created_at)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO questions (id, room_id, question, answer, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&question.id)
        .bind(&question.room_id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(question.id.clone())
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        })?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_room(&self, room_id: &str) -> Result<Vec<QuestionRecord>, RepositoryError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, room_id, question, answer, created_at
            FROM questions
            WHERE room_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(QuestionRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::TimeZone;

    async fn setup() -> SqliteQuestionRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteQuestionRepository::new(pool)
    }

    fn record(id: &str, room_id: &str, question: &str, answer: Option<&str>, secs: i64) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            room_id: room_id.to_string(),
            question: question.to_string(),
            answer: answer.map(str::to_string),
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_empty_room_returns_empty_list() {
        let repo = setup().await;
        let questions = repo.find_by_room("missing").await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_questions_newest_first() {
        let repo = setup().await;

        // 插入顺序与时间顺序不同
        repo.save(&record("q2", "r1", "second", None, 20)).await.unwrap();
        repo.save(&record("q1", "r1", "first", Some("a1"), 10)).await.unwrap();
        repo.save(&record("q3", "r1", "third", None, 30)).await.unwrap();
        repo.save(&record("other", "r2", "elsewhere", None, 40)).await.unwrap();

        let questions = repo.find_by_room("r1").await.unwrap();
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q3", "q2", "q1"]);
        assert!(questions
            .windows(2)
            .all(|w| w[0].created_at > w[1].created_at));
        assert_eq!(questions[2].answer.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = setup().await;
        repo.save(&record("q1", "r1", "first", None, 10)).await.unwrap();

        let result = repo.save(&record("q1", "r1", "again", None, 20)).await;
        assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_sub_second_ordering() {
        let repo = setup().await;
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let mut early = record("early", "r1", "early", None, 0);
        early.created_at = base + chrono::Duration::milliseconds(100);
        let mut late = record("late", "r1", "late", None, 0);
        late.created_at = base + chrono::Duration::milliseconds(900);

        repo.save(&late).await.unwrap();
        repo.save(&early).await.unwrap();

        let questions = repo.find_by_room("r1").await.unwrap();
        assert_eq!(questions[0].id, "late");
        assert_eq!(questions[1].id, "early");
        assert_eq!(questions[0].created_at, late.created_at);
    }
}
