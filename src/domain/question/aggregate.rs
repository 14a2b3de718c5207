//! Question Context - Aggregate Root

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::QuestionError;
use crate::domain::room::RoomId;

const MAX_QUESTION_LEN: usize = 2000;

/// Question 聚合根
///
/// 不变量:
/// - 必须属于且只属于一个房间
/// - 问题文本非空
/// - 创建后不可修改；答案由外部流程写入存储
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: String,
    room_id: RoomId,
    question: String,
    answer: Option<String>,
    created_at: DateTime<Utc>,
}

impl Question {
    /// 创建新问题（答案为空）
    pub fn new(room_id: RoomId, question: impl Into<String>) -> Result<Self, QuestionError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let len = question.chars().count();
        if len > MAX_QUESTION_LEN {
            return Err(QuestionError::TextTooLong(len));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            room_id,
            question,
            answer: None,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let room = RoomId::new("r1").unwrap();
        let question = Question::new(room.clone(), "  What is X?  ").unwrap();

        assert_eq!(question.question(), "What is X?");
        assert_eq!(question.room_id(), &room);
        assert!(question.answer().is_none());
        assert!(!question.id().is_empty());
    }

    #[test]
    fn test_empty_question_rejected() {
        let room = RoomId::new("r1").unwrap();
        assert_eq!(Question::new(room, " \n"), Err(QuestionError::EmptyText));
    }
}
