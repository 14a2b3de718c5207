//! Question Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("问题内容不能为空")]
    EmptyText,

    #[error("问题内容过长: {0} 字符")]
    TextTooLong(usize),
}
