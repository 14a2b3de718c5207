//! Question Context - 提问限界上下文
//!
//! 职责:
//! - 问题聚合（创建后不可变）
//! - 问题文本校验

mod aggregate;
mod errors;

pub use aggregate::Question;
pub use errors::QuestionError;
