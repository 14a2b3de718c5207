//! SQLite Persistence - SQLite 数据库持久化实现

mod audio_chunk_repo;
mod database;
mod question_repo;

pub use audio_chunk_repo::*;
pub use database::*;
pub use question_repo::*;
