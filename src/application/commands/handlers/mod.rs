//! Command Handlers 实现

mod audio_handlers;
mod question_handlers;

pub use audio_handlers::*;
pub use question_handlers::*;
