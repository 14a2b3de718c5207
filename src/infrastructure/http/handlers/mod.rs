//! HTTP Handlers

mod audio;
mod health;
mod question;

pub use audio::*;
pub use health::*;
pub use question::*;
