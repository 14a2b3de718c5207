//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod capture;
pub mod storage;
pub mod upload;

pub use capture::*;
pub use storage::*;
pub use upload::*;
