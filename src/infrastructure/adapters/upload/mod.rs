//! Upload Adapter - 音频分段上传实现

mod http_uploader;

pub use http_uploader::*;
