//! Audio Capture Port - 音频采集抽象
//!
//! 把音频输入设备与录音编码器隔离在端口之后：
//! - `AudioSourcePort`: 能力检测 + 按约束打开输入流
//! - `AudioStream`: 持续采集的 PCM 流
//! - `RecorderFactoryPort` / `Recorder`: 绑定到流上的一次性编码器

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::capture::{CaptureConstraints, RecorderOptions, RecorderState, StreamFormat};

/// 采集错误
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Audio recording is not supported: {0}")]
    Unsupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid recorder state: {0}")]
    InvalidState(String),
}

/// 音频输入源
#[async_trait]
pub trait AudioSourcePort: Send + Sync {
    /// 能力检测：当前运行环境能否录音
    fn is_supported(&self) -> bool;

    /// 按约束打开输入流（可能等待授权）
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Arc<dyn AudioStream>, CaptureError>;
}

/// 已打开的输入流
///
/// 流在打开后持续采集，`take_samples` 取走自上次调用以来的所有样本
pub trait AudioStream: Send + Sync {
    /// 流的实际格式
    fn format(&self) -> StreamFormat;

    /// 取走已采集的交错 PCM 样本
    fn take_samples(&self) -> Vec<i16>;

    /// 释放输入设备
    fn close(&self) {}
}

/// 录音器：绑定到一个流，start 之后到 stop 之间的音频编码为一个独立容器
pub trait Recorder: Send {
    fn state(&self) -> RecorderState;

    fn start(&mut self) -> Result<(), CaptureError>;

    /// 停止并刷新缓冲区，返回编码后的数据（可能为空）
    fn stop(&mut self) -> Result<Bytes, CaptureError>;
}

/// 录音器工厂
pub trait RecorderFactoryPort: Send + Sync {
    fn create(
        &self,
        stream: Arc<dyn AudioStream>,
        options: &RecorderOptions,
    ) -> Result<Box<dyn Recorder>, CaptureError>;
}
