//! Capture Context - Value Objects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 音频输入约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            sample_rate: 44_100,
        }
    }
}

/// 录音器编码选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderOptions {
    pub mime_type: String,
    pub audio_bits_per_second: u32,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            mime_type: "audio/webm".to_string(),
            audio_bits_per_second: 64_000,
        }
    }
}

/// 输入流的实际格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u8,
}

/// 录音器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Inactive,
    Recording,
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecorderState::Inactive => "inactive",
            RecorderState::Recording => "recording",
        }
    }
}

/// 录音会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
}

/// 分段策略：每隔固定时长重建一次录音器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationPolicy {
    interval: Duration,
}

impl SegmentationPolicy {
    pub fn new(interval: Duration) -> Result<Self, &'static str> {
        if interval.is_zero() {
            return Err("分段间隔必须大于 0");
        }
        Ok(Self { interval })
    }

    pub fn from_millis(millis: u64) -> Result<Self, &'static str> {
        Self::new(Duration::from_millis(millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for SegmentationPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_defaults() {
        let constraints = CaptureConstraints::default();
        assert!(constraints.echo_cancellation);
        assert!(constraints.noise_suppression);
        assert_eq!(constraints.sample_rate, 44_100);

        let options = RecorderOptions::default();
        assert_eq!(options.mime_type, "audio/webm");
        assert_eq!(options.audio_bits_per_second, 64_000);

        assert_eq!(
            SegmentationPolicy::default().interval(),
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(SegmentationPolicy::from_millis(0).is_err());
    }
}
