//! Fake Audio Source - 用于测试的音频源
//!
//! 不访问任何设备，样本由调用方按需推送

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{AudioSourcePort, AudioStream, CaptureError};
use crate::domain::capture::{CaptureConstraints, StreamFormat};

/// Fake 输入流
pub struct FakeAudioStream {
    format: StreamFormat,
    buffer: Mutex<Vec<i16>>,
    closed: AtomicBool,
}

impl FakeAudioStream {
    fn new(format: StreamFormat) -> Self {
        Self {
            format,
            buffer: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// 推送交错 PCM 样本
    pub fn push_samples(&self, samples: &[i16]) {
        if self.is_closed() {
            return;
        }
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.extend_from_slice(samples);
    }

    /// 推送一段正弦音
    pub fn push_tone(&self, duration_ms: u64, frequency_hz: f32) {
        let frames = (self.format.sample_rate as u64 * duration_ms / 1000) as usize;
        let channels = self.format.channels as usize;
        let rate = self.format.sample_rate as f32;

        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            let t = i as f32 / rate;
            let value = (t * frequency_hz * std::f32::consts::TAU).sin() * 0.3;
            let sample = (value * i16::MAX as f32) as i16;
            samples.extend(std::iter::repeat(sample).take(channels));
        }
        self.push_samples(&samples);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }
}

impl AudioStream for FakeAudioStream {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn take_samples(&self) -> Vec<i16> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buffer)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Fake 音频源
///
/// 每次 open 都返回同一个流，测试可通过 `stream()` 推送样本
pub struct FakeAudioSource {
    supported: bool,
    deny_permission: bool,
    stream: Arc<FakeAudioStream>,
    open_count: AtomicUsize,
    last_constraints: Mutex<Option<CaptureConstraints>>,
}

impl FakeAudioSource {
    pub fn new(format: StreamFormat) -> Self {
        Self {
            supported: true,
            deny_permission: false,
            stream: Arc::new(FakeAudioStream::new(format)),
            open_count: AtomicUsize::new(0),
            last_constraints: Mutex::new(None),
        }
    }

    /// 44.1kHz 单声道
    pub fn mono() -> Self {
        Self::new(StreamFormat {
            sample_rate: 44_100,
            channels: 1,
        })
    }

    /// 能力检测失败
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// 打开时拒绝授权
    pub fn denying_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    pub fn stream(&self) -> Arc<FakeAudioStream> {
        self.stream.clone()
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<CaptureConstraints> {
        *self.last_constraints.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AudioSourcePort for FakeAudioSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Arc<dyn AudioStream>, CaptureError> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock().unwrap_or_else(|e| e.into_inner()) = Some(*constraints);

        if self.deny_permission {
            return Err(CaptureError::PermissionDenied(
                "fake source denied access".to_string(),
            ));
        }

        self.stream.reopen();
        Ok(self.stream.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_take_samples_drains_buffer() {
        let source = FakeAudioSource::mono();
        let stream = source.open(&CaptureConstraints::default()).await.unwrap();

        source.stream().push_samples(&[1, 2, 3]);
        assert_eq!(stream.take_samples(), vec![1, 2, 3]);
        assert!(stream.take_samples().is_empty());
    }

    #[tokio::test]
    async fn test_push_tone_length() {
        let source = FakeAudioSource::mono();
        let stream = source.open(&CaptureConstraints::default()).await.unwrap();

        source.stream().push_tone(100, 440.0);
        assert_eq!(stream.take_samples().len(), 4410);
    }

    #[tokio::test]
    async fn test_closed_stream_ignores_pushes() {
        let source = FakeAudioSource::mono();
        let stream = source.open(&CaptureConstraints::default()).await.unwrap();

        stream.close();
        source.stream().push_samples(&[1, 2, 3]);
        assert!(stream.take_samples().is_empty());
    }

    #[tokio::test]
    async fn test_denied_permission() {
        let source = FakeAudioSource::mono().denying_permission();
        let result = source.open(&CaptureConstraints::default()).await;

        assert!(matches!(result, Err(CaptureError::PermissionDenied(_))));
        assert_eq!(source.open_count(), 1);
        assert_eq!(source.last_constraints(), Some(CaptureConstraints::default()));
    }
}
