//! WAV File Source - 把 WAV 文件当作实时输入设备
//!
//! 打开时用 symphonia 解码整个文件，之后按墙钟时间逐步"采集"，
//! 与麦克风一样，流打开后音频持续产生，不等待录音器

use async_trait::async_trait;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::time::Instant;

use crate::application::ports::{AudioSourcePort, AudioStream, CaptureError};
use crate::domain::capture::{CaptureConstraints, StreamFormat};

/// WAV 文件音频源
pub struct WavFileSource {
    path: PathBuf,
}

impl WavFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl AudioSourcePort for WavFileSource {
    fn is_supported(&self) -> bool {
        self.path.is_file()
    }

    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Arc<dyn AudioStream>, CaptureError> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => CaptureError::DeviceError(format!("{}: {}", self.path.display(), e)),
        })?;

        let decoded = tokio::task::spawn_blocking(move || decode_wav(&data))
            .await
            .map_err(|e| CaptureError::DeviceError(format!("Decoder task failed: {}", e)))??;

        // 文件输入没有回声和噪声，处理开关只记录下来
        tracing::debug!(
            path = %self.path.display(),
            echo_cancellation = constraints.echo_cancellation,
            noise_suppression = constraints.noise_suppression,
            source_rate = decoded.sample_rate,
            target_rate = constraints.sample_rate,
            channels = decoded.channels,
            "Opening WAV file as audio input"
        );

        let (samples, channels) = if decoded.channels > 2 {
            (downmix(&decoded.samples, decoded.channels as usize), 1)
        } else {
            (decoded.samples, decoded.channels)
        };

        let target_rate = if constraints.sample_rate > 0 {
            constraints.sample_rate
        } else {
            decoded.sample_rate
        };
        let samples = resample(&samples, decoded.sample_rate, target_rate, channels as usize);
        let pcm: Vec<i16> = samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();

        Ok(Arc::new(WavFileStream::new(
            StreamFormat {
                sample_rate: target_rate,
                channels,
            },
            pcm,
        )))
    }
}

/// 按实时速度放出样本的流
pub struct WavFileStream {
    format: StreamFormat,
    samples: Vec<i16>,
    started: Instant,
    cursor: Mutex<usize>,
    closed: AtomicBool,
}

impl WavFileStream {
    fn new(format: StreamFormat, samples: Vec<i16>) -> Self {
        Self {
            format,
            samples,
            started: Instant::now(),
            cursor: Mutex::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

impl AudioStream for WavFileStream {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn take_samples(&self) -> Vec<i16> {
        if self.closed.load(Ordering::SeqCst) {
            return Vec::new();
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let frames = (elapsed * self.format.sample_rate as f64) as usize;
        let available = (frames * self.format.channels as usize).min(self.samples.len());

        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if available <= *cursor {
            return Vec::new();
        }
        let chunk = self.samples[*cursor..available].to_vec();
        *cursor = available;
        chunk
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u8,
}

/// 使用 symphonia 解码 WAV 获取 PCM 数据
fn decode_wav(data: &[u8]) -> Result<DecodedAudio, CaptureError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CaptureError::DeviceError(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| CaptureError::DeviceError("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| CaptureError::DeviceError("Unknown sample rate".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u8)
        .ok_or_else(|| CaptureError::DeviceError("Unknown channel count".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CaptureError::DeviceError(format!("Decoder creation failed: {}", e)))?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(CaptureError::DeviceError(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let actual = num_frames * spec.channels.count();
        samples.extend(&sample_buf.samples()[..actual]);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// 简单线性重采样
fn resample(samples: &[f32], from_rate: u32, to_rate: u32, channels: usize) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let frame_count = samples.len() / channels;
    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_frame_count * channels);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channels {
            let idx0 = src_idx * channels + ch;
            let idx1 = (src_idx + 1).min(frame_count - 1) * channels + ch;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);
            resampled.push(s0 + (s1 - s0) * frac as f32);
        }
    }

    resampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    /// 1 秒 16kHz 单声道 16 位静音
    fn create_test_wav() -> Vec<u8> {
        let sample_rate: u32 = 16000;
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let num_samples = sample_rate as usize;
        let data_size = num_samples * 2;

        let mut wav = Vec::with_capacity(44 + data_size);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&bits_per_sample.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        wav.extend(std::iter::repeat(0u8).take(data_size));
        wav
    }

    #[test]
    fn test_missing_file_is_unsupported() {
        let source = WavFileSource::new("/nonexistent/input.wav");
        assert!(!source.is_supported());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_paced_in_real_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.wav");
        std::fs::write(&path, create_test_wav()).unwrap();

        let source = WavFileSource::new(&path);
        assert!(source.is_supported());

        let stream = source.open(&CaptureConstraints::default()).await.unwrap();
        assert_eq!(
            stream.format(),
            StreamFormat {
                sample_rate: 44_100,
                channels: 1
            }
        );

        tokio::time::advance(Duration::from_millis(500)).await;
        let first = stream.take_samples().len();
        assert!((22_000..=22_100).contains(&first));

        // 文件只有 1 秒，之后不再产生样本
        tokio::time::advance(Duration::from_secs(2)).await;
        let rest = stream.take_samples().len();
        assert!(first + rest <= 44_100);
        assert!(stream.take_samples().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_device_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not a wav file").unwrap();

        let result = WavFileSource::new(&path)
            .open(&CaptureConstraints::default())
            .await;
        assert!(matches!(result, Err(CaptureError::DeviceError(_))));
    }
}
