//! WebM/Opus Recorder - 基于 opus 的录音器
//!
//! start 与 stop 之间从输入流取到的 PCM 被编码为 Opus，
//! stop 时封装成一个独立的 WebM 文件返回

use bytes::Bytes;
use opus::{Application, Bitrate, Channels, Encoder};
use std::sync::Arc;

use super::webm::{mux_opus, OpusTrack};
use crate::application::ports::{AudioStream, CaptureError, Recorder, RecorderFactoryPort};
use crate::domain::capture::{RecorderOptions, RecorderState, StreamFormat};

const OPUS_SAMPLE_RATE: u32 = 48_000;
/// 20ms 帧
const FRAME_MS: u64 = 20;
const MAX_PACKET_SIZE: usize = 4000;

/// WebM/Opus 录音器工厂
#[derive(Debug, Clone, Default)]
pub struct WebmOpusRecorderFactory;

impl WebmOpusRecorderFactory {
    pub fn new() -> Self {
        Self
    }

    /// 是否支持该 mime 类型（`audio/webm` 或 `audio/webm;codecs=opus`）
    pub fn supports_mime_type(mime_type: &str) -> bool {
        let mut parts = mime_type.split(';').map(str::trim);
        let container_ok = parts
            .next()
            .map(|c| c.eq_ignore_ascii_case("audio/webm"))
            .unwrap_or(false);
        let codecs_ok = parts.all(|p| {
            p.strip_prefix("codecs=")
                .map(|c| c.trim_matches('"').eq_ignore_ascii_case("opus"))
                .unwrap_or(true)
        });
        container_ok && codecs_ok
    }
}

impl RecorderFactoryPort for WebmOpusRecorderFactory {
    fn create(
        &self,
        stream: Arc<dyn AudioStream>,
        options: &RecorderOptions,
    ) -> Result<Box<dyn Recorder>, CaptureError> {
        if !Self::supports_mime_type(&options.mime_type) {
            return Err(CaptureError::Unsupported(format!(
                "mime type {} is not supported",
                options.mime_type
            )));
        }
        if options.audio_bits_per_second == 0 {
            return Err(CaptureError::EncodingError(
                "audio bitrate must be positive".to_string(),
            ));
        }
        let format = stream.format();
        if format.channels == 0 || format.channels > 2 || format.sample_rate == 0 {
            return Err(CaptureError::Unsupported(format!(
                "stream format {} Hz / {} channels is not supported",
                format.sample_rate, format.channels
            )));
        }

        Ok(Box::new(WebmOpusRecorder::new(
            stream,
            options.audio_bits_per_second,
        )))
    }
}

/// WebM/Opus 录音器
pub struct WebmOpusRecorder {
    stream: Arc<dyn AudioStream>,
    bitrate: u32,
    state: RecorderState,
}

impl WebmOpusRecorder {
    pub fn new(stream: Arc<dyn AudioStream>, bitrate: u32) -> Self {
        Self {
            stream,
            bitrate,
            state: RecorderState::Inactive,
        }
    }
}

impl Recorder for WebmOpusRecorder {
    fn state(&self) -> RecorderState {
        self.state
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == RecorderState::Recording {
            return Err(CaptureError::InvalidState(
                "recorder already started".to_string(),
            ));
        }
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn stop(&mut self) -> Result<Bytes, CaptureError> {
        if self.state == RecorderState::Inactive {
            return Err(CaptureError::InvalidState(
                "recorder is not recording".to_string(),
            ));
        }
        self.state = RecorderState::Inactive;

        let samples = self.stream.take_samples();
        if samples.is_empty() {
            return Ok(Bytes::new());
        }

        let data = encode_webm(&samples, self.stream.format(), self.bitrate)?;
        Ok(Bytes::from(data))
    }
}

/// 把交错 PCM 编码为 WebM/Opus
fn encode_webm(samples: &[i16], format: StreamFormat, bitrate: u32) -> Result<Vec<u8>, CaptureError> {
    let channel_count = format.channels as usize;
    let channels = if format.channels == 1 {
        Channels::Mono
    } else {
        Channels::Stereo
    };

    let pcm = resample(samples, format.sample_rate, OPUS_SAMPLE_RATE, channel_count);

    let mut encoder = Encoder::new(OPUS_SAMPLE_RATE, channels, Application::Voip)
        .map_err(|e| CaptureError::EncodingError(format!("Failed to create Opus encoder: {}", e)))?;
    encoder
        .set_bitrate(Bitrate::Bits(bitrate as i32))
        .map_err(|e| CaptureError::EncodingError(format!("Failed to set bitrate: {}", e)))?;

    // 编码器 lookahead，作为 pre-skip
    let pre_skip = encoder.get_lookahead().map(|l| l as u16).unwrap_or(312);

    let frame_size = (OPUS_SAMPLE_RATE as u64 * FRAME_MS / 1000) as usize;
    let samples_per_frame = frame_size * channel_count;
    // 额外的静音帧把 lookahead 中的样本冲出来
    let flush_frames = (pre_skip as usize + frame_size - 1) / frame_size;

    let mut packets = Vec::with_capacity(pcm.len() / samples_per_frame + flush_frames + 1);
    let mut output = vec![0u8; MAX_PACKET_SIZE];

    let silence = vec![0i16; samples_per_frame];
    let frames = pcm
        .chunks(samples_per_frame)
        .map(|chunk| {
            if chunk.len() < samples_per_frame {
                let mut padded = chunk.to_vec();
                padded.resize(samples_per_frame, 0);
                padded
            } else {
                chunk.to_vec()
            }
        })
        .chain(std::iter::repeat(silence).take(flush_frames));

    for frame in frames {
        let len = encoder
            .encode(&frame, &mut output)
            .map_err(|e| CaptureError::EncodingError(format!("Opus encode failed: {}", e)))?;
        packets.push(output[..len].to_vec());
    }

    Ok(mux_opus(&OpusTrack {
        channels: format.channels,
        pre_skip,
        frame_ms: FRAME_MS,
        packets: &packets,
    }))
}

/// 线性插值重采样（交错样本）
fn resample(samples: &[i16], from_rate: u32, to_rate: u32, channels: usize) -> Vec<i16> {
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

            let s0 = samples.get(idx0).copied().unwrap_or(0) as f64;
            let s1 = samples.get(idx1).copied().unwrap_or(0) as f64;
            resampled.push((s0 + (s1 - s0) * frac) as i16);
        }
    }

    resampled
}
