//! Capture Adapters - 音频采集适配器
//!
//! - `WavFileSource`: 以实时速度回放 WAV 文件作为输入设备
//! - `FakeAudioSource`: 按需推送合成样本，用于测试
//! - `WebmOpusRecorder`: Opus 编码 + WebM 封装的录音器

mod fake_source;
mod wav_file_source;
mod webm;
mod webm_recorder;

pub use fake_source::{FakeAudioSource, FakeAudioStream};
pub use wav_file_source::WavFileSource;
pub use webm_recorder::{WebmOpusRecorder, WebmOpusRecorderFactory};
