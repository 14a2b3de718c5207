//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::RecordingConfig;
use crate::domain::capture::{CaptureConstraints, RecorderOptions, SegmentationPolicy};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 录音客户端配置
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3333
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/roomqa.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音频分段存储目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 10MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 录音客户端配置
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    /// 后端地址
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// 分段间隔（毫秒）
    #[serde(default = "default_segment_interval_ms")]
    pub segment_interval_ms: u64,

    /// 录音器输出格式
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// 编码比特率（bps）
    #[serde(default = "default_audio_bits_per_second")]
    pub audio_bits_per_second: u32,

    /// 采集采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_true")]
    pub echo_cancellation: bool,

    #[serde(default = "default_true")]
    pub noise_suppression: bool,

    /// 上传超时时间（秒）
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_segment_interval_ms() -> u64 {
    5000
}

fn default_mime_type() -> String {
    "audio/webm".to_string()
}

fn default_audio_bits_per_second() -> u32 {
    64000
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_true() -> bool {
    true
}

fn default_upload_timeout() -> u64 {
    30
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            segment_interval_ms: default_segment_interval_ms(),
            mime_type: default_mime_type(),
            audio_bits_per_second: default_audio_bits_per_second(),
            sample_rate: default_sample_rate(),
            echo_cancellation: default_true(),
            noise_suppression: default_true(),
            upload_timeout_secs: default_upload_timeout(),
        }
    }
}

impl RecorderConfig {
    /// 转换为录音会话配置
    pub fn recording_config(&self) -> RecordingConfig {
        RecordingConfig {
            constraints: CaptureConstraints {
                echo_cancellation: self.echo_cancellation,
                noise_suppression: self.noise_suppression,
                sample_rate: self.sample_rate,
            },
            recorder_options: RecorderOptions {
                mime_type: self.mime_type.clone(),
                audio_bits_per_second: self.audio_bits_per_second,
            },
            // 间隔为 0 已在加载时拒绝
            segmentation: SegmentationPolicy::from_millis(self.segment_interval_ms)
                .unwrap_or_default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3333);
        assert_eq!(config.database.path, "data/roomqa.db");
        assert_eq!(config.storage.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.recorder.segment_interval_ms, 5000);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/roomqa.db?mode=rwc");
    }

    #[test]
    fn test_recording_config_matches_capture_defaults() {
        let recording = RecorderConfig::default().recording_config();
        assert_eq!(recording.constraints, CaptureConstraints::default());
        assert_eq!(recording.recorder_options, RecorderOptions::default());
        assert_eq!(recording.segmentation.interval(), Duration::from_millis(5000));
    }
}
