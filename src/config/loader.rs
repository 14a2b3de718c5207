//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ROOMQA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `ROOMQA_SERVER__PORT=8080`
/// - `ROOMQA_DATABASE__PATH=/data/roomqa.db`
/// - `ROOMQA_RECORDER__SERVER_URL=http://backend:3333`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3333)?
        .set_default("database.path", "data/roomqa.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.audio_dir", "data/audio")?
        .set_default("storage.max_upload_size", 10 * 1024 * 1024)?
        .set_default("recorder.server_url", "http://localhost:3333")?
        .set_default("recorder.segment_interval_ms", 5000)?
        .set_default("recorder.mime_type", "audio/webm")?
        .set_default("recorder.audio_bits_per_second", 64000)?
        .set_default("recorder.sample_rate", 44100)?
        .set_default("recorder.echo_cancellation", true)?
        .set_default("recorder.noise_suppression", true)?
        .set_default("recorder.upload_timeout_secs", 30)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: ROOMQA_RECORDER__SEGMENT_INTERVAL_MS=3000
    builder = builder.add_source(
        Environment::with_prefix("ROOMQA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    let recorder = &config.recorder;
    if recorder.server_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Recorder server URL cannot be empty".to_string(),
        ));
    }

    if recorder.segment_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Segment interval cannot be 0".to_string(),
        ));
    }

    if recorder.audio_bits_per_second == 0 {
        return Err(ConfigError::ValidationError(
            "Recorder bitrate cannot be 0".to_string(),
        ));
    }

    if recorder.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Capture sample rate cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("Max Upload Size: {} bytes", config.storage.max_upload_size);
    tracing::info!("Recorder Server URL: {}", config.recorder.server_url);
    tracing::info!(
        "Recorder: {} @ {}bps, {}Hz, segment {}ms",
        config.recorder.mime_type,
        config.recorder.audio_bits_per_second,
        config.recorder.sample_rate,
        config.recorder.segment_interval_ms
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_interval() {
        let mut config = AppConfig::default();
        config.recorder.segment_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_bitrate_or_rate() {
        let mut config = AppConfig::default();
        config.recorder.audio_bits_per_second = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.recorder.sample_rate = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_server_url() {
        let mut config = AppConfig::default();
        config.recorder.server_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 4000\n\n[recorder]\nsegment_interval_ms = 2500"
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.recorder.segment_interval_ms, 2500);
        assert_eq!(config.recorder.mime_type, "audio/webm");
        assert_eq!(config.database.path, "data/roomqa.db");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[recorder]\nsegment_interval_ms = 0").unwrap();

        let result = load_config_from_path(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
