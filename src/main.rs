//! RoomQA - 房间问答系统
//!
//! - `roomqa serve`: 启动后端（问题列表、问题提交、音频分段接收）
//! - `roomqa record`: 启动采集客户端，按固定间隔切分音频并上传

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use roomqa::application::RecordingSession;
use roomqa::config::{load_config, load_config_from_path, print_config, AppConfig, LogConfig};
use roomqa::domain::room::RoomId;
use roomqa::infrastructure::adapters::{
    FileChunkStorage, HttpSegmentUploader, HttpSegmentUploaderConfig, WavFileSource,
    WebmOpusRecorderFactory,
};
use roomqa::infrastructure::http::{AppState, HttpServer, ServerConfig};
use roomqa::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteAudioChunkRepository,
    SqliteQuestionRepository,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Room-based Q&A backend and audio capture client")]
struct Cli {
    /// Path to config file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP backend
    Serve,
    /// Capture audio for a room and upload it in fixed-duration segments
    Record {
        /// Room id to upload segments to
        #[arg(short, long)]
        room: String,

        /// WAV file replayed as the live input
        #[arg(short, long)]
        input: PathBuf,

        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Backend base URL (overrides config file)
        #[arg(short, long)]
        server_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match cli.config.as_deref() {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    print_config(&config);

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Record {
            room,
            input,
            duration_secs,
            server_url,
        } => record(config, room, input, duration_secs, server_url).await,
    }
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},roomqa={},tower_http=debug", log.level, log.level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("RoomQA backend");

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 与存储适配器
    let question_repo = Arc::new(SqliteQuestionRepository::new(pool.clone()));
    let chunk_repo = Arc::new(SqliteAudioChunkRepository::new(pool));
    let chunk_storage = Arc::new(FileChunkStorage::new(&config.storage.audio_dir).await?);

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_body_limit(config.storage.max_upload_size as usize);
    let state = AppState::new(question_repo, chunk_repo, chunk_storage);

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn record(
    config: AppConfig,
    room: String,
    input: PathBuf,
    duration_secs: Option<u64>,
    server_url: Option<String>,
) -> anyhow::Result<()> {
    // 房间号缺失时拒绝启动采集
    let room_id = RoomId::new(room).map_err(|e| anyhow::anyhow!("Invalid room id: {}", e))?;

    let recorder = &config.recorder;
    let uploader_config =
        HttpSegmentUploaderConfig::new(server_url.unwrap_or_else(|| recorder.server_url.clone()))
            .with_timeout(recorder.upload_timeout_secs);
    let uploader = Arc::new(HttpSegmentUploader::new(uploader_config)?);

    let session = RecordingSession::new(
        room_id.clone(),
        recorder.recording_config(),
        Arc::new(WavFileSource::new(&input)),
        Arc::new(WebmOpusRecorderFactory::new()),
        uploader,
    );

    session.start().await?;
    tracing::info!(room_id = %room_id, input = %input.display(), "Capturing audio");

    match duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    tracing::info!(duration_secs = secs, "Capture duration elapsed");
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    tracing::info!("Received shutdown signal");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            tracing::info!("Received shutdown signal");
        }
    }

    session.stop().await?;
    session.drain_uploads().await;

    tracing::info!(
        room_id = %room_id,
        segments = session.segments_dispatched().await,
        "Capture finished"
    );

    Ok(())
}
