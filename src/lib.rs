//! RoomQA - 房间问答系统
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Room Context: 房间标识
//! - Question Context: 问题聚合
//! - Capture Context: 采集约束、录音器参数、分段策略
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, ChunkStorage, AudioCapture, SegmentUploader）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//! - Recording: 录音会话（定时轮换录音器并上传分段）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 存储
//! - Adapters: 音频块文件存储、WAV 文件音源、WebM/Opus 录音器、HTTP 分段上传

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
