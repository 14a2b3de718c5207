//! Recording Session - 录音会话状态机
//!
//! 状态: Idle → Recording → Idle
//!
//! 录音期间每隔 `SegmentationPolicy::interval` 触发一次轮换：
//! 1. 停止当前录音器，刷新出的非空数据立即作为分段上传
//! 2. 在同一个输入流上新建录音器并开始采集
//!
//! 每个分段都是独立的容器，可单独解码。上传不阻塞轮换，
//! 多个上传可能同时在途，到达后端的顺序不作保证。

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::application::ports::{
    AudioSourcePort, AudioStream, CaptureError, Recorder, RecorderFactoryPort,
    SegmentUploaderPort,
};
use crate::domain::capture::{
    AudioSegment, CaptureConstraints, RecorderOptions, RecorderState, SegmentationPolicy,
    SessionState,
};
use crate::domain::room::RoomId;

/// 录音会话配置
#[derive(Debug, Clone, Default)]
pub struct RecordingConfig {
    pub constraints: CaptureConstraints,
    pub recorder_options: RecorderOptions,
    pub segmentation: SegmentationPolicy,
}

#[derive(Default)]
struct SessionInner {
    state: SessionState,
    stream: Option<Arc<dyn AudioStream>>,
    recorder: Option<Box<dyn Recorder>>,
    ticker: Option<JoinHandle<()>>,
    uploads: JoinSet<()>,
    segments_dispatched: u64,
}

/// 录音会话
///
/// 克隆代价很低，所有克隆共享同一个状态
#[derive(Clone)]
pub struct RecordingSession {
    room_id: RoomId,
    config: RecordingConfig,
    source: Arc<dyn AudioSourcePort>,
    recorder_factory: Arc<dyn RecorderFactoryPort>,
    uploader: Arc<dyn SegmentUploaderPort>,
    inner: Arc<Mutex<SessionInner>>,
}

impl RecordingSession {
    pub fn new(
        room_id: RoomId,
        config: RecordingConfig,
        source: Arc<dyn AudioSourcePort>,
        recorder_factory: Arc<dyn RecorderFactoryPort>,
        uploader: Arc<dyn SegmentUploaderPort>,
    ) -> Self {
        Self {
            room_id,
            config,
            source,
            recorder_factory,
            uploader,
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    /// 开始录音
    ///
    /// 音频源不可用时立即返回 `Unsupported`，状态不变。
    /// 打开输入流失败（如未授权）时错误原样返回，状态回到 Idle。
    pub async fn start(&self) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock().await;

        if inner.state == SessionState::Recording {
            return Err(CaptureError::InvalidState(
                "recording already in progress".to_string(),
            ));
        }

        if !self.source.is_supported() {
            tracing::warn!(room_id = %self.room_id, "Audio source does not support recording");
            return Err(CaptureError::Unsupported(
                "audio source is not available".to_string(),
            ));
        }

        inner.state = SessionState::Recording;

        let stream = match self.source.open(&self.config.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                inner.state = SessionState::Idle;
                return Err(e);
            }
        };

        let recorder = match self.create_recorder(stream.clone()) {
            Ok(recorder) => recorder,
            Err(e) => {
                stream.close();
                inner.state = SessionState::Idle;
                return Err(e);
            }
        };

        let format = stream.format();
        inner.stream = Some(stream);
        inner.recorder = Some(recorder);
        inner.ticker = Some(self.spawn_ticker());

        tracing::info!(
            room_id = %self.room_id,
            sample_rate = format.sample_rate,
            channels = format.channels,
            interval_ms = self.config.segmentation.interval().as_millis() as u64,
            "Recording session started"
        );

        Ok(())
    }

    /// 停止录音
    ///
    /// 取消定时器，停止仍在工作的录音器并上传最后一个分段。
    /// 未在录音时调用不做任何事。已在途的上传不会被取消。
    pub async fn stop(&self) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock().await;

        if inner.state == SessionState::Idle {
            return Ok(());
        }
        inner.state = SessionState::Idle;

        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }

        let result = match inner.recorder.take() {
            Some(recorder) => self.flush(recorder, &mut inner).await,
            None => Ok(()),
        };

        if let Some(stream) = inner.stream.take() {
            stream.close();
        }

        tracing::info!(
            room_id = %self.room_id,
            segments = inner.segments_dispatched,
            "Recording session stopped"
        );

        result
    }

    /// 轮换录音器：刷新当前分段并在同一流上重新开始
    ///
    /// 由定时器驱动；也可以手动调用以立即切分
    pub async fn rotate(&self) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock().await;

        if inner.state != SessionState::Recording {
            return Ok(());
        }
        let Some(stream) = inner.stream.clone() else {
            return Ok(());
        };

        if let Some(recorder) = inner.recorder.take() {
            if let Err(e) = self.flush(recorder, &mut inner).await {
                tracing::warn!(room_id = %self.room_id, error = %e, "Failed to flush segment");
            }
        }

        inner.recorder = Some(self.create_recorder(stream)?);
        Ok(())
    }

    /// 等待所有在途上传完成
    pub async fn drain_uploads(&self) {
        let mut uploads = {
            let mut inner = self.inner.lock().await;
            std::mem::take(&mut inner.uploads)
        };

        while let Some(result) = uploads.join_next().await {
            if let Err(e) = result {
                tracing::warn!(room_id = %self.room_id, error = %e, "Upload task aborted");
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// 定时器是否仍在运行
    pub async fn is_timer_active(&self) -> bool {
        self.inner
            .lock()
            .await
            .ticker
            .as_ref()
            .map(|ticker| !ticker.is_finished())
            .unwrap_or(false)
    }

    /// 已派发上传的分段数
    pub async fn segments_dispatched(&self) -> u64 {
        self.inner.lock().await.segments_dispatched
    }

    fn create_recorder(
        &self,
        stream: Arc<dyn AudioStream>,
    ) -> Result<Box<dyn Recorder>, CaptureError> {
        let mut recorder = self
            .recorder_factory
            .create(stream, &self.config.recorder_options)?;
        recorder.start()?;
        tracing::info!(room_id = %self.room_id, "Recording started");
        Ok(recorder)
    }

    /// 停止录音器并派发分段
    ///
    /// 编码在阻塞线程池上进行；会话锁保持到编码结束，轮换仍然串行
    async fn flush(
        &self,
        mut recorder: Box<dyn Recorder>,
        inner: &mut SessionInner,
    ) -> Result<(), CaptureError> {
        if recorder.state() == RecorderState::Inactive {
            return Ok(());
        }

        let data = tokio::task::spawn_blocking(move || recorder.stop())
            .await
            .map_err(|e| CaptureError::EncodingError(format!("Encoder task failed: {}", e)))??;
        tracing::info!(room_id = %self.room_id, size = data.len(), "Recording stopped");

        if data.is_empty() {
            tracing::debug!(room_id = %self.room_id, "Empty flush, nothing to upload");
            return Ok(());
        }

        let segment = AudioSegment::new(
            self.room_id.clone(),
            data,
            self.config.recorder_options.mime_type.clone(),
        );
        inner.segments_dispatched += 1;
        self.dispatch(segment, &mut inner.uploads);
        Ok(())
    }

    fn dispatch(&self, segment: AudioSegment, uploads: &mut JoinSet<()>) {
        // 回收已完成的上传，长时间录音时集合不随分段数增长
        while let Some(result) = uploads.try_join_next() {
            if let Err(e) = result {
                tracing::warn!(room_id = %self.room_id, error = %e, "Upload task aborted");
            }
        }

        let uploader = self.uploader.clone();
        let room_id = self.room_id.clone();
        let size = segment.len();

        uploads.spawn(async move {
            match uploader.upload(segment).await {
                Ok(body) => {
                    tracing::debug!(room_id = %room_id, size, response = %body, "Segment uploaded");
                }
                Err(e) => {
                    tracing::warn!(room_id = %room_id, size, error = %e, "Segment upload failed");
                }
            }
        });
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let session = self.clone();
        let period = self.config.segmentation.interval();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = session.rotate().await {
                    tracing::error!(
                        room_id = %session.room_id,
                        error = %e,
                        "Failed to restart recorder"
                    );
                }
            }
        })
    }
}
