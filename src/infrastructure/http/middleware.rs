//! HTTP Middleware
//!
//! 4xx/5xx 响应日志：记录路由模板、实际路径与耗时

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Level;

/// 按状态码决定日志级别，成功响应不记录
fn severity(status: StatusCode) -> Option<Level> {
    if status.is_server_error() {
        Some(Level::ERROR)
    } else if status.is_client_error() {
        Some(Level::WARN)
    } else {
        None
    }
}

/// 响应状态日志中间件
///
/// ApiError 已在 into_response() 中记录具体原因，这里只补充请求上下文
pub async fn status_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| "<unmatched>".to_string());
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    match severity(response.status()) {
        Some(level) if level == Level::ERROR => {
            tracing::error!(%method, %route, %path, status, latency_ms, "Request failed")
        }
        Some(_) => {
            tracing::warn!(%method, %route, %path, status, latency_ms, "Request rejected")
        }
        None => {}
    }

    response
}
