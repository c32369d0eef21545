//! 遥测上报 handler
//!
//! - POST /log/{entity_id}
//!
//! 请求体按原始字节交给发布流水线；应答回显解码出的字段表，
//! 与上游客户端（GPSLogger 自定义 URL 上报）的原始行为保持一致。

use crate::AppState;
use crate::utils::response::{invalid_timestamp_error, malformed_payload_error};
use api_contract::ApiResponse;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use trk_pipeline::PublishError;

#[derive(serde::Deserialize)]
pub struct LogPath {
    pub(crate) entity_id: String,
}

pub async fn post_log(
    State(state): State<AppState>,
    Path(path): Path<LogPath>,
    body: Bytes,
) -> Response {
    match state
        .publisher
        .publish_telemetry(&path.entity_id, &body, Utc::now(), state.live_only)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report.fields))).into_response(),
        Err(err @ PublishError::InvalidTimestamp(_)) => invalid_timestamp_error(err.to_string()),
        Err(err @ PublishError::MalformedPayload(_)) => malformed_payload_error(err.to_string()),
    }
}
