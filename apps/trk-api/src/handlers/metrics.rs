//! Telemetry 指标快照（MVP）。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use trk_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            samples_received: snapshot.samples_received,
            messages_published: snapshot.messages_published,
            rejected_invalid_timestamp: snapshot.rejected_invalid_timestamp,
            dropped_stale: snapshot.dropped_stale,
            fields_skipped: snapshot.fields_skipped,
            publish_failures: snapshot.publish_failures,
        })),
    )
        .into_response()
}
