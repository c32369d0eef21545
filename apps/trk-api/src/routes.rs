//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 指标快照：/metrics
//! - 遥测上报：/log/{entity_id}

use super::AppState;
use super::handlers::*;
use api_contract::HealthDto;
use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含全部端点的 Router，由入口同时挂载 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/log/:entity_id", post(post_log))
}

async fn health() -> impl IntoResponse {
    Json(HealthDto { ok: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::request_context;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use trk_pipeline::TelemetryPublisher;
    use trk_transport::NoopPublisher;

    const SAMPLE_BODY: &str = "time=2024-05-01T12:30:00.000000Z&lat=57.70&batt=88";

    fn test_app(live_only: bool) -> Router {
        let publisher = TelemetryPublisher::new(Arc::new(NoopPublisher), "trk");
        let state = AppState {
            publisher,
            live_only,
        };
        let api = create_api_router();
        Router::new()
            .merge(api.clone())
            .nest("/api", api)
            .with_state(state)
            .layer(axum::middleware::from_fn(request_context))
    }

    fn post_log_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.into())
            .expect("request")
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn post_log_echoes_fields() {
        let app = test_app(false);
        let response = app
            .oneshot(post_log_request("/log/tracker-1", SAMPLE_BODY))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["lat"], "57.70");
        assert_eq!(body["data"]["batt"], "88");
    }

    #[tokio::test]
    async fn post_log_mounts_under_api_prefix() {
        let app = test_app(false);
        let response = app
            .oneshot(post_log_request("/api/log/tracker-1", SAMPLE_BODY))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn post_log_rejects_missing_time() {
        let app = test_app(false);
        let response = app
            .oneshot(post_log_request("/log/tracker-1", "lat=57.70"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "TELEMETRY.INVALID_TIMESTAMP");
    }

    #[tokio::test]
    async fn post_log_rejects_non_utf8_body() {
        let app = test_app(false);
        let response = app
            .oneshot(post_log_request(
                "/log/tracker-1",
                Vec::from([0x6c_u8, 0x61, 0x74, 0x3d, 0xff]),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "TELEMETRY.MALFORMED_PAYLOAD");
    }

    #[tokio::test]
    async fn stale_sample_still_acknowledged() {
        // live_only 开启且样本时间远在阈值之外：不发布但仍 200 回显
        let app = test_app(true);
        let response = app
            .oneshot(post_log_request("/log/tracker-1", SAMPLE_BODY))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["lat"], "57.70");
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let app = test_app(false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn metrics_snapshot_exposed() {
        let app = test_app(false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["samplesReceived"].is_number());
        assert!(body["data"]["messagesPublished"].is_number());
    }

    #[tokio::test]
    async fn responses_carry_request_ids() {
        let app = test_app(false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
    }
}
