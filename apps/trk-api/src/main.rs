//! 遥测采集 HTTP API：接收 form 编码样本，按字段归一化后发布到消息总线。
//!
//! - POST /log/{entity_id}：接收一次遥测上报（亦挂载于 /api 前缀下）
//! - GET /health：健康检查
//! - GET /metrics：运行指标快照

mod handlers;
mod middleware;
mod routes;
mod utils;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use trk_config::AppConfig;
use trk_pipeline::TelemetryPublisher;
use trk_telemetry::init_tracing;
use trk_transport::{MqttPublisher, MqttPublisherConfig, NoopPublisher, TransportPublisher};

/// 应用共享状态。
#[derive(Clone)]
pub struct AppState {
    pub publisher: TelemetryPublisher,
    pub live_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 选择发布传输：按配置启用 MQTT 或空操作占位
    let transport: Arc<dyn TransportPublisher> = if config.mqtt_enabled {
        let (publisher, _handle) = MqttPublisher::connect(MqttPublisherConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            qos: config.mqtt_qos,
        })?;
        info!(
            "telemetry transport: mqtt {}:{} prefix={}",
            config.mqtt_host, config.mqtt_port, config.mqtt_topic_prefix
        );
        Arc::new(publisher)
    } else {
        info!("telemetry transport: noop (TRK_MQTT=off)");
        Arc::new(NoopPublisher::default())
    };

    let publisher = TelemetryPublisher::new(transport, config.mqtt_topic_prefix.clone());
    let state = AppState {
        publisher,
        live_only: config.live_only,
    };

    // 同时挂载裸路径与 /api 前缀，并注入 request_id/trace_id 与 CORS
    let api = routes::create_api_router();
    let app = Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("listening on {}", config.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
