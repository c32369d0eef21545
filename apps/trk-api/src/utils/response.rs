//! HTTP 错误响应辅助函数
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应

use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 时间字段缺失或无法解析（整次上报拒绝，无任何消息发布）
pub fn invalid_timestamp_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            "TELEMETRY.INVALID_TIMESTAMP",
            message.into(),
        )),
    )
        .into_response()
}

/// 请求体无法解码
pub fn malformed_payload_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            "TELEMETRY.MALFORMED_PAYLOAD",
            message.into(),
        )),
    )
        .into_response()
}
