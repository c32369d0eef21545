//! 总线消息的线上格式：类型化记录 + JSON 信封。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::TransportError;

/// 浮点测量记录。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedFloat {
    pub timestamp_ms: i64,
    pub value: f64,
}

/// 整数测量记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedInt {
    pub timestamp_ms: i64,
    pub value: i32,
}

/// 位置记录：lat/lon/alt 合并为一条消息。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    pub timestamp_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// 统一信封：记录封装时间与业务负载。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub enclosed_at_ms: i64,
    pub payload: T,
}

/// 把记录封入信封并序列化为 JSON 字节。
pub fn enclose<T: Serialize>(payload: T) -> Result<Vec<u8>, TransportError> {
    let envelope = Envelope {
        enclosed_at_ms: now_epoch_ms(),
        payload,
    };
    serde_json::to_vec(&envelope).map_err(|err| TransportError::Payload(err.to_string()))
}

/// 解开信封（消费端与测试用）。
pub fn open_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<Envelope<T>, TransportError> {
    serde_json::from_slice(bytes).map_err(|err| TransportError::Payload(err.to_string()))
}

fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
