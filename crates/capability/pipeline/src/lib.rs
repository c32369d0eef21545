use chrono::{DateTime, NaiveDateTime, Utc};
use domain::{MeasurementValue, RawFieldMap, TelemetrySample};
use std::sync::Arc;
use tracing::{info, warn};
use trk_ingest::decode_form;
use trk_normalize::{MEASUREMENT_SPECS, convert};
use trk_telemetry::{
    record_dropped_stale, record_field_skipped, record_message_published, record_publish_failure,
    record_rejected_invalid_timestamp, record_sample_received,
};
use trk_transport::{
    PositionFix, TimestampedFloat, TimestampedInt, TransportError, TransportPublisher, enclose,
};

/// 活样本判定阈值（秒）。超过即视为过期，等于仍然发布。
pub const STALE_AFTER_SECONDS: i64 = 30;

/// 样本 time 字段的固定格式（UTC）。
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// 发布结果：回显字段表 + 发布计数。
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub fields: RawFieldMap,
    pub published: usize,
    pub reason: Option<String>,
}

/// 发布处理错误。
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Telemetry 发布入口。
#[derive(Clone)]
pub struct TelemetryPublisher {
    transport: Arc<dyn TransportPublisher>,
    topic_prefix: String,
}

impl TelemetryPublisher {
    pub fn new(transport: Arc<dyn TransportPublisher>, topic_prefix: impl Into<String>) -> Self {
        Self {
            transport,
            topic_prefix: topic_prefix.into(),
        }
    }

    /// 处理一次上报：解码、校验时间、按字段转换并逐条发布。
    ///
    /// 单字段转换失败只跳过该字段；传输层失败只计数告警，
    /// 请求仍以原始字段表应答。
    pub async fn publish_telemetry(
        &self,
        entity_id: &str,
        raw_body: &[u8],
        current_time: DateTime<Utc>,
        live_only: bool,
    ) -> Result<PublishReport, PublishError> {
        record_sample_received();
        let fields =
            decode_form(raw_body).map_err(|err| PublishError::MalformedPayload(err.to_string()))?;

        let sample_time = match parse_sample_time(&fields) {
            Ok(sample_time) => sample_time,
            Err(err) => {
                record_rejected_invalid_timestamp();
                warn!(
                    target: "trk.publish",
                    entity_id = %entity_id,
                    error = %err,
                    "sample_rejected"
                );
                return Err(err);
            }
        };
        let profile = fields
            .get("profile")
            .cloned()
            .filter(|profile| !profile.is_empty());
        let sample = TelemetrySample::new(entity_id, profile, sample_time);

        if live_only {
            let age_seconds = (current_time - sample.sample_time).num_seconds();
            if age_seconds > STALE_AFTER_SECONDS {
                record_dropped_stale();
                info!(
                    target: "trk.publish",
                    entity_id = %sample.entity_id,
                    age_seconds = age_seconds,
                    "sample_dropped_stale"
                );
                return Ok(PublishReport {
                    fields,
                    published: 0,
                    reason: Some("stale".to_string()),
                });
            }
        }

        let mut published = 0usize;

        if let Some(fix) = assemble_position(&sample, &fields) {
            let topic = self.topic_for(&sample, "location_fix");
            if self.send(&sample, &topic, enclose(fix)).await {
                published += 1;
            }
        }

        for spec in MEASUREMENT_SPECS.iter().filter(|spec| !spec.compound) {
            let raw = match fields.get(spec.source_key) {
                Some(raw) => raw,
                None => continue,
            };
            let value = match convert(spec, raw) {
                Ok(value) => value,
                Err(err) => {
                    record_field_skipped();
                    warn!(
                        target: "trk.publish",
                        entity_id = %sample.entity_id,
                        field = spec.source_key,
                        error = %err,
                        "field_skipped"
                    );
                    continue;
                }
            };
            let topic = self.topic_for(&sample, spec.subject);
            if self.send(&sample, &topic, encode_value(&sample, value)).await {
                published += 1;
            }
        }

        info!(
            target: "trk.publish",
            entity_id = %sample.entity_id,
            profile = ?sample.source_profile_id,
            fields = fields.len(),
            published = published,
            "telemetry_published"
        );
        Ok(PublishReport {
            fields,
            published,
            reason: None,
        })
    }

    fn topic_for(&self, sample: &TelemetrySample, subject: &str) -> String {
        let prefix = self.topic_prefix.trim_end_matches('/');
        let entity = sample.entity_id.trim_matches('/');
        match sample.source_profile_id.as_deref() {
            Some(profile) => {
                format!("{}/{}/{}/{}", prefix, entity, subject, profile.trim_matches('/'))
            }
            None => format!("{}/{}/{}", prefix, entity, subject),
        }
    }

    async fn send(
        &self,
        sample: &TelemetrySample,
        topic: &str,
        payload: Result<Vec<u8>, TransportError>,
    ) -> bool {
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                record_publish_failure();
                warn!(
                    target: "trk.publish",
                    entity_id = %sample.entity_id,
                    topic = %topic,
                    error = %err,
                    "publish_failed"
                );
                return false;
            }
        };
        match self.transport.publish(topic, payload).await {
            Ok(()) => {
                record_message_published();
                true
            }
            Err(err) => {
                record_publish_failure();
                warn!(
                    target: "trk.publish",
                    entity_id = %sample.entity_id,
                    topic = %topic,
                    error = %err,
                    "publish_failed"
                );
                false
            }
        }
    }
}

fn parse_sample_time(fields: &RawFieldMap) -> Result<DateTime<Utc>, PublishError> {
    let raw = match fields.get("time") {
        Some(raw) => raw,
        None => return Err(PublishError::InvalidTimestamp("missing time field".to_string())),
    };
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| PublishError::InvalidTimestamp(format!("{}: {}", raw, err)))
}

/// lat/lon/alt 组装为一条位置记录：至少一个在场才发布，缺席的填 0.0。
/// 任一在场字段解析失败则整条位置消息跳过。
fn assemble_position(sample: &TelemetrySample, fields: &RawFieldMap) -> Option<PositionFix> {
    let mut any_present = false;
    let mut axes = [0.0_f64; 3];
    for (index, key) in ["lat", "lon", "alt"].into_iter().enumerate() {
        let raw = match fields.get(key) {
            Some(raw) => raw,
            None => continue,
        };
        any_present = true;
        match raw.trim().parse::<f64>() {
            Ok(value) => axes[index] = value,
            Err(err) => {
                record_field_skipped();
                warn!(
                    target: "trk.publish",
                    entity_id = %sample.entity_id,
                    field = key,
                    error = %err,
                    "field_skipped"
                );
                return None;
            }
        }
    }
    if !any_present {
        return None;
    }
    Some(PositionFix {
        timestamp_ms: sample.sample_time_ms(),
        latitude: axes[0],
        longitude: axes[1],
        altitude: axes[2],
    })
}

fn encode_value(
    sample: &TelemetrySample,
    value: MeasurementValue,
) -> Result<Vec<u8>, TransportError> {
    let timestamp_ms = sample.sample_time_ms();
    match value {
        MeasurementValue::F64(value) => enclose(TimestampedFloat {
            timestamp_ms,
            value,
        }),
        MeasurementValue::I32(value) => enclose(TimestampedInt {
            timestamp_ms,
            value,
        }),
    }
}
