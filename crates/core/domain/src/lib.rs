pub mod data;

pub use data::{MeasurementValue, RawFieldMap};

use chrono::{DateTime, Utc};

/// 遥测样本上下文：单次上报在各模块间共享的标识与时间。
#[derive(Debug, Clone)]
pub struct TelemetrySample {
    pub entity_id: String,
    pub source_profile_id: Option<String>,
    pub sample_time: DateTime<Utc>,
}

impl TelemetrySample {
    /// 构造显式实体与采样时间的样本上下文。
    pub fn new(
        entity_id: impl Into<String>,
        source_profile_id: Option<String>,
        sample_time: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            source_profile_id,
            sample_time,
        }
    }

    /// 样本时间的 Unix 毫秒表示。
    pub fn sample_time_ms(&self) -> i64 {
        self.sample_time.timestamp_millis()
    }
}
