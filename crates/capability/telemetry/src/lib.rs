//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照（MVP）。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub samples_received: u64,
    pub messages_published: u64,
    pub rejected_invalid_timestamp: u64,
    pub dropped_stale: u64,
    pub fields_skipped: u64,
    pub publish_failures: u64,
}

/// 基础指标（MVP）。
pub struct TelemetryMetrics {
    samples_received: AtomicU64,
    messages_published: AtomicU64,
    rejected_invalid_timestamp: AtomicU64,
    dropped_stale: AtomicU64,
    fields_skipped: AtomicU64,
    publish_failures: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            samples_received: AtomicU64::new(0),
            messages_published: AtomicU64::new(0),
            rejected_invalid_timestamp: AtomicU64::new(0),
            dropped_stale: AtomicU64::new(0),
            fields_skipped: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            rejected_invalid_timestamp: self.rejected_invalid_timestamp.load(Ordering::Relaxed),
            dropped_stale: self.dropped_stale.load(Ordering::Relaxed),
            fields_skipped: self.fields_skipped.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例（MVP）。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录样本接收次数。
pub fn record_sample_received() {
    metrics().samples_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录消息发布次数。
pub fn record_message_published() {
    metrics().messages_published.fetch_add(1, Ordering::Relaxed);
}

/// 记录时间戳非法拒绝次数。
pub fn record_rejected_invalid_timestamp() {
    metrics()
        .rejected_invalid_timestamp
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录过期样本丢弃次数。
pub fn record_dropped_stale() {
    metrics().dropped_stale.fetch_add(1, Ordering::Relaxed);
}

/// 记录字段转换失败跳过次数。
pub fn record_field_skipped() {
    metrics().fields_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布失败次数（传输层不可用或出错）。
pub fn record_publish_failure() {
    metrics().publish_failures.fetch_add(1, Ordering::Relaxed);
}
