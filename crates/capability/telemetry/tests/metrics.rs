use trk_telemetry::{metrics, record_message_published, record_sample_received};

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_sample_received();
    record_message_published();
    record_message_published();

    let after = metrics().snapshot();
    assert_eq!(after.samples_received - before.samples_received, 1);
    assert_eq!(after.messages_published - before.messages_published, 2);
}
