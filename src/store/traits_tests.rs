use super::*;

#[test]
fn point_carries_through_its_fields() {
    let point = Point {
        start: Timestamp::from_secs(10),
        min: Duration::from_millis(1),
        avg: Duration::from_millis(2),
        max: Duration::from_millis(3),
        loss: 0.0,
    };
    assert_eq!(point.start, Timestamp::from_secs(10));
    assert_eq!(point.max, Duration::from_millis(3));
}

#[test]
fn flow_summary_groups_by_an_opaque_key() {
    let summary = FlowSummary {
        key: "192.168.1.10".to_string(),
        bytes: 140,
        packets: 2,
    };
    assert_eq!(summary.bytes, 140);
}
