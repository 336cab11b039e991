use super::*;

#[test]
fn zero_is_stale_regardless_of_interval() {
    let ts = Timestamp::ZERO;
    assert!(ts.is_stale(Timestamp::from_secs(1), 1_000_000));
}

#[test]
fn non_zero_respects_interval() {
    let ts = Timestamp::from_secs(100);
    assert!(!ts.is_stale(Timestamp::from_secs(150), 100));
    assert!(ts.is_stale(Timestamp::from_secs(250), 100));
}
