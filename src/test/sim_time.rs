use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
    assert_eq!(SimTime::from_millis(250).as_secs_f64(), 0.25);
    assert_eq!(SimTime::from_micros(1500).as_millis_f64(), 1.5);
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime::MAX);
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime::MAX);
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime::MAX);
    assert_eq!(SimTime::MAX.saturating_add(SimTime(1)), SimTime::MAX);
}

#[test]
fn saturating_since_never_goes_negative() {
    let early = SimTime::from_millis(3);
    let late = SimTime::from_millis(5);
    assert_eq!(late.saturating_since(early), SimTime::from_millis(2));
    assert_eq!(early.saturating_since(late), SimTime::ZERO);
}

#[test]
fn display_is_milliseconds() {
    assert_eq!(SimTime::from_micros(1_234).to_string(), "1.234ms");
    assert_eq!(SimTime::ZERO.to_string(), "0.000ms");
}
