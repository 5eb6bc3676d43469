use crate::sim::{Clock, SimTime};

#[test]
fn unit_conversions_are_nanosecond_exact() {
    assert_eq!(SimTime::from_nanos(7), SimTime(7));
    assert_eq!(SimTime::from_micros(3), SimTime(3_000));
    assert_eq!(SimTime::from_millis(2), SimTime(2_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
    assert_eq!(SimTime::from_secs(1).as_nanos(), 1_000_000_000);
}

#[test]
fn as_secs_f64_round_trips_common_values() {
    assert_eq!(SimTime::from_millis(500).as_secs_f64(), 0.5);
    assert_eq!(SimTime::ZERO.as_secs_f64(), 0.0);
}

#[test]
fn arithmetic_saturates_instead_of_wrapping() {
    let near_max = SimTime(u64::MAX - 1);
    assert_eq!(near_max.saturating_add(SimTime(10)), SimTime(u64::MAX));
    assert_eq!(SimTime(5).saturating_sub(SimTime(9)), SimTime::ZERO);
    assert_eq!(SimTime(9).saturating_sub(SimTime(5)), SimTime(4));
    assert_eq!(near_max.saturating_mul(3), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(1).saturating_mul(2), SimTime::from_secs(2));
}

#[test]
fn far_future_leaves_headroom_for_backoff() {
    // Doubling an unset timer a few times must not wrap around.
    let mut t = SimTime::FAR_FUTURE;
    t = t.saturating_mul(2);
    assert!(t > SimTime::FAR_FUTURE);
    assert!(SimTime::FAR_FUTURE > SimTime::from_secs(10_000));
}

#[test]
fn clock_advances_in_fixed_steps() {
    let dt = SimTime::from_micros(100);
    let mut clock = Clock::new(dt);
    assert_eq!(clock.now(), SimTime::ZERO);
    assert_eq!(clock.ticks(), 0);

    clock.advance();
    clock.advance();
    assert_eq!(clock.now(), SimTime::from_micros(200));
    assert_eq!(clock.ticks(), 2);
    assert_eq!(clock.dt(), dt);
}
