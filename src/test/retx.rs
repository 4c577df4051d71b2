use super::support::interest;
use crate::fw::{Pit, PitEntry, PitToken, RETX_SUPPRESSION_MAX, RetxDecision, RetxSuppression};
use crate::net::FaceId;
use crate::sim::SimTime;

fn entry_sent_at(pit: &mut Pit, at: SimTime) -> PitToken {
    let i = interest("/v/1", 1);
    let (token, _) = pit.find_or_insert(&i);
    let e = pit.get_mut(token).expect("entry");
    e.insert_in_record(FaceId(1), &i, at);
    e.insert_out_record(FaceId(2), 1, at);
    token
}

fn ms(v: u64) -> SimTime {
    SimTime::from_millis(v)
}

fn entry(pit: &mut Pit, token: PitToken) -> &mut PitEntry {
    pit.get_mut(token).expect("entry")
}

#[test]
fn first_interest_is_new() {
    let mut pit = Pit::default();
    let (token, _) = pit.find_or_insert(&interest("/v/1", 1));
    let r = RetxSuppression::default();
    assert_eq!(r.decide(entry(&mut pit, token), SimTime::ZERO), RetxDecision::New);
}

#[test]
fn suppressed_inside_interval_then_forwarded_and_grown() {
    let mut pit = Pit::default();
    let token = entry_sent_at(&mut pit, SimTime::ZERO);
    let r = RetxSuppression::default();

    assert_eq!(r.decide(entry(&mut pit, token), ms(5)), RetxDecision::Suppress);
    assert_eq!(entry(&mut pit, token).retx_interval, Some(ms(10)));

    assert_eq!(r.decide(entry(&mut pit, token), ms(10)), RetxDecision::Forward);
    assert_eq!(entry(&mut pit, token).retx_interval, Some(ms(20)));

    entry(&mut pit, token).insert_out_record(FaceId(2), 2, ms(10));
    assert_eq!(r.decide(entry(&mut pit, token), ms(25)), RetxDecision::Suppress);
    assert_eq!(r.decide(entry(&mut pit, token), ms(30)), RetxDecision::Forward);
}

#[test]
fn interval_is_capped() {
    let mut pit = Pit::default();
    let token = entry_sent_at(&mut pit, SimTime::ZERO);
    let r = RetxSuppression::default();
    let mut now = SimTime::ZERO;
    for _ in 0..10 {
        now = now.saturating_add(SimTime::from_secs(1));
        assert_eq!(r.decide(entry(&mut pit, token), now), RetxDecision::Forward);
    }
    assert_eq!(entry(&mut pit, token).retx_interval, Some(RETX_SUPPRESSION_MAX));
}

#[test]
fn nacked_upstreams_do_not_count_as_pending() {
    let mut pit = Pit::default();
    let token = entry_sent_at(&mut pit, SimTime::ZERO);
    entry(&mut pit, token)
        .out_record_mut(FaceId(2))
        .expect("out")
        .nacked = Some(crate::net::NackReason::Congestion);
    let r = RetxSuppression::default();
    assert_eq!(r.decide(entry(&mut pit, token), ms(1)), RetxDecision::New);
}
