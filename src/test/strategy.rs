use super::support::{DOWN, FakeEgress, UP, data, interest, name, nack, tagged};
use crate::fw::{Fib, Pit, PitToken, QosStrategy};
use crate::net::{FaceId, Interest, NackReason, Packet, PacketType};
use crate::qos::{Admission, QosConfig};
use crate::sim::SimTime;

const DOWNSTREAM: FaceId = FaceId(10);
const OTHER_DOWNSTREAM: FaceId = FaceId(11);

fn strategy() -> QosStrategy {
    QosStrategy::new(QosConfig::default(), SimTime::ZERO).expect("default config is valid")
}

fn fib_with(faces: &[FaceId]) -> Fib {
    let mut fib = Fib::default();
    for (cost, &face) in faces.iter().enumerate() {
        fib.add_next_hop(name("/video"), face, cost as u32);
    }
    fib
}

/// PIT entry with one in-record, as the forwarder would create it.
fn pending(pit: &mut Pit, in_face: FaceId, i: &Interest, now: SimTime) -> PitToken {
    let (token, _) = pit.find_or_insert(i);
    pit.get_mut(token)
        .expect("entry")
        .insert_in_record(in_face, i, now);
    token
}

fn drain(s: &mut QosStrategy, now: SimTime) -> FakeEgress {
    let mut egress = FakeEgress::default();
    s.scheduler_mut().run_scheduling_pass(now, &mut egress);
    egress
}

#[test]
fn interest_is_forwarded_to_every_up_next_hop_except_the_in_face() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[UP, DOWNSTREAM, DOWN, FaceId(3)]);
    let mut egress = FakeEgress::default();
    egress.down.insert(DOWN);
    let i = tagged("/video/1", 42, 1);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);

    let out = s.after_receive_interest(DOWNSTREAM, &i, token, &mut pit, &fib, &egress, SimTime::ZERO);

    assert_eq!(out.admission, Some(Admission::QueuedOnIdleFace));
    assert!(out.wants_pass());
    assert_eq!(out.rejected, None);
    let entry = pit.get(token).expect("entry");
    let mut out_faces: Vec<_> = entry.out_records.iter().map(|r| r.face).collect();
    out_faces.sort();
    assert_eq!(out_faces, [UP, FaceId(3)]);
    assert_eq!(s.stats().interests_forwarded, 2);

    let sent = drain(&mut s, SimTime::ZERO);
    assert_eq!(sent.sent.len(), 2);
    assert!(sent.sent.iter().all(|(_, p)| p.packet_type() == PacketType::Interest));
}

#[test]
fn no_eligible_next_hop_rejects_with_no_route() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[DOWNSTREAM]);
    let egress = FakeEgress::default();
    let i = interest("/video/1", 5);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);

    let out = s.after_receive_interest(DOWNSTREAM, &i, token, &mut pit, &fib, &egress, SimTime::ZERO);

    assert_eq!(out.rejected, Some(NackReason::NoRoute));
    assert_eq!(s.stats().no_route, 1);
    let sent = drain(&mut s, SimTime::ZERO);
    match &sent.sent[..] {
        [(face, Packet::Nack(n))] => {
            assert_eq!(*face, DOWNSTREAM);
            assert_eq!(n.reason, NackReason::NoRoute);
            assert_eq!(n.interest.nonce, 5);
        }
        other => panic!("expected one nack, got {other:?}"),
    }
}

#[test]
fn local_downstream_gets_no_wire_nack() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let egress = FakeEgress::default();
    let i = interest("/nowhere/1", 5);
    let token = pending(&mut pit, FaceId::LOCAL, &i, SimTime::ZERO);

    let out = s.after_receive_interest(FaceId::LOCAL, &i, token, &mut pit, &Fib::default(), &egress, SimTime::ZERO);

    assert_eq!(out.rejected, Some(NackReason::NoRoute));
    assert_eq!(out.admission, None);
    assert_eq!(s.scheduler().backlog(), 0);
}

#[test]
fn retransmission_inside_interval_is_suppressed() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[UP]);
    let egress = FakeEgress::default();

    let first = interest("/video/1", 1);
    let token = pending(&mut pit, DOWNSTREAM, &first, SimTime::ZERO);
    s.after_receive_interest(DOWNSTREAM, &first, token, &mut pit, &fib, &egress, SimTime::ZERO);

    let t = SimTime::from_millis(4);
    let retx = interest("/video/1", 2);
    pending(&mut pit, OTHER_DOWNSTREAM, &retx, t);
    let out = s.after_receive_interest(OTHER_DOWNSTREAM, &retx, token, &mut pit, &fib, &egress, t);
    assert_eq!(out.admission, None);
    assert_eq!(s.stats().interests_suppressed, 1);

    let t = SimTime::from_millis(15);
    let out = s.after_receive_interest(OTHER_DOWNSTREAM, &retx, token, &mut pit, &fib, &egress, t);
    assert!(out.admission.is_some());
    assert_eq!(s.stats().interests_forwarded, 2);
}

#[test]
fn data_goes_to_every_downstream_but_the_in_face() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let egress = FakeEgress::default();
    let i = interest("/video/1", 1);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);
    pending(&mut pit, OTHER_DOWNSTREAM, &interest("/video/1", 2), SimTime::ZERO);
    pending(&mut pit, FaceId::LOCAL, &interest("/video/1", 3), SimTime::ZERO);
    let entry = pit.remove(token).expect("entry");

    let out = s.after_receive_data(&entry, OTHER_DOWNSTREAM, &data("/video/1"), &egress, SimTime::ZERO);

    assert!(out.wants_pass());
    let sent = drain(&mut s, SimTime::ZERO);
    assert_eq!(sent.sent_faces(), [DOWNSTREAM]);
    assert_eq!(s.stats().data_forwarded, 1);
}

#[test]
fn nack_waits_for_all_upstreams_then_propagates_least_severe_reason() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[FaceId(1), FaceId(2)]);
    let egress = FakeEgress::default();
    let i = interest("/video/1", 9);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);
    s.after_receive_interest(DOWNSTREAM, &i, token, &mut pit, &fib, &egress, SimTime::ZERO);
    drain(&mut s, SimTime::ZERO);

    let out = s.after_receive_nack(FaceId(1), &nack("/video/1", 9, NackReason::NoRoute), token, &mut pit, &egress, SimTime::ZERO);
    assert_eq!(out.rejected, None);

    // wrong nonce is ignored
    let out = s.after_receive_nack(FaceId(2), &nack("/video/1", 8, NackReason::Congestion), token, &mut pit, &egress, SimTime::ZERO);
    assert_eq!(out.rejected, None);

    let out = s.after_receive_nack(FaceId(2), &nack("/video/1", 9, NackReason::Congestion), token, &mut pit, &egress, SimTime::ZERO);
    assert_eq!(out.rejected, Some(NackReason::Congestion));

    let sent = drain(&mut s, SimTime::ZERO);
    match &sent.sent[..] {
        [(face, Packet::Nack(n))] => {
            assert_eq!(*face, DOWNSTREAM);
            assert_eq!(n.reason, NackReason::Congestion);
        }
        other => panic!("expected one nack, got {other:?}"),
    }
}

#[test]
fn dropped_interest_with_no_other_upstream_turns_into_congestion_nack() {
    // queue of one: the second Interest for the same face is rejected
    let config = QosConfig {
        queue_capacity_per_face: 1,
        ..QosConfig::default()
    };
    let mut s = QosStrategy::new(config, SimTime::ZERO).expect("valid");
    let mut pit = Pit::default();
    let fib = fib_with(&[UP]);
    let egress = FakeEgress::default();

    let a = interest("/video/a", 1);
    let ta = pending(&mut pit, DOWNSTREAM, &a, SimTime::ZERO);
    s.after_receive_interest(DOWNSTREAM, &a, ta, &mut pit, &fib, &egress, SimTime::ZERO);
    let b = interest("/video/b", 2);
    let tb = pending(&mut pit, DOWNSTREAM, &b, SimTime::ZERO);
    let out = s.after_receive_interest(DOWNSTREAM, &b, tb, &mut pit, &fib, &egress, SimTime::ZERO);
    assert_eq!(out.admission, Some(Admission::Dropped));

    let drops = s.scheduler_mut().take_drop_events();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].pit, tb);
    let out = s.on_dropped(&drops[0], &mut pit, &egress, SimTime::ZERO);

    assert_eq!(out.rejected, Some(NackReason::Congestion));
    assert!(pit.get(tb).expect("entry").out_records.is_empty());
    assert_eq!(s.stats().interests_dropped, 1);
    assert_eq!(s.scheduler().queued_on(DOWNSTREAM), 1);
}

#[test]
fn dropped_interest_after_other_upstream_nacked_propagates_that_nack() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[UP, FaceId(3)]);
    let egress = FakeEgress::default();
    let i = interest("/video/1", 9);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);
    s.after_receive_interest(DOWNSTREAM, &i, token, &mut pit, &fib, &egress, SimTime::ZERO);

    let out = s.after_receive_nack(UP, &nack("/video/1", 9, NackReason::NoRoute), token, &mut pit, &egress, SimTime::ZERO);
    assert_eq!(out.rejected, None);

    // the Interest still queued for face 3 never leaves
    assert_eq!(s.scheduler_mut().remove_face(FaceId(3)), 1);
    let drops = s.scheduler_mut().take_drop_events();
    assert_eq!(drops.len(), 1);
    let out = s.on_dropped(&drops[0], &mut pit, &egress, SimTime::ZERO);

    assert_eq!(out.rejected, Some(NackReason::NoRoute));
    let entry = pit.get(token).expect("entry");
    assert!(!entry.has_pending_out_records());
    let nacks: Vec<_> = drain(&mut s, SimTime::ZERO)
        .sent
        .into_iter()
        .filter_map(|(face, p)| match p {
            Packet::Nack(n) => Some((face, n.reason)),
            _ => None,
        })
        .collect();
    assert_eq!(nacks, [(DOWNSTREAM, NackReason::NoRoute)]);
}

#[test]
fn dropped_interest_waits_while_another_upstream_is_pending() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let fib = fib_with(&[UP, FaceId(3)]);
    let egress = FakeEgress::default();
    let i = interest("/video/1", 9);
    let token = pending(&mut pit, DOWNSTREAM, &i, SimTime::ZERO);
    s.after_receive_interest(DOWNSTREAM, &i, token, &mut pit, &fib, &egress, SimTime::ZERO);

    s.scheduler_mut().remove_face(FaceId(3));
    let drops = s.scheduler_mut().take_drop_events();
    let out = s.on_dropped(&drops[0], &mut pit, &egress, SimTime::ZERO);

    assert_eq!(out.rejected, None);
    let faces: Vec<_> = pit
        .get(token)
        .expect("entry")
        .out_records
        .iter()
        .map(|r| r.face)
        .collect();
    assert_eq!(faces, [UP]);
}

#[test]
fn dropped_data_is_only_counted() {
    let mut s = strategy();
    let mut pit = Pit::default();
    let egress = FakeEgress::default();
    s.scheduler_mut().submit_data(PitToken(1), UP, data("/video/1"), DOWNSTREAM, SimTime::ZERO);
    s.scheduler_mut().remove_face(DOWNSTREAM);
    let drops = s.scheduler_mut().take_drop_events();

    let out = s.on_dropped(&drops[0], &mut pit, &egress, SimTime::ZERO);
    assert_eq!(out.rejected, None);
    assert_eq!(s.stats().data_dropped, 1);
}
