use super::support::{T, data, interest, name};
use crate::net::{FaceId, Packet};
use crate::queue::{PriorityClass, PriorityTxQueue, QueuedPacket, classify};
use crate::sim::SimTime;

fn qp(pkt: Packet, class: u8) -> QueuedPacket {
    QueuedPacket {
        packet: pkt,
        pit: T,
        in_face: FaceId(0),
        class: PriorityClass(class),
        cost: 1,
        enqueued_at: SimTime::ZERO,
    }
}

fn i(uri: &str, class: u8) -> QueuedPacket {
    qp(Packet::Interest(interest(uri, 1)), class)
}

fn drain_names(q: &mut PriorityTxQueue) -> Vec<String> {
    std::iter::from_fn(|| q.dequeue())
        .map(|p| p.packet.name().to_string())
        .collect()
}

#[test]
fn strict_priority_then_fifo_within_class() {
    let mut q = PriorityTxQueue::new(10, 3);
    for (uri, class) in [("/l1", 2), ("/m1", 1), ("/l2", 2), ("/h1", 0), ("/m2", 1), ("/h2", 0)] {
        assert!(matches!(q.enqueue(i(uri, class)), Ok(None)));
    }
    assert_eq!(q.len(), 6);
    assert_eq!(q.len_of(PriorityClass(1)), 2);
    assert_eq!(q.peek().map(|p| p.packet.name().clone()), Some(name("/h1")));
    assert_eq!(drain_names(&mut q), ["/h1", "/h2", "/m1", "/m2", "/l1", "/l2"]);
    assert!(q.is_empty());
}

#[test]
fn full_queue_pushes_out_oldest_of_lowest_class() {
    let mut q = PriorityTxQueue::new(3, 3);
    q.enqueue(i("/m1", 1)).expect("room");
    q.enqueue(i("/l1", 2)).expect("room");
    q.enqueue(i("/l2", 2)).expect("room");
    assert!(q.is_full());

    let victim = q
        .enqueue(qp(Packet::Data(data("/d")), 0))
        .expect("higher class is admitted")
        .expect("something was pushed out");
    assert_eq!(victim.packet.name(), &name("/l1"));
    assert_eq!(q.len(), 3);
    assert_eq!(drain_names(&mut q), ["/d", "/m1", "/l2"]);
}

#[test]
fn full_queue_rejects_arrival_without_lower_class_to_evict() {
    let mut q = PriorityTxQueue::new(2, 3);
    q.enqueue(i("/m1", 1)).expect("room");
    q.enqueue(i("/m2", 1)).expect("room");

    // same class: nothing strictly lower to evict
    let back = q.enqueue(i("/m3", 1)).expect_err("rejected");
    assert_eq!(back.packet.name(), &name("/m3"));
    // lower class
    assert!(q.enqueue(i("/l1", 2)).is_err());

    assert_eq!(q.len(), 2);
    assert_eq!(drain_names(&mut q), ["/m1", "/m2"]);
}

#[test]
fn drain_empties_highest_class_first() {
    let mut q = PriorityTxQueue::new(4, 2);
    q.enqueue(i("/b", 1)).expect("room");
    q.enqueue(i("/a", 0)).expect("room");
    let all: Vec<_> = q.drain().into_iter().map(|p| p.packet.name().to_string()).collect();
    assert_eq!(all, ["/a", "/b"]);
    assert_eq!(q.len(), 0);
    assert!(q.dequeue().is_none());
}

#[test]
fn classification_defaults() {
    let tagged = |p: u8| Packet::Interest(interest("/x", 1).with_priority(p));
    let untagged = Packet::Interest(interest("/x", 1));
    let d = Packet::Data(data("/x"));
    let n = Packet::Nack(super::support::nack("/x", 1, crate::net::NackReason::Congestion));

    assert_eq!(classify(&d, 3), PriorityClass(0));
    assert_eq!(classify(&n, 3), PriorityClass(0));
    assert_eq!(classify(&tagged(1), 3), PriorityClass(1));
    // Interests never share the response class
    assert_eq!(classify(&tagged(0), 3), PriorityClass(1));
    assert_eq!(classify(&tagged(9), 3), PriorityClass(2));
    assert_eq!(classify(&untagged, 3), PriorityClass(2));

    assert_eq!(classify(&untagged, 1), PriorityClass(0));
    assert_eq!(classify(&tagged(5), 1), PriorityClass(0));
    assert_eq!(classify(&untagged, 2), PriorityClass(1));
}
