//! 队列策略（Queue disciplines）
//!
//! 每个出口 face 一个多优先级类别的发送队列，满时采用 push-out 丢弃策略。

use serde::{Deserialize, Serialize};

use crate::fw::PitToken;
use crate::net::{FaceId, Packet, PacketType};
use crate::sim::SimTime;

mod priority;

pub use priority::PriorityTxQueue;

/// A priority class. Lower numbers drain first; class 0 is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PriorityClass(pub u8);

impl PriorityClass {
    pub const HIGHEST: PriorityClass = PriorityClass(0);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn is_higher_than(self, other: PriorityClass) -> bool {
        self.0 < other.0
    }

    /// Lowest class for a scheduler with `class_count` classes.
    pub fn lowest(class_count: usize) -> PriorityClass {
        PriorityClass(u8::try_from(class_count.saturating_sub(1)).unwrap_or(u8::MAX))
    }
}

/// Default classification.
///
/// Data and Nack complete requests that already consumed upstream resources,
/// so they always go to class 0. Interests take their priority tag clamped to
/// `1..=class_count-1`; untagged Interests land in the lowest class. With a
/// single class everything shares class 0.
pub fn classify(pkt: &Packet, class_count: usize) -> PriorityClass {
    let lowest = PriorityClass::lowest(class_count);
    match pkt {
        Packet::Data(_) | Packet::Nack(_) => PriorityClass::HIGHEST,
        Packet::Interest(_) if lowest == PriorityClass::HIGHEST => PriorityClass::HIGHEST,
        Packet::Interest(i) => match i.priority {
            Some(tag) => PriorityClass(tag.clamp(1, lowest.0)),
            None => lowest,
        },
    }
}

/// A packet waiting on an outgoing face.
#[derive(Debug, Clone)]
pub struct QueuedPacket {
    pub packet: Packet,
    /// Pending-request handle, passed back untouched on send or drop.
    pub pit: PitToken,
    pub in_face: FaceId,
    pub class: PriorityClass,
    /// Tokens this packet will take from its class bucket.
    pub cost: u64,
    pub enqueued_at: SimTime,
}

impl QueuedPacket {
    pub fn packet_type(&self) -> PacketType {
        self.packet.packet_type()
    }
}
