//! Shared fixtures for the unit tests.

use std::collections::HashSet;

use crate::fw::PitToken;
use crate::net::{Data, FaceId, Interest, Nack, NackReason, Name, Packet};
use crate::qos::Egress;
use crate::sim::SimTime;

/// Records sends instead of transmitting; faces are up unless marked down.
#[derive(Debug, Default)]
pub(crate) struct FakeEgress {
    pub down: HashSet<FaceId>,
    pub sent: Vec<(FaceId, Packet)>,
}

impl FakeEgress {
    pub fn sent_names(&self) -> Vec<String> {
        self.sent.iter().map(|(_, p)| p.name().to_string()).collect()
    }

    pub fn sent_faces(&self) -> Vec<FaceId> {
        self.sent.iter().map(|(f, _)| *f).collect()
    }
}

impl Egress for FakeEgress {
    fn is_up(&self, face: FaceId) -> bool {
        !self.down.contains(&face)
    }

    fn send(&mut self, face: FaceId, pkt: Packet) {
        self.sent.push((face, pkt));
    }
}

pub(crate) fn name(uri: &str) -> Name {
    Name::from_uri(uri)
}

pub(crate) fn interest(uri: &str, nonce: u32) -> Interest {
    Interest::new(name(uri), nonce, SimTime::from_millis(1000))
}

pub(crate) fn tagged(uri: &str, nonce: u32, priority: u8) -> Interest {
    interest(uri, nonce).with_priority(priority)
}

pub(crate) fn data(uri: &str) -> Data {
    Data::new(name(uri), 100)
}

pub(crate) fn nack(uri: &str, nonce: u32, reason: NackReason) -> Nack {
    Nack::new(interest(uri, nonce), reason)
}

pub(crate) const T: PitToken = PitToken(7);
pub(crate) const DOWN: FaceId = FaceId(1);
pub(crate) const UP: FaceId = FaceId(2);
