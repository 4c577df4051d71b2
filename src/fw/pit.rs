//! Pending interest table.
//!
//! Entries are keyed by exact Interest name and addressed through
//! [`PitToken`] handles, which the admission scheduler carries around without
//! interpreting. A token whose entry has been removed simply stops resolving.

use std::collections::HashMap;

use crate::net::{FaceId, Interest, NackReason, Name};
use crate::sim::SimTime;

/// Opaque handle to a PIT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitToken(pub u64);

#[derive(Debug, Clone)]
pub struct InRecord {
    pub face: FaceId,
    pub nonce: u32,
    pub interest: Interest,
    pub expiry: SimTime,
}

#[derive(Debug, Clone)]
pub struct OutRecord {
    pub face: FaceId,
    pub nonce: u32,
    pub last_sent: SimTime,
    pub nacked: Option<NackReason>,
}

#[derive(Debug, Clone)]
pub struct PitEntry {
    pub token: PitToken,
    pub name: Name,
    pub in_records: Vec<InRecord>,
    pub out_records: Vec<OutRecord>,
    /// Current retransmission suppression interval, grown by the suppression
    /// policy on every forwarded retransmission.
    pub retx_interval: Option<SimTime>,
}

impl PitEntry {
    /// Latest expiry over all in-records.
    pub fn expiry(&self) -> SimTime {
        self.in_records
            .iter()
            .map(|r| r.expiry)
            .max()
            .unwrap_or(SimTime::ZERO)
    }

    /// True when `nonce` was already seen from a face other than `face`.
    pub fn is_looping(&self, nonce: u32, face: FaceId) -> bool {
        self.in_records
            .iter()
            .any(|r| r.nonce == nonce && r.face != face)
            || self.out_records.iter().any(|r| r.nonce == nonce)
    }

    pub fn insert_in_record(&mut self, face: FaceId, interest: &Interest, now: SimTime) {
        let expiry = now.saturating_add(interest.lifetime);
        match self.in_records.iter_mut().find(|r| r.face == face) {
            Some(r) => {
                r.nonce = interest.nonce;
                r.interest = interest.clone();
                r.expiry = expiry;
            }
            None => self.in_records.push(InRecord {
                face,
                nonce: interest.nonce,
                interest: interest.clone(),
                expiry,
            }),
        }
    }

    pub fn insert_out_record(&mut self, face: FaceId, nonce: u32, now: SimTime) {
        match self.out_records.iter_mut().find(|r| r.face == face) {
            Some(r) => {
                r.nonce = nonce;
                r.last_sent = now;
                r.nacked = None;
            }
            None => self.out_records.push(OutRecord {
                face,
                nonce,
                last_sent: now,
                nacked: None,
            }),
        }
    }

    pub fn out_record_mut(&mut self, face: FaceId) -> Option<&mut OutRecord> {
        self.out_records.iter_mut().find(|r| r.face == face)
    }

    pub fn remove_out_record(&mut self, face: FaceId) {
        self.out_records.retain(|r| r.face != face);
    }

    pub fn has_pending_out_records(&self) -> bool {
        self.out_records.iter().any(|r| r.nacked.is_none())
    }

    pub fn last_outgoing(&self) -> Option<SimTime> {
        self.out_records.iter().map(|r| r.last_sent).max()
    }

    /// Faces that asked for this name, in arrival order.
    pub fn downstream_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.in_records.iter().map(|r| r.face)
    }
}

#[derive(Debug, Default)]
pub struct Pit {
    by_name: HashMap<Name, PitToken>,
    entries: HashMap<PitToken, PitEntry>,
    next_token: u64,
}

impl Pit {
    /// Finds or creates the entry for `interest.name`. Returns the token and
    /// whether the entry was newly created.
    pub fn find_or_insert(&mut self, interest: &Interest) -> (PitToken, bool) {
        if let Some(&token) = self.by_name.get(&interest.name) {
            return (token, false);
        }
        let token = PitToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.by_name.insert(interest.name.clone(), token);
        self.entries.insert(
            token,
            PitEntry {
                token,
                name: interest.name.clone(),
                in_records: Vec::new(),
                out_records: Vec::new(),
                retx_interval: None,
            },
        );
        (token, true)
    }

    pub fn find_exact(&self, name: &Name) -> Option<PitToken> {
        self.by_name.get(name).copied()
    }

    /// Entries whose name is a prefix of `data_name`, longest first.
    pub fn find_matching(&self, data_name: &Name) -> Vec<PitToken> {
        (0..=data_name.len())
            .rev()
            .filter_map(|n| self.by_name.get(&data_name.prefix(n)).copied())
            .collect()
    }

    pub fn get(&self, token: PitToken) -> Option<&PitEntry> {
        self.entries.get(&token)
    }

    pub fn get_mut(&mut self, token: PitToken) -> Option<&mut PitEntry> {
        self.entries.get_mut(&token)
    }

    pub fn remove(&mut self, token: PitToken) -> Option<PitEntry> {
        let entry = self.entries.remove(&token)?;
        self.by_name.remove(&entry.name);
        Some(entry)
    }

    /// Removes the entry if it has expired by `now`.
    pub fn expire(&mut self, token: PitToken, now: SimTime) -> Option<PitEntry> {
        let expired = self.entries.get(&token)?.expiry() <= now;
        if expired { self.remove(token) } else { None }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
