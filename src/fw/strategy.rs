//! QoS forwarding strategy.
//!
//! Forwards every Interest to all eligible FIB next hops, sends Data back to
//! every downstream that asked for it and propagates Nacks once every upstream
//! has nacked. Nothing is sent directly: all packets go through the node's
//! [`AdmissionScheduler`].
//!
//! Local application faces are never handed to the scheduler. When a request
//! ends in a Nack, the strategy reports the reason through
//! [`Outcome::rejected`] and the forwarder finalizes the entry and informs
//! local apps.

use serde::Serialize;
use tracing::{debug, trace};

use super::fib::Fib;
use super::pit::{Pit, PitEntry, PitToken};
use super::retx::{RetxDecision, RetxSuppression};
use crate::net::{Data, FaceId, Interest, Nack, NackReason, PacketType};
use crate::qos::{Admission, AdmissionScheduler, ConfigError, DropEvent, Egress, QosConfig};
use crate::sim::SimTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyStats {
    pub interests_forwarded: u64,
    pub interests_suppressed: u64,
    pub no_route: u64,
    pub data_forwarded: u64,
    pub nacks_sent: u64,
    pub interests_dropped: u64,
    pub data_dropped: u64,
    pub nacks_dropped: u64,
}

/// What a strategy hook did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Combined admission of everything handed to the scheduler, `None` if
    /// nothing was.
    pub admission: Option<Admission>,
    /// The request is finished with a Nack of this reason; the caller should
    /// remove the PIT entry and tell local downstreams.
    pub rejected: Option<NackReason>,
}

impl Outcome {
    pub fn wants_pass(&self) -> bool {
        self.admission.is_some_and(Admission::wants_pass)
    }

    fn admitted(&mut self, a: Admission) {
        self.admission = Some(self.admission.map_or(a, |cur| cur.merge(a)));
    }
}

#[derive(Debug)]
pub struct QosStrategy {
    scheduler: AdmissionScheduler,
    retx: RetxSuppression,
    stats: StrategyStats,
}

impl QosStrategy {
    pub fn new(config: QosConfig, now: SimTime) -> Result<Self, ConfigError> {
        Ok(Self {
            scheduler: AdmissionScheduler::new(config, now)?,
            retx: RetxSuppression::default(),
            stats: StrategyStats::default(),
        })
    }

    pub fn with_retx_suppression(mut self, retx: RetxSuppression) -> Self {
        self.retx = retx;
        self
    }

    pub fn scheduler(&self) -> &AdmissionScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut AdmissionScheduler {
        &mut self.scheduler
    }

    pub fn stats(&self) -> StrategyStats {
        self.stats
    }

    #[tracing::instrument(skip_all, fields(name = %interest.name, %in_face))]
    #[allow(clippy::too_many_arguments)]
    pub fn after_receive_interest(
        &mut self,
        in_face: FaceId,
        interest: &Interest,
        token: PitToken,
        pit: &mut Pit,
        fib: &Fib,
        faces: &dyn Egress,
        now: SimTime,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        let Some(entry) = pit.get_mut(token) else {
            return outcome;
        };

        if self.retx.decide(entry, now) == RetxDecision::Suppress {
            trace!("retransmission suppressed");
            self.stats.interests_suppressed += 1;
            return outcome;
        }

        let mut forwarded = false;
        for hop in fib.next_hops(&interest.name) {
            if hop.face == in_face || hop.face.is_local() || !faces.is_up(hop.face) {
                continue;
            }
            let admission =
                self.scheduler
                    .submit_interest(token, in_face, interest.clone(), hop.face, now);
            entry.insert_out_record(hop.face, interest.nonce, now);
            outcome.admitted(admission);
            self.stats.interests_forwarded += 1;
            forwarded = true;
        }

        if !forwarded {
            debug!("no eligible next hop");
            self.stats.no_route += 1;
            self.reject(entry, NackReason::NoRoute, faces, now, &mut outcome);
        }
        outcome
    }

    /// Sends `data` to every downstream of the satisfied entry except the face
    /// it came from.
    #[tracing::instrument(skip_all, fields(name = %data.name, %in_face))]
    pub fn after_receive_data(
        &mut self,
        entry: &PitEntry,
        in_face: FaceId,
        data: &Data,
        faces: &dyn Egress,
        now: SimTime,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        for face in entry.downstream_faces() {
            if face == in_face || face.is_local() || !faces.is_up(face) {
                continue;
            }
            let admission = self
                .scheduler
                .submit_data(entry.token, in_face, data.clone(), face, now);
            outcome.admitted(admission);
            self.stats.data_forwarded += 1;
        }
        outcome
    }

    /// Records the Nack on its out-record. Once no upstream is still pending,
    /// the least severe reason seen is propagated downstream.
    #[tracing::instrument(skip_all, fields(name = %nack.interest.name, %in_face, reason = ?nack.reason))]
    pub fn after_receive_nack(
        &mut self,
        in_face: FaceId,
        nack: &Nack,
        token: PitToken,
        pit: &mut Pit,
        faces: &dyn Egress,
        now: SimTime,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        let Some(entry) = pit.get_mut(token) else {
            return outcome;
        };
        let Some(out) = entry.out_record_mut(in_face) else {
            trace!("nack from a face we never forwarded to");
            return outcome;
        };
        if out.nonce != nack.interest.nonce {
            trace!("nack for an outdated nonce");
            return outcome;
        }
        out.nacked = Some(nack.reason);

        if entry.has_pending_out_records() {
            return outcome;
        }
        let reason = least_severe_nack(entry).unwrap_or(nack.reason);
        self.reject(entry, reason, faces, now, &mut outcome);
        outcome
    }

    /// Bookkeeping for a packet the scheduler discarded. A dropped Interest
    /// loses its out-record. If no upstream is left pending, downstreams get
    /// the least severe Nack already seen, or a congestion Nack if there was
    /// none.
    pub fn on_dropped(
        &mut self,
        event: &DropEvent,
        pit: &mut Pit,
        faces: &dyn Egress,
        now: SimTime,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        match event.packet_type {
            PacketType::Data => self.stats.data_dropped += 1,
            PacketType::Nack => self.stats.nacks_dropped += 1,
            PacketType::Interest => {
                self.stats.interests_dropped += 1;
                let Some(entry) = pit.get_mut(event.pit) else {
                    return outcome;
                };
                entry.remove_out_record(event.face);
                if !entry.has_pending_out_records() {
                    let reason = least_severe_nack(entry).unwrap_or(NackReason::Congestion);
                    self.reject(entry, reason, faces, now, &mut outcome);
                }
            }
        }
        outcome
    }

    fn reject(
        &mut self,
        entry: &PitEntry,
        reason: NackReason,
        faces: &dyn Egress,
        now: SimTime,
        outcome: &mut Outcome,
    ) {
        outcome.rejected = Some(reason);
        // Each downstream gets the Interest it sent, so its nonce matches.
        for rec in &entry.in_records {
            if rec.face.is_local() || !faces.is_up(rec.face) {
                continue;
            }
            let nack = Nack::new(rec.interest.clone(), reason);
            let admission =
                self.scheduler
                    .submit_nack(entry.token, FaceId::LOCAL, nack, &[rec.face], now);
            outcome.admitted(admission);
            self.stats.nacks_sent += 1;
        }
    }
}

fn least_severe_nack(entry: &PitEntry) -> Option<NackReason> {
    entry
        .out_records
        .iter()
        .filter_map(|r| r.nacked)
        .reduce(|a, b| if b.is_less_severe_than(a) { b } else { a })
}
