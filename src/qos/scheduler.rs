//! Admission scheduler.
//!
//! Owns one [`PriorityTxQueue`] per egress face and one [`TokenBucket`] per
//! priority class. `submit_*` only classifies and enqueues; packets leave
//! through [`AdmissionScheduler::run_scheduling_pass`], which sweeps the faces
//! round-robin and releases a face's head packet only when the bucket of its
//! class can pay for it.
//!
//! Buckets are shared by every face of the node: the budget is per traffic
//! class, not per link. Nothing here blocks or fails at runtime; every packet
//! that is not sent is accounted for as a [`DropEvent`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::config::{CostModel, QosConfig};
use super::error::ConfigError;
use super::token_bucket::TokenBucket;
use crate::fw::PitToken;
use crate::net::{Data, FaceId, Interest, Nack, Name, Packet, PacketType};
use crate::queue::{PriorityClass, PriorityTxQueue, QueuedPacket, classify};
use crate::sim::SimTime;

/// Network-layer send primitive as seen by the scheduler.
pub trait Egress {
    /// Whether `face` still exists and can carry packets.
    fn is_up(&self, face: FaceId) -> bool;
    /// Fire-and-forget transmission.
    fn send(&mut self, face: FaceId, pkt: Packet);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Evicted from a full queue by a higher-priority arrival.
    PushedOut,
    /// Arrived at a full queue holding nothing of lower priority.
    Rejected,
    /// Egress face was torn down while the packet was queued.
    FaceGone,
    /// Blocked at the head of its queue for longer than `stale_after`.
    Stale,
    /// Costs more than its class bucket can ever hold.
    Oversize,
}

/// A packet the scheduler discarded, reported back so the strategy can keep
/// its pending-request bookkeeping straight.
#[derive(Debug, Clone)]
pub struct DropEvent {
    pub face: FaceId,
    pub pit: PitToken,
    pub packet_type: PacketType,
    pub class: PriorityClass,
    pub name: Name,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropStats {
    pub pushed_out: u64,
    pub rejected: u64,
    pub face_gone: u64,
    pub stale: u64,
    pub oversize: u64,
}

impl DropStats {
    pub fn total(&self) -> u64 {
        self.pushed_out + self.rejected + self.face_gone + self.stale + self.oversize
    }

    fn bump(&mut self, reason: DropReason) {
        let slot = match reason {
            DropReason::PushedOut => &mut self.pushed_out,
            DropReason::Rejected => &mut self.rejected,
            DropReason::FaceGone => &mut self.face_gone,
            DropReason::Stale => &mut self.stale,
            DropReason::Oversize => &mut self.oversize,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Result of a `submit_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued behind other packets on the face.
    Queued,
    /// Queued on a face that was idle; an immediate pass will send it with
    /// minimal added latency.
    QueuedOnIdleFace,
    /// Not queued (full queue, or no face to queue on).
    Dropped,
}

impl Admission {
    pub fn wants_pass(self) -> bool {
        self == Admission::QueuedOnIdleFace
    }

    /// Combines the outcomes of several submits: the most actionable wins.
    pub fn merge(self, other: Admission) -> Admission {
        use Admission::*;
        match (self, other) {
            (QueuedOnIdleFace, _) | (_, QueuedOnIdleFace) => QueuedOnIdleFace,
            (Queued, _) | (_, Queued) => Queued,
            (Dropped, Dropped) => Dropped,
        }
    }
}

/// What one scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub sent: usize,
    pub dropped: usize,
    /// Faces left with packets because their head could not be paid for.
    pub blocked_faces: usize,
}

enum Head {
    Admitted(QueuedPacket),
    Blocked,
    Empty,
}

#[derive(Debug, Default)]
struct DropLedger {
    stats: DropStats,
    events: Vec<DropEvent>,
}

impl DropLedger {
    fn record(&mut self, face: FaceId, qp: QueuedPacket, reason: DropReason) {
        debug!(
            %face,
            name = %qp.packet.name(),
            packet_type = %qp.packet_type(),
            class = qp.class.0,
            ?reason,
            "packet dropped"
        );
        self.stats.bump(reason);
        self.events.push(DropEvent {
            face,
            pit: qp.pit,
            packet_type: qp.packet_type(),
            class: qp.class,
            name: qp.packet.name().clone(),
            reason,
        });
    }
}

#[derive(Debug)]
pub struct AdmissionScheduler {
    config: QosConfig,
    buckets: Vec<TokenBucket>,
    faces: BTreeMap<FaceId, PriorityTxQueue>,
    rr_offset: usize,
    sent_per_class: Vec<u64>,
    drops: DropLedger,
}

impl AdmissionScheduler {
    /// Builds the scheduler, refusing configurations that cannot be honoured.
    pub fn new(config: QosConfig, now: SimTime) -> Result<Self, ConfigError> {
        config.validate()?;
        let buckets = config
            .buckets
            .iter()
            .enumerate()
            .map(|(class, b)| TokenBucket::new(b, class, now))
            .collect::<Result<Vec<_>, _>>()?;
        let classes = config.priority_class_count;
        Ok(Self {
            config,
            buckets,
            faces: BTreeMap::new(),
            rr_offset: 0,
            sent_per_class: vec![0; classes],
            drops: DropLedger::default(),
        })
    }

    pub fn config(&self) -> &QosConfig {
        &self.config
    }

    pub fn classify(&self, pkt: &Packet) -> PriorityClass {
        classify(pkt, self.config.priority_class_count)
    }

    pub fn cost_of(&self, pkt: &Packet) -> u64 {
        match self.config.cost_model {
            CostModel::PerPacket => 1,
            CostModel::PerByte => u64::from(pkt.size_bytes()),
        }
    }

    #[tracing::instrument(skip(self, pkt), fields(name = %pkt.name(), packet_type = %pkt.packet_type()))]
    fn submit(
        &mut self,
        pit: PitToken,
        in_face: FaceId,
        pkt: Packet,
        out_face: FaceId,
        now: SimTime,
    ) -> Admission {
        let class = self.classify(&pkt);
        let cost = self.cost_of(&pkt);
        let qp = QueuedPacket {
            packet: pkt,
            pit,
            in_face,
            class,
            cost,
            enqueued_at: now,
        };

        let capacity = self.config.queue_capacity_per_face;
        let classes = self.config.priority_class_count;
        let queue = self
            .faces
            .entry(out_face)
            .or_insert_with(|| PriorityTxQueue::new(capacity, classes));
        let was_idle = queue.is_empty();

        match queue.enqueue(qp) {
            Ok(None) => {
                trace!(class = class.0, q_len = queue.len(), "queued");
                if was_idle {
                    Admission::QueuedOnIdleFace
                } else {
                    Admission::Queued
                }
            }
            Ok(Some(victim)) => {
                self.drops.record(out_face, victim, DropReason::PushedOut);
                Admission::Queued
            }
            Err(rejected) => {
                self.drops.record(out_face, rejected, DropReason::Rejected);
                Admission::Dropped
            }
        }
    }

    /// Queues an Interest for `out_face`.
    pub fn submit_interest(
        &mut self,
        pit: PitToken,
        in_face: FaceId,
        interest: Interest,
        out_face: FaceId,
        now: SimTime,
    ) -> Admission {
        self.submit(pit, in_face, Packet::Interest(interest), out_face, now)
    }

    /// Queues a Data for `out_face`. If it is later pushed out, the drop event
    /// carries `pit` so the strategy learns about it.
    pub fn submit_data(
        &mut self,
        pit: PitToken,
        in_face: FaceId,
        data: Data,
        out_face: FaceId,
        now: SimTime,
    ) -> Admission {
        self.submit(pit, in_face, Packet::Data(data), out_face, now)
    }

    /// Queues one copy of `nack` per downstream face.
    pub fn submit_nack(
        &mut self,
        pit: PitToken,
        in_face: FaceId,
        nack: Nack,
        downstream: &[FaceId],
        now: SimTime,
    ) -> Admission {
        downstream.iter().fold(Admission::Dropped, |acc, &face| {
            let admission = self.submit(pit, in_face, Packet::Nack(nack.clone()), face, now);
            acc.merge(admission)
        })
    }

    fn admit_head(&mut self, face: FaceId, now: SimTime) -> Head {
        let Some(queue) = self.faces.get_mut(&face) else {
            return Head::Empty;
        };
        let stale_after = self.config.stale_after();
        loop {
            let Some(head) = queue.peek() else {
                return Head::Empty;
            };
            let (class, cost, enqueued_at) = (head.class, head.cost, head.enqueued_at);
            let bucket = &mut self.buckets[class.index()];

            if !bucket.can_ever_admit(cost) {
                let qp = queue.dequeue().expect("peeked head");
                self.drops.record(face, qp, DropReason::Oversize);
                continue;
            }
            if bucket.try_consume(cost, now) {
                return Head::Admitted(queue.dequeue().expect("peeked head"));
            }
            match stale_after {
                Some(limit) if now.saturating_since(enqueued_at) > limit => {
                    let qp = queue.dequeue().expect("peeked head");
                    self.drops.record(face, qp, DropReason::Stale);
                }
                _ => return Head::Blocked,
            }
        }
    }

    /// One non-blocking sweep.
    ///
    /// Queues of faces that `egress` reports down are discarded first. The
    /// remaining non-empty faces are then visited round-robin, one head packet
    /// per visit, starting from a different face on every pass. A face whose
    /// head cannot be paid for sits out the rest of the pass; sweeping stops
    /// once a full round sends nothing.
    #[tracing::instrument(skip(self, egress))]
    pub fn run_scheduling_pass(&mut self, now: SimTime, egress: &mut dyn Egress) -> PassReport {
        let mut report = PassReport::default();
        let dropped_before = self.drops.stats.total();

        let gone: Vec<FaceId> = self
            .faces
            .keys()
            .copied()
            .filter(|&f| !egress.is_up(f))
            .collect();
        for face in gone {
            warn!(%face, "egress face gone, discarding its queue");
            self.remove_face(face);
        }

        let mut order: Vec<FaceId> = self
            .faces
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(&f, _)| f)
            .collect();
        if !order.is_empty() {
            let start = self.rr_offset % order.len();
            order.rotate_left(start);
        }
        self.rr_offset = self.rr_offset.wrapping_add(1);

        let mut done = vec![false; order.len()];
        loop {
            let mut progressed = false;
            for (i, &face) in order.iter().enumerate() {
                if done[i] {
                    continue;
                }
                match self.admit_head(face, now) {
                    Head::Admitted(qp) => {
                        let class = qp.class.index();
                        self.sent_per_class[class] = self.sent_per_class[class].saturating_add(1);
                        trace!(%face, name = %qp.packet.name(), class, "admitted");
                        egress.send(face, qp.packet);
                        report.sent += 1;
                        progressed = true;
                    }
                    Head::Blocked => {
                        report.blocked_faces += 1;
                        done[i] = true;
                    }
                    Head::Empty => done[i] = true,
                }
            }
            if !progressed {
                break;
            }
        }

        let dropped = self.drops.stats.total() - dropped_before;
        report.dropped = usize::try_from(dropped).unwrap_or(usize::MAX);
        debug!(
            sent = report.sent,
            dropped = report.dropped,
            blocked = report.blocked_faces,
            backlog = self.backlog(),
            "scheduling pass done"
        );
        report
    }

    /// Forgets `face`, dropping whatever was queued on it. Returns how many
    /// packets were discarded.
    pub fn remove_face(&mut self, face: FaceId) -> usize {
        let Some(mut queue) = self.faces.remove(&face) else {
            return 0;
        };
        let pkts = queue.drain();
        let n = pkts.len();
        for qp in pkts {
            self.drops.record(face, qp, DropReason::FaceGone);
        }
        n
    }

    /// Drop events recorded since the last call.
    pub fn take_drop_events(&mut self) -> Vec<DropEvent> {
        std::mem::take(&mut self.drops.events)
    }

    /// Total packets discarded so far. Observability only.
    pub fn drop_count(&self) -> u64 {
        self.drops.stats.total()
    }

    pub fn drop_stats(&self) -> DropStats {
        self.drops.stats
    }

    pub fn sent_per_class(&self) -> &[u64] {
        &self.sent_per_class
    }

    pub fn bucket(&self, class: PriorityClass) -> Option<&TokenBucket> {
        self.buckets.get(class.index())
    }

    pub fn queue(&self, face: FaceId) -> Option<&PriorityTxQueue> {
        self.faces.get(&face)
    }

    pub fn queued_on(&self, face: FaceId) -> usize {
        self.faces.get(&face).map_or(0, PriorityTxQueue::len)
    }

    pub fn has_face(&self, face: FaceId) -> bool {
        self.faces.contains_key(&face)
    }

    /// Packets queued over all faces.
    pub fn backlog(&self) -> usize {
        self.faces.values().map(PriorityTxQueue::len).sum()
    }

    /// Earliest time a pass can do something with the current heads: one of
    /// them becomes affordable or goes stale. `None` without backlog.
    pub fn next_admission_time(&self, now: SimTime) -> Option<SimTime> {
        let stale_after = self.config.stale_after();
        self.faces
            .values()
            .filter_map(PriorityTxQueue::peek)
            .map(|head| {
                // an oversize head is dropped by the very next pass
                let paid = self.buckets[head.class.index()]
                    .wait_time(head.cost, now)
                    .map_or(now, |w| now.saturating_add(w));
                match stale_after {
                    Some(limit) => {
                        let stale = head.enqueued_at.saturating_add(limit).saturating_add(SimTime(1));
                        paid.min(stale.max(now))
                    }
                    None => paid,
                }
            })
            .min()
    }
}
