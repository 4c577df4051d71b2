//! Forwarding node.
//!
//! Owns the FIB, the PIT, the [`QosStrategy`] (and through it the admission
//! scheduler) and the node's local applications. Incoming packets are run
//! through the PIT and handed to the strategy; the strategy's outcomes and the
//! scheduler's drop events are then settled here until nothing is left to do.

use serde::Serialize;
use tracing::{debug, trace};

use super::fib::Fib;
use super::pit::{Pit, PitToken};
use super::strategy::{Outcome, QosStrategy};
use crate::app::{Consumer, ConsumerConfig, ConsumerTick, ConsumerTimeout, Producer};
use crate::net::{
    Data, FaceId, Interest, Nack, NackReason, Name, NetEgress, Network, NodeId, Packet,
    SchedulerTick, SchedulingPass, net_world,
};
use crate::qos::{AdmissionScheduler, ConfigError, QosConfig};
use crate::sim::{Event, SimTime, Simulator, World};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub interests_in: u64,
    pub data_in: u64,
    pub nacks_in: u64,
    pub unsolicited_data: u64,
    pub loops_detected: u64,
    pub pit_expired: u64,
}

#[derive(Debug)]
pub struct Forwarder {
    id: NodeId,
    name: String,
    pub fib: Fib,
    pub pit: Pit,
    strategy: QosStrategy,
    tick_interval: SimTime,
    producers: Vec<Producer>,
    consumers: Vec<Consumer>,
    /// A `SchedulingPass` is already scheduled for this node.
    pub(crate) pass_pending: bool,
    /// When the live `SchedulerTick` fires; earlier-superseded ticks are
    /// ignored.
    pub(crate) tick_at: Option<SimTime>,
    pub stats: NodeStats,
}

impl Forwarder {
    pub fn new(id: NodeId, name: impl Into<String>, qos: QosConfig) -> Result<Self, ConfigError> {
        let tick_interval = qos.tick_interval();
        Ok(Self {
            id,
            name: name.into(),
            fib: Fib::default(),
            pit: Pit::default(),
            strategy: QosStrategy::new(qos, SimTime::ZERO)?,
            tick_interval,
            producers: Vec::new(),
            consumers: Vec::new(),
            pass_pending: false,
            tick_at: None,
            stats: NodeStats::default(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> &QosStrategy {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut QosStrategy {
        &mut self.strategy
    }

    pub fn scheduler(&self) -> &AdmissionScheduler {
        self.strategy.scheduler()
    }

    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    pub fn producers(&self) -> &[Producer] {
        &self.producers
    }

    pub fn add_producer(&mut self, producer: Producer) {
        self.producers.push(producer);
    }

    /// Registers a consumer and returns its application index. The caller
    /// schedules its first [`ConsumerTick`].
    pub fn add_consumer(&mut self, config: ConsumerConfig) -> usize {
        let app = self.consumers.len();
        let salt = ((self.id.0 as u64) << 32) | app as u64;
        self.consumers.push(Consumer::new(config, salt));
        app
    }

    #[tracing::instrument(skip_all, fields(node = %self.name, %face, name = %pkt.name()))]
    pub fn on_packet(&mut self, face: FaceId, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        match pkt {
            Packet::Interest(interest) => {
                self.stats.interests_in += 1;
                self.on_incoming_interest(face, interest, sim, net);
            }
            Packet::Data(data) => {
                self.stats.data_in += 1;
                self.on_incoming_data(face, data, sim, net);
            }
            Packet::Nack(nack) => {
                self.stats.nacks_in += 1;
                self.on_incoming_nack(face, nack, sim, net);
            }
        }
    }

    fn on_incoming_interest(
        &mut self,
        in_face: FaceId,
        interest: Interest,
        sim: &mut Simulator,
        net: &mut Network,
    ) {
        let now = sim.now();
        let (token, _) = self.pit.find_or_insert(&interest);
        let entry = self.pit.get_mut(token).expect("entry just found or inserted");

        if entry.is_looping(interest.nonce, in_face) {
            debug!(nonce = interest.nonce, "duplicate nonce, loop detected");
            self.stats.loops_detected += 1;
            if !in_face.is_local() && net.is_up(in_face) {
                let nack = Nack::new(interest, NackReason::Duplicate);
                let admission = self.strategy.scheduler_mut().submit_nack(
                    token,
                    FaceId::LOCAL,
                    nack,
                    &[in_face],
                    now,
                );
                let outcome = Outcome {
                    admission: Some(admission),
                    rejected: None,
                };
                self.settle(vec![(token, outcome)], sim, net);
            }
            return;
        }

        entry.insert_in_record(in_face, &interest, now);
        sim.schedule(
            entry.expiry(),
            PitExpiry {
                node: self.id,
                token,
            },
        );

        if let Some(producer) = self.producers.iter_mut().find(|p| p.serves(&interest.name)) {
            trace!(prefix = %producer.prefix(), "answered by local producer");
            let data = producer.produce(&interest);
            self.on_incoming_data(FaceId::LOCAL, data, sim, net);
            return;
        }

        let outcome = {
            let egress = NetEgress::new(net, sim, self.id);
            self.strategy.after_receive_interest(
                in_face,
                &interest,
                token,
                &mut self.pit,
                &self.fib,
                &egress,
                now,
            )
        };
        self.settle(vec![(token, outcome)], sim, net);
    }

    fn on_incoming_data(&mut self, in_face: FaceId, data: Data, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        let tokens = self.pit.find_matching(&data.name);
        if tokens.is_empty() {
            trace!("unsolicited data");
            self.stats.unsolicited_data += 1;
            return;
        }

        let mut pending = Vec::with_capacity(tokens.len());
        for token in tokens {
            let Some(entry) = self.pit.remove(token) else {
                continue;
            };
            if entry.in_records.iter().any(|r| r.face.is_local()) {
                self.satisfy_local(&entry.name, now, net);
            }
            let outcome = {
                let egress = NetEgress::new(net, sim, self.id);
                self.strategy
                    .after_receive_data(&entry, in_face, &data, &egress, now)
            };
            pending.push((token, outcome));
        }
        self.settle(pending, sim, net);
    }

    fn on_incoming_nack(&mut self, in_face: FaceId, nack: Nack, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        let Some(token) = self.pit.find_exact(&nack.interest.name) else {
            trace!("nack without a pit entry");
            return;
        };
        let outcome = {
            let egress = NetEgress::new(net, sim, self.id);
            self.strategy
                .after_receive_nack(in_face, &nack, token, &mut self.pit, &egress, now)
        };
        self.settle(vec![(token, outcome)], sim, net);
    }

    /// Applies strategy outcomes, then feeds scheduler drop events back to the
    /// strategy until none are left.
    fn settle(&mut self, mut pending: Vec<(PitToken, Outcome)>, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        loop {
            for (token, outcome) in pending.drain(..) {
                if outcome.wants_pass() {
                    self.request_pass(sim);
                }
                let Some(reason) = outcome.rejected else {
                    continue;
                };
                let Some(entry) = self.pit.remove(token) else {
                    continue;
                };
                if entry.in_records.iter().any(|r| r.face.is_local()) {
                    self.nack_local(&entry.name, reason, now, net);
                }
            }

            let events = self.strategy.scheduler_mut().take_drop_events();
            if events.is_empty() {
                break;
            }
            for ev in &events {
                net.trace_scheduler_drop(now, self.id, ev);
                let outcome = {
                    let egress = NetEgress::new(net, sim, self.id);
                    self.strategy.on_dropped(ev, &mut self.pit, &egress, now)
                };
                pending.push((ev.pit, outcome));
            }
        }
        self.arm_tick(sim);
    }

    fn request_pass(&mut self, sim: &mut Simulator) {
        if self.pass_pending {
            return;
        }
        self.pass_pending = true;
        sim.schedule(sim.now(), SchedulingPass { node: self.id });
    }

    /// Keeps one tick armed while there is backlog: no sooner than
    /// `tick_interval`, and not before some queued head can make progress.
    fn arm_tick(&mut self, sim: &mut Simulator) {
        let now = sim.now();
        let Some(ready) = self.strategy.scheduler().next_admission_time(now) else {
            return;
        };
        let at = ready.max(now.saturating_add(self.tick_interval));
        if self.tick_at.is_some_and(|t| t <= at) {
            return;
        }
        trace!(node = %self.name, ?at, "arm tick");
        self.tick_at = Some(at);
        sim.schedule(at, SchedulerTick { node: self.id });
    }

    /// Runs one scheduling pass and settles whatever it dropped.
    pub(crate) fn run_pass(&mut self, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        let report = {
            let mut egress = NetEgress::new(net, sim, self.id);
            self.strategy
                .scheduler_mut()
                .run_scheduling_pass(now, &mut egress)
        };
        trace!(node = %self.name, ?report, "pass");
        self.settle(Vec::new(), sim, net);
    }

    /// The link behind `face` is gone: drop its queue and its routes.
    pub(crate) fn on_face_down(&mut self, face: FaceId, sim: &mut Simulator, net: &mut Network) {
        let dropped = self.strategy.scheduler_mut().remove_face(face);
        self.fib.remove_face(face);
        debug!(node = %self.name, %face, dropped, "face down");
        self.settle(Vec::new(), sim, net);
    }

    fn on_pit_expiry(&mut self, token: PitToken, now: SimTime) {
        if let Some(entry) = self.pit.expire(token, now) {
            trace!(node = %self.name, name = %entry.name, "pit entry expired");
            self.stats.pit_expired += 1;
        }
    }

    pub(crate) fn consumer_tick(&mut self, app: usize, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        let Some(consumer) = self.consumers.get_mut(app) else {
            return;
        };
        let Some(interest) = consumer.next_interest(now) else {
            return;
        };
        if !consumer.is_done() {
            sim.schedule_in(consumer.interval(), ConsumerTick { node: self.id, app });
        }
        sim.schedule_in(
            interest.lifetime,
            ConsumerTimeout {
                node: self.id,
                app,
                name: interest.name.clone(),
            },
        );
        self.on_incoming_interest(FaceId::LOCAL, interest, sim, net);
    }

    pub(crate) fn consumer_timeout(&mut self, app: usize, name: &Name, sim: &mut Simulator, net: &mut Network) {
        let timed_out = self
            .consumers
            .get_mut(app)
            .is_some_and(|c| c.on_timeout(name));
        if timed_out {
            debug!(node = %self.name, %name, "interest timed out");
            net.trace_timeout(sim.now(), self.id, name);
        }
    }

    fn satisfy_local(&mut self, name: &Name, now: SimTime, net: &mut Network) {
        for consumer in &mut self.consumers {
            if let Some(rtt) = consumer.on_data(name, now) {
                net.trace_satisfied(now, self.id, name, rtt);
            }
        }
    }

    fn nack_local(&mut self, name: &Name, reason: NackReason, now: SimTime, net: &mut Network) {
        for consumer in &mut self.consumers {
            if consumer.on_nack(name, reason) {
                debug!(node = %self.name, %name, ?reason, "interest nacked");
                net.trace_nacked(now, self.id, name, reason);
            }
        }
    }
}

/// 事件：PIT 条目到期检查
#[derive(Debug)]
pub struct PitExpiry {
    pub node: NodeId,
    pub token: PitToken,
}

impl Event for PitExpiry {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let PitExpiry { node, token } = *self;
        let now = sim.now();
        net_world(world)
            .net
            .with_node(node, |fwd, _| fwd.on_pit_expiry(token, now));
    }
}
