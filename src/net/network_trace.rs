//! Trace hooks for the network.

use crate::qos::DropEvent;
use crate::sim::SimTime;
use crate::trace::{TraceEvent, TraceEventKind, TraceFaceInfo, TraceNodeInfo};

use super::{FaceId, NackReason, Name, Network, NodeId, Packet, PacketType};

impl Network {
    fn trace_push(&mut self, ev: TraceEvent) {
        if let Some(t) = &mut self.trace {
            t.push(ev);
        }
    }

    fn packet_event(t: SimTime, node: Option<NodeId>, pkt: &Packet, kind: TraceEventKind) -> TraceEvent {
        TraceEvent {
            t_ns: t.0,
            node: node.map(|n| n.0),
            pkt_type: Some(pkt.packet_type()),
            name: Some(pkt.name().to_string()),
            kind,
        }
    }

    /// 拓扑元信息；应在拓扑建好之后、仿真开始之前调用一次。
    pub fn emit_trace_meta(&mut self) {
        if self.trace.is_none() {
            return;
        }
        let nodes = (0..self.node_count())
            .map(|id| TraceNodeInfo {
                id,
                name: self.node_name(NodeId(id)).to_string(),
            })
            .collect::<Vec<_>>();
        let faces = self
            .faces()
            .iter()
            .map(|f| TraceFaceInfo {
                id: f.id.0,
                node: f.node.0,
                peer_node: f.peer_node.0,
                bandwidth_bps: f.bandwidth_bps,
                latency_ns: f.latency.0,
            })
            .collect::<Vec<_>>();
        self.trace_push(TraceEvent {
            t_ns: 0,
            node: None,
            pkt_type: None,
            name: None,
            kind: TraceEventKind::Meta { nodes, faces },
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn trace_transmit(
        &mut self,
        t: SimTime,
        from: NodeId,
        face: FaceId,
        to: NodeId,
        pkt: &Packet,
        depart: SimTime,
        arrive: SimTime,
    ) {
        if self.trace.is_none() {
            return;
        }
        let ev = Self::packet_event(
            t,
            Some(from),
            pkt,
            TraceEventKind::Transmit {
                face: face.0,
                to_node: to.0,
                depart_ns: depart.0,
                arrive_ns: arrive.0,
            },
        );
        self.trace_push(ev);
    }

    pub(crate) fn trace_link_drop(&mut self, t: SimTime, node: Option<NodeId>, face: FaceId, pkt: &Packet) {
        if self.trace.is_none() {
            return;
        }
        let ev = Self::packet_event(t, node, pkt, TraceEventKind::LinkDrop { face: face.0 });
        self.trace_push(ev);
    }

    pub(crate) fn trace_scheduler_drop(&mut self, t: SimTime, node: NodeId, ev: &DropEvent) {
        if self.trace.is_none() {
            return;
        }
        self.trace_push(TraceEvent {
            t_ns: t.0,
            node: Some(node.0),
            pkt_type: Some(ev.packet_type),
            name: Some(ev.name.to_string()),
            kind: TraceEventKind::SchedulerDrop {
                face: ev.face.0,
                class: ev.class.0,
                reason: ev.reason,
            },
        });
    }

    pub(crate) fn trace_face_down(&mut self, t: SimTime, node: NodeId, face: FaceId) {
        self.trace_push(TraceEvent {
            t_ns: t.0,
            node: Some(node.0),
            pkt_type: None,
            name: None,
            kind: TraceEventKind::FaceDown { face: face.0 },
        });
    }

    fn trace_app(&mut self, t: SimTime, node: NodeId, pkt_type: PacketType, name: &Name, kind: TraceEventKind) {
        if self.trace.is_none() {
            return;
        }
        self.trace_push(TraceEvent {
            t_ns: t.0,
            node: Some(node.0),
            pkt_type: Some(pkt_type),
            name: Some(name.to_string()),
            kind,
        });
    }

    pub(crate) fn trace_satisfied(&mut self, t: SimTime, node: NodeId, name: &Name, rtt: SimTime) {
        self.trace_app(t, node, PacketType::Data, name, TraceEventKind::Satisfied { rtt_ns: rtt.0 });
    }

    pub(crate) fn trace_nacked(&mut self, t: SimTime, node: NodeId, name: &Name, reason: NackReason) {
        self.trace_app(t, node, PacketType::Nack, name, TraceEventKind::Nacked { reason });
    }

    pub(crate) fn trace_timeout(&mut self, t: SimTime, node: NodeId, name: &Name) {
        self.trace_app(t, node, PacketType::Interest, name, TraceEventKind::Timeout);
    }
}
