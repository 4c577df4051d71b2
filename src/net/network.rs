//! 网络拓扑管理
//!
//! 持有所有转发节点和 face，负责链路串行化/传播时延的计算与数据包交付。

use super::deliver_packet::DeliverPacket;
use super::face::Face;
use super::id::{FaceId, NodeId};
use super::packet::Packet;
use super::stats::Stats;
use crate::fw::Forwarder;
use crate::qos::{ConfigError, QosConfig};
use crate::sim::{SimTime, Simulator};
use crate::trace::TraceLogger;
use tracing::{debug, info, trace, warn};

/// 网络拓扑
#[derive(Default)]
pub struct Network {
    nodes: Vec<Option<Forwarder>>,
    node_names: Vec<String>,
    faces: Vec<Face>,
    pub stats: Stats,
    pub trace: Option<TraceLogger>,
}

impl Network {
    /// 添加转发节点。调度器配置非法时返回错误，拓扑不变。
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        qos: &QosConfig,
    ) -> Result<NodeId, ConfigError> {
        let id = NodeId(self.nodes.len());
        let name = name.into();
        let fwd = Forwarder::new(id, name.clone(), qos.clone())?;
        debug!(?id, %name, "添加节点");
        self.nodes.push(Some(fwd));
        self.node_names.push(name);
        Ok(id)
    }

    /// 连接两个节点（一条双向链路，两端各一个 face）
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        latency: SimTime,
        bandwidth_bps: u64,
    ) -> (FaceId, FaceId) {
        let fa = FaceId(self.faces.len() as u32);
        let fb = FaceId(fa.0 + 1);
        for (id, node, peer_node, peer_face) in [(fa, a, b, fb), (fb, b, a, fa)] {
            self.faces.push(Face {
                id,
                node,
                peer_node,
                peer_face,
                latency,
                bandwidth_bps,
                busy_until: SimTime::ZERO,
                up: true,
            });
        }
        debug!(?a, ?b, %fa, %fb, ?latency, bandwidth_bps, "连接节点");
        (fa, fb)
    }

    pub fn node(&self, id: NodeId) -> Option<&Forwarder> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Forwarder> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_names.iter().position(|n| n == name).map(NodeId)
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        self.node_names.get(id.0).map_or("?", String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0 as usize)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// 某节点拥有的全部 face
    pub fn faces_of(&self, node: NodeId) -> impl Iterator<Item = &Face> + '_ {
        self.faces.iter().filter(move |f| f.node == node)
    }

    /// `a` 上通往 `b` 的 face
    pub fn face_between(&self, a: NodeId, b: NodeId) -> Option<FaceId> {
        self.faces_of(a).find(|f| f.peer_node == b).map(|f| f.id)
    }

    pub fn is_up(&self, face: FaceId) -> bool {
        self.face(face).is_some_and(|f| f.up)
    }

    /// 暂时把节点取出来，避免 `&mut self` 与 `&mut node` 的重叠借用。
    pub fn with_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Forwarder, &mut Network) -> R,
    ) -> R {
        let mut node = self.nodes[id.0].take().expect("node exists");
        let r = f(&mut node, self);
        self.nodes[id.0] = Some(node);
        r
    }

    /// 将数据包交付给节点在 `face` 上处理
    #[tracing::instrument(skip(self, pkt, sim), fields(name = %pkt.name()))]
    pub fn deliver(&mut self, to: NodeId, face: FaceId, pkt: Packet, sim: &mut Simulator) {
        if !self.is_up(face) {
            trace!("链路已拆除，到达的包被丢弃");
            self.stats.link_drops += 1;
            self.trace_link_drop(sim.now(), Some(to), face, &pkt);
            return;
        }
        self.stats.delivered_pkts += 1;
        self.with_node(to, |fwd, net| fwd.on_packet(face, pkt, sim, net));
    }

    /// 从 `face` 发出数据包：排在链路已有的串行化之后，到达对端时交付。
    #[tracing::instrument(skip(self, pkt, sim), fields(name = %pkt.name(), packet_type = %pkt.packet_type()))]
    pub fn transmit(&mut self, face: FaceId, pkt: Packet, sim: &mut Simulator) {
        let now = sim.now();
        let Some(link) = self.faces.get_mut(face.0 as usize).filter(|f| f.up) else {
            warn!("face 不存在或已拆除，丢弃");
            self.stats.link_drops += 1;
            let node = self.face(face).map(|f| f.node);
            self.trace_link_drop(now, node, face, &pkt);
            return;
        };

        let start = now.max(link.busy_until);
        let tx_time = link.tx_time(pkt.size_bytes());
        let depart = start.saturating_add(tx_time);
        link.busy_until = depart;
        let arrive = depart.saturating_add(link.latency);
        let (from, to, peer_face) = (link.node, link.peer_node, link.peer_face);

        trace!(?now, ?start, ?tx_time, ?depart, ?arrive, "计算传输时间");

        match &pkt {
            Packet::Interest(_) => self.stats.tx_interests += 1,
            Packet::Data(_) => self.stats.tx_data += 1,
            Packet::Nack(_) => self.stats.tx_nacks += 1,
        }
        self.stats.tx_bytes += u64::from(pkt.size_bytes());
        self.trace_transmit(now, from, face, to, &pkt, depart, arrive);

        sim.schedule(
            arrive,
            DeliverPacket {
                to,
                face: peer_face,
                pkt,
            },
        );
    }

    /// 拆除 `face` 所在的链路：两端都标记为 down，并通知两端节点。
    #[tracing::instrument(skip(self, sim))]
    pub fn tear_down(&mut self, face: FaceId, sim: &mut Simulator) {
        let Some(f) = self.face(face) else {
            warn!("拆除不存在的 face");
            return;
        };
        let ends = [(f.node, f.id), (f.peer_node, f.peer_face)];
        for &(_, id) in &ends {
            if let Some(end) = self.faces.get_mut(id.0 as usize) {
                end.up = false;
            }
        }
        info!(a = %ends[0].1, b = %ends[1].1, "链路拆除");
        for (node, id) in ends {
            self.trace_face_down(sim.now(), node, id);
            self.with_node(node, |fwd, net| fwd.on_face_down(id, sim, net));
        }
    }
}
