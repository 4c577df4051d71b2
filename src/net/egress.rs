//! 调度器的发送端口
//!
//! 把 `qos::Egress` 接到网络层：只接受属于本节点、仍然 up 的 face。

use super::id::{FaceId, NodeId};
use super::network::Network;
use super::packet::Packet;
use crate::qos::Egress;
use crate::sim::Simulator;

pub struct NetEgress<'a> {
    net: &'a mut Network,
    sim: &'a mut Simulator,
    node: NodeId,
}

impl<'a> NetEgress<'a> {
    pub fn new(net: &'a mut Network, sim: &'a mut Simulator, node: NodeId) -> Self {
        Self { net, sim, node }
    }
}

impl Egress for NetEgress<'_> {
    fn is_up(&self, face: FaceId) -> bool {
        self.net
            .face(face)
            .is_some_and(|f| f.up && f.node == self.node)
    }

    fn send(&mut self, face: FaceId, pkt: Packet) {
        self.net.transmit(face, pkt, self.sim);
    }
}
