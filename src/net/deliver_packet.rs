//! 数据包交付事件
//!
//! 链路传输完成后，把包交给对端节点在对应 face 上处理。

use super::id::{FaceId, NodeId};
use super::net_world::net_world;
use super::packet::Packet;
use crate::sim::{Event, Simulator, World};
use tracing::trace;

/// 事件：把一个 packet 交给某个节点在 `face` 上接收。
#[derive(Debug)]
pub struct DeliverPacket {
    pub to: NodeId,
    pub face: FaceId,
    pub pkt: Packet,
}

impl Event for DeliverPacket {
    #[tracing::instrument(skip_all, fields(to = ?self.to, face = %self.face, name = %self.pkt.name()))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { to, face, pkt } = *self;
        trace!(now = %sim.now(), "数据包到达节点");
        net_world(world).net.deliver(to, face, pkt, sim);
    }
}
