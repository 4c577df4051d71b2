//! Face 类型
//!
//! 一个 face 是节点上的一端链路：对端节点/对端 face、传播时延、带宽，以及链路
//! 串行化占用到何时（`busy_until`）。face 被拆除后 `up` 为 false。

use super::id::{FaceId, NodeId};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    pub node: NodeId,
    pub peer_node: NodeId,
    pub peer_face: FaceId,
    pub latency: SimTime,
    pub bandwidth_bps: u64,
    pub busy_until: SimTime,
    pub up: bool,
}

impl Face {
    /// 计算发送指定字节数所需的串行化时间：ceil(bytes*8 / bps) 秒 -> 纳秒
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = u128::from(bytes).saturating_mul(8);
        let bps = u128::from(self.bandwidth_bps);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (bps - 1)) / bps;
        SimTime(nanos.min(u128::from(u64::MAX)) as u64)
    }
}
