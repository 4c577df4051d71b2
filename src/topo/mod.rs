//! 拓扑构建
//!
//! 每个构建函数都会建好节点与链路，并为 producer 的前缀安装最短跳数路由。

mod line;
mod star;

pub use line::{LineOpts, build_line};
pub use star::{StarOpts, build_star};

use crate::net::{FaceId, NodeId};

/// 构建结果
#[derive(Debug, Clone)]
pub struct Topology {
    pub consumers: Vec<NodeId>,
    pub routers: Vec<NodeId>,
    pub producer: NodeId,
    /// 最靠近 producer 的一跳链路（router 一侧的 face），用于故障注入
    pub bottleneck: FaceId,
}

pub(crate) fn mbps_to_bps(m: u64) -> u64 {
    m.saturating_mul(1_000_000)
}
