//! Line 拓扑构建

use super::{Topology, mbps_to_bps};
use crate::net::{Name, NetWorld, install_routes};
use crate::qos::{ConfigError, QosConfig};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct LineOpts {
    /// consumer 与 producer 之间的 router 个数
    pub routers: usize,
    pub link_mbps: u64,
    pub link_latency: SimTime,
}

impl Default for LineOpts {
    fn default() -> Self {
        Self {
            routers: 2,
            link_mbps: 10,
            link_latency: SimTime::from_millis(1),
        }
    }
}

/// 构建 line 拓扑
///
/// 拓扑结构：c0 <-> r0 <-> ... <-> rN <-> p0
pub fn build_line(
    world: &mut NetWorld,
    opts: &LineOpts,
    qos: &QosConfig,
    prefix: &Name,
) -> Result<Topology, ConfigError> {
    let net = &mut world.net;
    let consumer = net.add_node("c0", qos)?;
    let routers = (0..opts.routers)
        .map(|i| net.add_node(format!("r{i}"), qos))
        .collect::<Result<Vec<_>, _>>()?;
    let producer = net.add_node("p0", qos)?;

    let bps = mbps_to_bps(opts.link_mbps);
    let mut chain = Vec::with_capacity(routers.len() + 2);
    chain.push(consumer);
    chain.extend(&routers);
    chain.push(producer);

    let mut bottleneck = None;
    for pair in chain.windows(2) {
        let (a, _) = net.connect(pair[0], pair[1], opts.link_latency, bps);
        bottleneck = Some(a);
    }

    install_routes(net, producer, prefix);
    Ok(Topology {
        consumers: vec![consumer],
        routers,
        producer,
        bottleneck: bottleneck.expect("line has at least one link"),
    })
}
