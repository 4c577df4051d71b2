//! Star 拓扑构建

use super::{Topology, mbps_to_bps};
use crate::net::{Name, NetWorld, install_routes};
use crate::qos::{ConfigError, QosConfig};
use crate::sim::SimTime;

/// Star 拓扑配置选项
#[derive(Debug, Clone)]
pub struct StarOpts {
    pub consumers: usize,
    pub access_mbps: u64,
    pub access_latency: SimTime,
    pub bottleneck_mbps: u64,
    pub bottleneck_latency: SimTime,
}

impl Default for StarOpts {
    fn default() -> Self {
        Self {
            consumers: 2,
            access_mbps: 100,
            access_latency: SimTime::from_millis(1),
            bottleneck_mbps: 10,
            bottleneck_latency: SimTime::from_millis(2),
        }
    }
}

/// 构建 star 拓扑
///
/// 拓扑结构：c0..cN <-> r0 <-> p0，r0 <-> p0 为瓶颈链路。
/// 所有节点使用同一份调度器配置。
pub fn build_star(
    world: &mut NetWorld,
    opts: &StarOpts,
    qos: &QosConfig,
    prefix: &Name,
) -> Result<Topology, ConfigError> {
    let net = &mut world.net;
    let consumers = (0..opts.consumers)
        .map(|i| net.add_node(format!("c{i}"), qos))
        .collect::<Result<Vec<_>, _>>()?;
    let router = net.add_node("r0", qos)?;
    let producer = net.add_node("p0", qos)?;

    let access_bps = mbps_to_bps(opts.access_mbps);
    for &c in &consumers {
        net.connect(c, router, opts.access_latency, access_bps);
    }
    let (bottleneck, _) = net.connect(
        router,
        producer,
        opts.bottleneck_latency,
        mbps_to_bps(opts.bottleneck_mbps),
    );

    install_routes(net, producer, prefix);
    Ok(Topology {
        consumers,
        routers: vec![router],
        producer,
        bottleneck,
    })
}
