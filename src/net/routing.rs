//! 静态路由安装
//!
//! 按最短跳数为一个名字前缀填 FIB：对 `origin`（前缀的生产者所在节点）做 BFS，
//! 每个节点上所有通往“离 origin 近一跳”的邻居的 face 都作为下一跳，
//! cost 为该节点到 origin 的跳数。

use std::collections::VecDeque;

use super::id::NodeId;
use super::name::Name;
use super::network::Network;
use tracing::debug;

/// 为 `prefix` 安装指向 `origin` 的路由，返回添加的下一跳条数。
pub fn install_routes(net: &mut Network, origin: NodeId, prefix: &Name) -> usize {
    let n = net.node_count();
    let mut dist: Vec<u32> = vec![u32::MAX; n];
    let mut q: VecDeque<NodeId> = VecDeque::new();
    dist[origin.0] = 0;
    q.push_back(origin);

    // 链路是对称的，所以直接沿 face 的对端走即可。
    while let Some(v) = q.pop_front() {
        let dv = dist[v.0];
        for f in net.faces_of(v).filter(|f| f.up) {
            if dist[f.peer_node.0] == u32::MAX {
                dist[f.peer_node.0] = dv.saturating_add(1);
                q.push_back(f.peer_node);
            }
        }
    }

    let hops: Vec<_> = net
        .faces()
        .iter()
        .filter(|f| f.up && f.node != origin)
        .filter(|f| {
            let d = dist[f.node.0];
            d != u32::MAX && dist[f.peer_node.0].saturating_add(1) == d
        })
        .map(|f| (f.node, f.id, dist[f.node.0]))
        .collect();

    for &(node, face, cost) in &hops {
        if let Some(fwd) = net.node_mut(node) {
            fwd.fib.add_next_hop(prefix.clone(), face, cost);
        }
    }
    debug!(%prefix, ?origin, next_hops = hops.len(), "安装路由");
    hops.len()
}
