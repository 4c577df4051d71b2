//! 本地应用：consumer 与 producer
//!
//! 应用挂在节点的本地 face（`FaceId::LOCAL`）上，由下面的事件驱动。

mod consumer;
mod producer;

pub use consumer::{Consumer, ConsumerConfig, ConsumerStats};
pub use producer::Producer;

use crate::net::{Name, Network, NodeId, net_world};
use crate::sim::{Event, Simulator, World};

/// 事件：consumer 发出下一个 Interest
#[derive(Debug)]
pub struct ConsumerTick {
    pub node: NodeId,
    pub app: usize,
}

impl Event for ConsumerTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let ConsumerTick { node, app } = *self;
        net_world(world)
            .net
            .with_node(node, |fwd, net| fwd.consumer_tick(app, sim, net));
    }
}

/// 事件：某个 Interest 的生命周期到期
#[derive(Debug)]
pub struct ConsumerTimeout {
    pub node: NodeId,
    pub app: usize,
    pub name: Name,
}

impl Event for ConsumerTimeout {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let ConsumerTimeout { node, app, name } = *self;
        net_world(world)
            .net
            .with_node(node, |fwd, net| fwd.consumer_timeout(app, &name, sim, net));
    }
}

/// 在节点上安装一个 consumer，并在 `config.start` 调度第一次发送。返回应用下标。
pub fn install_consumer(
    net: &mut Network,
    sim: &mut Simulator,
    node: NodeId,
    config: ConsumerConfig,
) -> usize {
    let start = config.start;
    let app = net
        .node_mut(node)
        .expect("node exists")
        .add_consumer(config);
    sim.schedule(start, ConsumerTick { node, app });
    app
}

/// 在节点上安装一个 producer。
pub fn install_producer(net: &mut Network, node: NodeId, producer: Producer) {
    net.node_mut(node)
        .expect("node exists")
        .add_producer(producer);
}
