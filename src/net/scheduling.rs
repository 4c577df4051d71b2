//! 调度事件（驱动 admission scheduler 出队）
//!
//! - `SchedulingPass`：某个 face 队列从空变为非空时立即触发一次 pass；
//! - `SchedulerTick`：节点有积压时触发 pass，间隔不小于 tick 周期，并推迟到队头
//!   可被放行（或过期）的时刻；积压清空后停止。被更早的 tick 取代的事件直接忽略。

use super::id::NodeId;
use super::net_world::net_world;
use crate::sim::{Event, Simulator, World};

#[derive(Debug)]
pub struct SchedulingPass {
    pub node: NodeId,
}

impl Event for SchedulingPass {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let SchedulingPass { node } = *self;
        net_world(world).net.with_node(node, |fwd, net| {
            fwd.pass_pending = false;
            fwd.run_pass(sim, net);
        });
    }
}

#[derive(Debug)]
pub struct SchedulerTick {
    pub node: NodeId,
}

impl Event for SchedulerTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let SchedulerTick { node } = *self;
        let now = sim.now();
        net_world(world).net.with_node(node, |fwd, net| {
            if fwd.tick_at != Some(now) {
                return;
            }
            fwd.tick_at = None;
            fwd.run_pass(sim, net);
        });
    }
}

/// 事件：拆除一条链路（两端 face 同时失效）。
#[derive(Debug)]
pub struct FaceDown {
    pub face: super::id::FaceId,
}

impl Event for FaceDown {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let FaceDown { face } = *self;
        net_world(world).net.tear_down(face, sim);
    }
}
