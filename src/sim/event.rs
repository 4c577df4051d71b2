//! 事件 trait
//!
//! 定义仿真事件接口。转发节点的收包、调度 pass、周期 tick 都以事件的形式执行。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移。
pub trait Event: 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
