//! 仿真核心模块
//!
//! 单线程离散事件内核：所有转发、调度 pass 与应用定时器都在 `Simulator`
//! 的事件循环里按 `(at, seq)` 顺序执行。

mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
