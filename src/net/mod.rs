//! 网络模拟模块
//!
//! 此模块包含网络模拟的核心组件：名字与数据包、face、网络拓扑、交付与调度事件。

// 子模块声明
mod deliver_packet;
mod egress;
mod face;
mod id;
mod name;
mod net_world;
mod network;
mod network_trace;
mod packet;
mod routing;
mod scheduling;
mod stats;

// 重新导出公共接口
pub use deliver_packet::DeliverPacket;
pub use egress::NetEgress;
pub use face::Face;
pub use id::{FaceId, NodeId};
pub use name::Name;
pub use net_world::NetWorld;
pub(crate) use net_world::net_world;
pub use network::Network;
pub use packet::{Data, HEADER_BYTES, Interest, NACK_HEADER_BYTES, Nack, NackReason, Packet, PacketType};
pub use routing::install_routes;
pub use scheduling::{FaceDown, SchedulerTick, SchedulingPass};
pub use stats::Stats;
