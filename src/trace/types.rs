use serde::{Deserialize, Serialize};

use crate::net::{NackReason, PacketType};
use crate::qos::DropReason;

/// 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 拓扑元信息（t=0 的第一条事件）
    Meta {
        nodes: Vec<TraceNodeInfo>,
        faces: Vec<TraceFaceInfo>,
    },
    /// 调度器放行，包开始在链路上串行化
    Transmit {
        face: u32,
        to_node: usize,
        depart_ns: u64,
        arrive_ns: u64,
    },
    /// 调度器丢包（push-out / rejected / face_gone / stale / oversize）
    SchedulerDrop {
        face: u32,
        class: u8,
        reason: DropReason,
    },
    /// 链路已拆除，发送或到达时被丢弃
    LinkDrop { face: u32 },
    /// consumer 收到 Data
    Satisfied { rtt_ns: u64 },
    /// consumer 收到 Nack
    Nacked { reason: NackReason },
    /// consumer 的 Interest 超时
    Timeout,
    /// 链路拆除
    FaceDown { face: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceNodeInfo {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceFaceInfo {
    pub id: u32,
    pub node: usize,
    pub peer_node: usize,
    pub bandwidth_bps: u64,
    pub latency_ns: u64,
}

/// 一条事件（JSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    pub node: Option<usize>,
    pub pkt_type: Option<PacketType>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, ev: TraceEvent) {
        self.events.push(ev);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }
}
