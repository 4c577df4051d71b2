//! 数据包类型
//!
//! 已解析的 Interest / Data / Nack 对象。调度器只关心包类型、优先级标签与编码大小；
//! 编码大小只用于链路序列化时延和按字节计费。

use super::name::Name;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed per-packet overhead added to the name and payload when estimating the
/// encoded size.
pub const HEADER_BYTES: u32 = 24;
/// Extra bytes a Nack header adds on top of the Interest it carries.
pub const NACK_HEADER_BYTES: u32 = 8;

/// 包类型，决定默认优先级类别与排队处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketType {
    Interest,
    Data,
    Nack,
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PacketType::Interest => "interest",
            PacketType::Data => "data",
            PacketType::Nack => "nack",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interest {
    pub name: Name,
    pub nonce: u32,
    pub lifetime: SimTime,
    /// Traffic-class tag set by the consumer. `None` means best effort.
    pub priority: Option<u8>,
}

impl Interest {
    pub fn new(name: Name, nonce: u32, lifetime: SimTime) -> Self {
        Self {
            name,
            nonce,
            lifetime,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn size_bytes(&self) -> u32 {
        HEADER_BYTES.saturating_add(name_bytes(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub name: Name,
    pub payload_bytes: u32,
}

impl Data {
    pub fn new(name: Name, payload_bytes: u32) -> Self {
        Self {
            name,
            payload_bytes,
        }
    }

    pub fn size_bytes(&self) -> u32 {
        HEADER_BYTES
            .saturating_add(name_bytes(&self.name))
            .saturating_add(self.payload_bytes)
    }
}

/// Nack reasons, ordered from least to most severe. `None` is an unspecified
/// reason and ranks as the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NackReason {
    Congestion,
    Duplicate,
    NoRoute,
    None,
}

impl NackReason {
    fn severity(self) -> u8 {
        match self {
            NackReason::Congestion => 1,
            NackReason::Duplicate => 2,
            NackReason::NoRoute => 3,
            NackReason::None => u8::MAX,
        }
    }

    pub fn is_less_severe_than(self, other: NackReason) -> bool {
        self.severity() < other.severity()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nack {
    pub interest: Interest,
    pub reason: NackReason,
}

impl Nack {
    pub fn new(interest: Interest, reason: NackReason) -> Self {
        Self { interest, reason }
    }

    pub fn size_bytes(&self) -> u32 {
        self.interest.size_bytes().saturating_add(NACK_HEADER_BYTES)
    }
}

/// 网络数据包
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Interest(Interest),
    Data(Data),
    Nack(Nack),
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Interest(_) => PacketType::Interest,
            Packet::Data(_) => PacketType::Data,
            Packet::Nack(_) => PacketType::Nack,
        }
    }

    pub fn name(&self) -> &Name {
        match self {
            Packet::Interest(i) => &i.name,
            Packet::Data(d) => &d.name,
            Packet::Nack(n) => &n.interest.name,
        }
    }

    pub fn size_bytes(&self) -> u32 {
        match self {
            Packet::Interest(i) => i.size_bytes(),
            Packet::Data(d) => d.size_bytes(),
            Packet::Nack(n) => n.size_bytes(),
        }
    }
}

fn name_bytes(name: &Name) -> u32 {
    let total: usize = name.components().iter().map(|c| c.len() + 2).sum();
    u32::try_from(total).unwrap_or(u32::MAX)
}
