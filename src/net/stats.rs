//! 统计信息
//!
//! 网络层（链路）统计；调度器与策略各自维护自己的统计。

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Stats {
    pub tx_interests: u64,
    pub tx_data: u64,
    pub tx_nacks: u64,
    pub tx_bytes: u64,
    pub delivered_pkts: u64,
    /// 发送时 face 已拆除而被链路丢弃的包
    pub link_drops: u64,
}
