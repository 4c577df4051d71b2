//! 固定速率的 consumer 应用
//!
//! 以 `rate_pps` 的速率依次请求 `<prefix>/<seq>`，每个 Interest 带可选的优先级标签；
//! 统计被满足 / 被 Nack / 超时的请求数与平均 RTT。

use std::collections::HashMap;

use serde::Serialize;

use crate::net::{Interest, NackReason, Name};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub prefix: Name,
    pub priority: Option<u8>,
    pub rate_pps: f64,
    pub count: u64,
    pub start: SimTime,
    pub lifetime: SimTime,
}

impl ConsumerConfig {
    pub fn new(prefix: Name) -> Self {
        Self {
            prefix,
            priority: None,
            rate_pps: 100.0,
            count: 100,
            start: SimTime::ZERO,
            lifetime: SimTime::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConsumerStats {
    pub sent: u64,
    pub satisfied: u64,
    pub nacked: u64,
    pub timed_out: u64,
    pub rtt_sum_ns: u64,
}

impl ConsumerStats {
    pub fn mean_rtt_ms(&self) -> Option<f64> {
        if self.satisfied == 0 {
            return None;
        }
        Some(self.rtt_sum_ns as f64 / self.satisfied as f64 / 1e6)
    }

    /// 已有结果的请求（满足、Nack 或超时）
    pub fn finished(&self) -> u64 {
        self.satisfied + self.nacked + self.timed_out
    }
}

#[derive(Debug)]
pub struct Consumer {
    config: ConsumerConfig,
    stats: ConsumerStats,
    /// name -> 发送时间
    outstanding: HashMap<Name, SimTime>,
    next_seq: u64,
    nonce_salt: u64,
}

impl Consumer {
    /// `nonce_salt` 让不同 consumer 的 nonce 序列互不相同（且运行间可复现）。
    pub fn new(config: ConsumerConfig, nonce_salt: u64) -> Self {
        Self {
            config,
            stats: ConsumerStats::default(),
            outstanding: HashMap::new(),
            next_seq: 0,
            nonce_salt,
        }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_done(&self) -> bool {
        self.next_seq >= self.config.count
    }

    /// 两次发送之间的间隔；速率非正时不再发送。
    pub fn interval(&self) -> SimTime {
        if self.config.rate_pps > 0.0 {
            SimTime((1e9 / self.config.rate_pps).round() as u64)
        } else {
            SimTime::MAX
        }
    }

    /// 下一个要发出的 Interest；发完 `count` 个后返回 `None`。
    pub fn next_interest(&mut self, now: SimTime) -> Option<Interest> {
        if self.is_done() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let name = self.config.prefix.append(seq.to_string());
        let nonce = mix64(self.nonce_salt ^ seq.wrapping_mul(0x9E3779B97F4A7C15)) as u32;
        let mut interest = Interest::new(name.clone(), nonce, self.config.lifetime);
        if let Some(p) = self.config.priority {
            interest = interest.with_priority(p);
        }
        self.outstanding.insert(name, now);
        self.stats.sent += 1;
        Some(interest)
    }

    /// 收到 Data。返回 RTT；不是本 consumer 在等的名字返回 `None`。
    pub fn on_data(&mut self, name: &Name, now: SimTime) -> Option<SimTime> {
        let sent_at = self.outstanding.remove(name)?;
        let rtt = now.saturating_since(sent_at);
        self.stats.satisfied += 1;
        self.stats.rtt_sum_ns = self.stats.rtt_sum_ns.saturating_add(rtt.0);
        Some(rtt)
    }

    pub fn on_nack(&mut self, name: &Name, _reason: NackReason) -> bool {
        if self.outstanding.remove(name).is_none() {
            return false;
        }
        self.stats.nacked += 1;
        true
    }

    pub fn on_timeout(&mut self, name: &Name) -> bool {
        if self.outstanding.remove(name).is_none() {
            return false;
        }
        self.stats.timed_out += 1;
        true
    }
}

/// 一个简单、确定性的 64-bit mixing（splitmix64）。
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
