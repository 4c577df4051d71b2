//! Exponential retransmission suppression.
//!
//! A retransmitted Interest is forwarded again only after the suppression
//! interval since the last upstream send has passed. Every forwarded
//! retransmission multiplies the interval, up to a ceiling.

use super::pit::PitEntry;
use crate::sim::SimTime;

pub const RETX_SUPPRESSION_INITIAL: SimTime = SimTime::from_millis(10);
pub const RETX_SUPPRESSION_MAX: SimTime = SimTime::from_millis(250);
pub const RETX_SUPPRESSION_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetxDecision {
    /// Not a retransmission: nothing is pending upstream.
    New,
    /// Retransmission that should be forwarded.
    Forward,
    /// Retransmission inside the suppression interval.
    Suppress,
}

#[derive(Debug, Clone)]
pub struct RetxSuppression {
    initial: SimTime,
    max: SimTime,
    multiplier: u64,
}

impl Default for RetxSuppression {
    fn default() -> Self {
        Self::new(
            RETX_SUPPRESSION_INITIAL,
            RETX_SUPPRESSION_MAX,
            RETX_SUPPRESSION_MULTIPLIER,
        )
    }
}

impl RetxSuppression {
    pub fn new(initial: SimTime, max: SimTime, multiplier: u64) -> Self {
        Self {
            initial,
            max: max.max(initial),
            multiplier: multiplier.max(1),
        }
    }

    pub fn decide(&self, entry: &mut PitEntry, now: SimTime) -> RetxDecision {
        if !entry.has_pending_out_records() {
            return RetxDecision::New;
        }
        let Some(last) = entry.last_outgoing() else {
            return RetxDecision::New;
        };
        let interval = entry.retx_interval.unwrap_or(self.initial);
        if now.saturating_since(last) < interval {
            entry.retx_interval = Some(interval);
            return RetxDecision::Suppress;
        }
        let grown = SimTime(interval.0.saturating_mul(self.multiplier)).min(self.max);
        entry.retx_interval = Some(grown);
        RetxDecision::Forward
    }
}
