//! Forwarding plane: FIB, PIT, retransmission suppression, the QoS strategy
//! and the forwarding node that ties them together.

mod fib;
mod forwarder;
mod pit;
mod retx;
mod strategy;

pub use fib::{Fib, NextHop};
pub use forwarder::{Forwarder, NodeStats, PitExpiry};
pub use pit::{InRecord, OutRecord, Pit, PitEntry, PitToken};
pub use retx::{
    RETX_SUPPRESSION_INITIAL, RETX_SUPPRESSION_MAX, RETX_SUPPRESSION_MULTIPLIER, RetxDecision,
    RetxSuppression,
};
pub use strategy::{Outcome, QosStrategy, StrategyStats};
