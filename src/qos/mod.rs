//! Priority admission and rate shaping for egress faces.
//!
//! ```text
//!  submit_interest ─┐
//!  submit_data ─────┼─▶ classify ─▶ PriorityTxQueue (per face) ─┐
//!  submit_nack ─────┘                                            │
//!                        run_scheduling_pass ◀───────────────────┘
//!                              │  TokenBucket[class].try_consume
//!                              ▼
//!                         Egress::send
//! ```

mod config;
mod error;
mod scheduler;
mod token_bucket;

pub use config::{BucketConfig, CostModel, MAX_PRIORITY_CLASSES, QosConfig};
pub use error::ConfigError;
pub use scheduler::{
    Admission, AdmissionScheduler, DropEvent, DropReason, DropStats, Egress, PassReport,
};
pub use token_bucket::TokenBucket;
