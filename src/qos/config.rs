//! QoS configuration surface.
//!
//! Deserializable from the `qos` section of a scenario file; every field has a
//! default so partial configs are accepted. [`QosConfig::validate`] is the one
//! place where unsatisfiable settings are rejected.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::sim::SimTime;

/// Upper bound on classes: class indices must fit a `u8` priority tag.
pub const MAX_PRIORITY_CLASSES: usize = 256;

/// How much budget a packet consumes from its class bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// One token per packet.
    #[default]
    PerPacket,
    /// One token per encoded byte.
    PerByte,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Maximum burst, in tokens.
    pub capacity: u64,
    /// Tokens added per second.
    pub refill_rate: u64,
    /// Tokens at construction; defaults to `capacity`.
    #[serde(default)]
    pub initial_tokens: Option<u64>,
}

impl BucketConfig {
    pub const fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            capacity,
            refill_rate,
            initial_tokens: None,
        }
    }

    pub const fn with_initial_tokens(mut self, tokens: u64) -> Self {
        self.initial_tokens = Some(tokens);
        self
    }

    pub(crate) fn validate(&self, class: usize) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroBucketCapacity { class });
        }
        if self.refill_rate == 0 {
            return Err(ConfigError::ZeroRefillRate { class });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QosConfig {
    /// Total packets a single face queue may hold across all classes.
    pub queue_capacity_per_face: usize,
    /// Number of priority classes; class 0 is the highest.
    pub priority_class_count: usize,
    /// One bucket per class, indexed by class.
    pub buckets: Vec<BucketConfig>,
    pub cost_model: CostModel,
    /// Period of the scheduler tick while a node has backlog.
    pub tick_interval_us: u64,
    /// Drop a blocked head-of-queue packet once it has waited this long.
    pub stale_after_ms: Option<u64>,
}

impl Default for QosConfig {
    fn default() -> Self {
        Self {
            queue_capacity_per_face: 64,
            priority_class_count: 3,
            buckets: vec![
                BucketConfig::new(200, 2_000),
                BucketConfig::new(100, 1_000),
                BucketConfig::new(50, 500),
            ],
            cost_model: CostModel::PerPacket,
            tick_interval_us: 1_000,
            stale_after_ms: None,
        }
    }
}

impl QosConfig {
    /// `classes` classes sharing the same bucket parameters.
    pub fn uniform(classes: usize, queue_capacity: usize, bucket: BucketConfig) -> Self {
        Self {
            queue_capacity_per_face: queue_capacity,
            priority_class_count: classes,
            buckets: vec![bucket; classes],
            ..Self::default()
        }
    }

    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn with_stale_after(mut self, ms: u64) -> Self {
        self.stale_after_ms = Some(ms);
        self
    }

    pub fn tick_interval(&self) -> SimTime {
        SimTime::from_micros(self.tick_interval_us)
    }

    pub fn stale_after(&self) -> Option<SimTime> {
        self.stale_after_ms.map(SimTime::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.priority_class_count == 0 {
            return Err(ConfigError::NoPriorityClasses);
        }
        if self.priority_class_count > MAX_PRIORITY_CLASSES {
            return Err(ConfigError::TooManyClasses {
                count: self.priority_class_count,
                max: MAX_PRIORITY_CLASSES,
            });
        }
        if self.queue_capacity_per_face == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.buckets.len() != self.priority_class_count {
            return Err(ConfigError::BucketCountMismatch {
                classes: self.priority_class_count,
                buckets: self.buckets.len(),
            });
        }
        for (class, bucket) in self.buckets.iter().enumerate() {
            bucket.validate(class)?;
        }
        if self.tick_interval_us == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}
