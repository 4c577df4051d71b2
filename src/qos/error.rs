//! Configuration errors.
//!
//! These are the only errors the scheduler ever reports to a caller. Runtime
//! resource exhaustion is handled by the drop policy and never surfaces here.

/// A QoS configuration that cannot be honoured. Rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("priority_class_count must be at least 1")]
    NoPriorityClasses,

    #[error("priority_class_count {count} exceeds the maximum of {max}")]
    TooManyClasses { count: usize, max: usize },

    #[error("queue_capacity_per_face must be positive")]
    ZeroQueueCapacity,

    #[error("{buckets} token buckets configured for {classes} priority classes")]
    BucketCountMismatch { classes: usize, buckets: usize },

    #[error("token bucket for class {class} has zero capacity")]
    ZeroBucketCapacity { class: usize },

    #[error("token bucket for class {class} has zero refill rate")]
    ZeroRefillRate { class: usize },

    #[error("tick_interval_us must be positive")]
    ZeroTickInterval,
}
