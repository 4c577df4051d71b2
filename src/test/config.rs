use crate::qos::{BucketConfig, ConfigError, CostModel, MAX_PRIORITY_CLASSES, QosConfig};
use crate::sim::SimTime;

#[test]
fn default_config_is_valid() {
    let c = QosConfig::default();
    assert_eq!(c.validate(), Ok(()));
    assert_eq!(c.priority_class_count, 3);
    assert_eq!(c.buckets.len(), 3);
    assert_eq!(c.queue_capacity_per_face, 64);
    assert_eq!(c.tick_interval(), SimTime::from_millis(1));
    assert_eq!(c.stale_after(), None);
}

#[test]
fn each_unsatisfiable_setting_is_reported() {
    let base = QosConfig::default;
    let cases = [
        (
            QosConfig {
                priority_class_count: 0,
                buckets: vec![],
                ..base()
            },
            ConfigError::NoPriorityClasses,
        ),
        (
            QosConfig {
                priority_class_count: MAX_PRIORITY_CLASSES + 1,
                ..base()
            },
            ConfigError::TooManyClasses {
                count: MAX_PRIORITY_CLASSES + 1,
                max: MAX_PRIORITY_CLASSES,
            },
        ),
        (
            QosConfig {
                queue_capacity_per_face: 0,
                ..base()
            },
            ConfigError::ZeroQueueCapacity,
        ),
        (
            QosConfig {
                priority_class_count: 2,
                ..base()
            },
            ConfigError::BucketCountMismatch {
                classes: 2,
                buckets: 3,
            },
        ),
        (
            QosConfig::uniform(2, 8, BucketConfig::new(0, 10)),
            ConfigError::ZeroBucketCapacity { class: 0 },
        ),
        (
            QosConfig::uniform(2, 8, BucketConfig::new(10, 0)),
            ConfigError::ZeroRefillRate { class: 0 },
        ),
        (
            QosConfig {
                tick_interval_us: 0,
                ..base()
            },
            ConfigError::ZeroTickInterval,
        ),
    ];
    for (config, expected) in cases {
        assert_eq!(config.validate(), Err(expected));
    }
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let c: QosConfig = serde_json::from_str(
        r#"{ "queue_capacity_per_face": 8, "cost_model": "per_byte", "stale_after_ms": 50 }"#,
    )
    .expect("parse qos");
    assert_eq!(c.queue_capacity_per_face, 8);
    assert_eq!(c.cost_model, CostModel::PerByte);
    assert_eq!(c.stale_after(), Some(SimTime::from_millis(50)));
    assert_eq!(c.buckets, QosConfig::default().buckets);
    assert_eq!(c.validate(), Ok(()));
}

#[test]
fn bucket_json_initial_tokens_is_optional() {
    let c: QosConfig = serde_json::from_str(
        r#"{ "priority_class_count": 1,
             "buckets": [ { "capacity": 4, "refill_rate": 2, "initial_tokens": 1 } ] }"#,
    )
    .expect("parse qos");
    assert_eq!(c.buckets, vec![BucketConfig::new(4, 2).with_initial_tokens(1)]);
    assert_eq!(c.validate(), Ok(()));

    let err = serde_json::from_str::<QosConfig>(r#"{ "cost_model": "per_flow" }"#);
    assert!(err.is_err());
}

#[test]
fn error_messages_name_the_offending_setting() {
    assert_eq!(
        ConfigError::ZeroRefillRate { class: 2 }.to_string(),
        "token bucket for class 2 has zero refill rate"
    );
    assert!(ConfigError::ZeroQueueCapacity.to_string().contains("queue_capacity_per_face"));
}
