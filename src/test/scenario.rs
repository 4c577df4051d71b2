use crate::scenario::{ScenarioError, ScenarioSpec};
use crate::sim::SimTime;

const MINIMAL_STAR: &str = r#"
{
    "schema_version": 1,
    "topology": { "kind": "star" },
    "consumers": [
        { "priority": 1, "rate_pps": 50, "count": 5 },
        { "rate_pps": 50, "count": 5, "start_ms": 10 }
    ]
}
"#;

#[test]
fn minimal_star_scenario_parses_with_defaults() {
    let spec = ScenarioSpec::from_json(MINIMAL_STAR).expect("parse");
    assert_eq!(spec.prefix, "/video");
    assert_eq!(spec.producer.payload_bytes, 1024);
    assert_eq!(spec.qos.priority_class_count, 3);
    assert_eq!(spec.consumers[1].lifetime_ms, 1000);
    assert!(spec.face_failures.is_empty());
    // 5 Interests at 50/s take 100 ms, plus the 1 s lifetime
    assert_eq!(spec.until(), SimTime::from_millis(10 + 100 + 1000 + 1));
}

#[test]
fn wrong_schema_version_is_refused() {
    let raw = MINIMAL_STAR.replace("\"schema_version\": 1", "\"schema_version\": 9");
    let err = ScenarioSpec::from_json(&raw).unwrap_err();
    assert!(matches!(err, ScenarioError::SchemaVersion { found: 9 }));
}

#[test]
fn invalid_qos_or_rate_fails_the_build() {
    let mut spec = ScenarioSpec::from_json(MINIMAL_STAR).expect("parse");
    spec.qos.queue_capacity_per_face = 0;
    assert!(matches!(spec.build(false), Err(ScenarioError::Config(_))));

    let mut spec = ScenarioSpec::from_json(MINIMAL_STAR).expect("parse");
    spec.consumers[0].rate_pps = 0.0;
    assert!(matches!(
        spec.build(false),
        Err(ScenarioError::BadRate { index: 0 })
    ));
}

#[test]
fn built_star_scenario_satisfies_every_interest() {
    let spec = ScenarioSpec::from_json(MINIMAL_STAR).expect("parse");
    let mut scenario = spec.build(true).expect("build");
    scenario.run();

    let net = &scenario.world.net;
    for &c in &scenario.topology.consumers {
        let node = net.node(c).expect("consumer node");
        let stats = node.consumers()[0].stats();
        assert_eq!(stats.sent, 5);
        assert_eq!(stats.satisfied, 5);
    }
    let producer = net.node(scenario.topology.producer).expect("producer");
    assert_eq!(producer.producers()[0].served(), 10);
    let trace = net.trace.as_ref().expect("trace enabled");
    assert!(!trace.is_empty());
}

#[test]
fn line_scenario_puts_all_consumers_on_one_node() {
    let raw = r#"
    {
        "schema_version": 1,
        "topology": { "kind": "line", "routers": 3 },
        "consumers": [ { "count": 3 }, { "count": 3, "priority": 1 } ],
        "until_ms": 2000
    }
    "#;
    let spec = ScenarioSpec::from_json(raw).expect("parse");
    let mut scenario = spec.build(false).expect("build");
    assert_eq!(scenario.world.net.node_count(), 5);
    scenario.run();

    let c0 = scenario
        .world
        .net
        .node(scenario.topology.consumers[0])
        .expect("c0");
    assert_eq!(c0.consumers().len(), 2);
    for app in c0.consumers() {
        assert_eq!(app.stats().satisfied, 3);
    }
}
