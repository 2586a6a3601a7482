//! End-to-end reconciliation of `Topology` payloads through the core.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use reconcile::{ErrorKind, Outcome, ReconcileFn, Transform};
use serde_json::Value;
use topology::{
    validate, FixedClock, Timestamp, Topology, TopologyConfig, TopologyReconciler,
    TopologySchema, TopologyTransform,
};

fn clock() -> Arc<FixedClock> {
    let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).single().unwrap();
    Arc::new(FixedClock::new(Timestamp::from_utc(at)))
}

fn reconciler() -> TopologyReconciler {
    topology::reconciler(TopologyConfig::default(), clock())
}

fn as_json(s: &str) -> Value {
    serde_json::from_str(s).unwrap()
}

const LAB: &str = r#"{
  "apiVersion": "topo.kubenet.dev/v1alpha1",
  "kind": "Topology",
  "metadata": {"name": "lab", "namespace": "default", "generation": 1},
  "spec": {
    "defaults": {"type": "ixr-d3", "provider": "srlinux.nokia.com"},
    "nodes": [{"name": "edge1"}, {"name": "edge2"}],
    "links": [{"endpoints": [{"node": "edge1", "port": 1}, {"node": "edge2", "port": 1}]}]
  }
}"#;

#[test]
fn empty_input_fails_with_400() {
    let err = reconciler().reconcile("").unwrap_err();
    assert_eq!(err.code().as_u32(), 400);
    assert!(err.message().contains("empty"));
}

#[test]
fn non_json_fails_with_decode_error() {
    let err = reconciler().reconcile("not json").unwrap_err();
    assert_eq!(err.code().as_u32(), 400);
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.message().starts_with("cannot decode input"));
}

#[test]
fn missing_metadata_is_a_decode_error() {
    let err = reconciler().reconcile(r#"{"kind":"Topology"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.message(), "cannot decode input: invalid structure");
}

#[test]
fn empty_name_surfaces_the_validator_message() {
    let input = r#"{"kind":"Topology","metadata":{"name":""}}"#;
    let err = reconciler().reconcile(input).unwrap_err();

    let expected = validate::validate(&serde_json::from_str::<Topology>(input).unwrap())
        .unwrap_err();
    assert_eq!(err.code().as_u32(), 400);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), expected.message());
}

#[test]
fn valid_stable_topology_is_returned_unchanged() {
    let input = r#"{"kind":"Topology","metadata":{"name":"wim"}}"#;
    let result = reconciler().reconcile(input).unwrap();

    assert!(!result.is_requeue());
    assert_eq!(result.delay(), Duration::ZERO);
    assert_eq!(as_json(result.object()), as_json(input));
}

#[test]
fn output_equals_transform_of_decoded_input() {
    let result = reconciler().reconcile(LAB).unwrap();

    let expected = TopologyTransform::new(TopologyConfig::default(), clock())
        .transform(serde_json::from_str::<Topology>(LAB).unwrap())
        .unwrap()
        .resource;
    let actual: Topology = serde_json::from_str(result.object()).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn requeue_then_converge() {
    let r = reconciler();

    let first = r.reconcile(LAB).unwrap();
    assert!(first.is_requeue());
    assert_eq!(first.delay(), Duration::from_secs(30));

    let second = r.reconcile(first.object()).unwrap();
    assert!(!second.is_requeue());
    assert_eq!(as_json(second.object()), as_json(first.object()));

    // Idempotent once stable.
    let third = r.reconcile(second.object()).unwrap();
    assert_eq!(third, second);
}

#[test]
fn unknown_fields_survive_reconciliation() {
    let input = r#"{"kind":"Topology","metadata":{"name":"lab","finalizers":["x"]},
        "spec":{"nodes":[{"name":"a","type":"t","serial":"S1"}],"futureField":true}}"#;
    let result = reconciler().reconcile(input).unwrap();
    let out = as_json(result.object());

    assert_eq!(out["metadata"]["finalizers"], serde_json::json!(["x"]));
    assert_eq!(out["spec"]["futureField"], Value::Bool(true));
    assert_eq!(out["spec"]["nodes"][0]["serial"], "S1");
}

#[test]
fn unknown_fields_in_endpoints_and_relationships_survive() {
    let input = r#"{"kind":"Topology","metadata":{"name":"lab"},"spec":{
        "nodes":[{"name":"a","type":"t"},{"name":"b","type":"t"}],
        "links":[{"endpoints":[{"node":"a","port":1,"vlan":42},{"node":"b","port":1}]}],
        "relationships":[{"apiVersion":"v1","kind":"K","name":"n","type":"owns","note":"keep-me"}]}}"#;
    let result = reconciler().reconcile(input).unwrap();
    let out = as_json(result.object());

    assert_eq!(out["spec"]["links"][0]["endpoints"][0]["vlan"], 42);
    assert_eq!(out["spec"]["relationships"][0]["note"], "keep-me");
    assert_eq!(out["spec"], as_json(input)["spec"]);
    // Derived links carry the endpoints as declared.
    assert_eq!(
        out["status"]["links"][0]["spec"]["endpoints"][0]["vlan"],
        42
    );
}

#[test]
fn unknown_endpoint_node_is_rejected() {
    let input = r#"{"metadata":{"name":"lab"},"spec":{"nodes":[{"name":"a","type":"t"}],
        "links":[{"endpoints":[{"node":"a","port":1},{"node":"ghost","port":1}]}]}}"#;
    let err = reconciler().reconcile(input).unwrap_err();
    assert_eq!(err.message(), "Endpoint references unknown node: ghost");
}

#[test]
fn concurrent_reconciliation_matches_sequential() {
    let handle: Arc<dyn ReconcileFn> = Arc::new(reconciler());
    let inputs = vec![
        LAB.to_owned(),
        r#"{"kind":"Topology","metadata":{"name":"wim"}}"#.to_owned(),
        r#"{"kind":"Topology","metadata":{"name":""}}"#.to_owned(),
        "   ".to_owned(),
    ];

    let sequential: Vec<Outcome> = inputs.iter().map(|i| handle.reconcile(i)).collect();
    let reversed: Vec<Outcome> = {
        let mut out: Vec<Outcome> = inputs.iter().rev().map(|i| handle.reconcile(i)).collect();
        out.reverse();
        out
    };
    let concurrent: Vec<Outcome> = thread::scope(|scope| {
        let workers: Vec<_> = inputs
            .iter()
            .map(|input| {
                let handle = Arc::clone(&handle);
                scope.spawn(move || handle.reconcile(input))
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(sequential, reversed);
    assert_eq!(sequential, concurrent);
}

#[test]
fn schema_is_usable_on_its_own() {
    use reconcile::ResourceSchema;

    let topo = TopologySchema.decode(LAB).unwrap();
    assert!(TopologySchema.validate(&topo).is_ok());
    let encoded = TopologySchema.encode(&topo).unwrap();
    assert_eq!(TopologySchema.decode(&encoded).unwrap(), topo);
}

proptest! {
    #[test]
    fn any_named_topology_without_spec_is_stable(name in "[a-z][a-z0-9-]{0,30}") {
        let input = format!(r#"{{"kind":"Topology","metadata":{{"name":"{name}"}}}}"#);
        let result = reconciler().reconcile(&input).unwrap();
        prop_assert!(!result.is_requeue());
        prop_assert_eq!(as_json(result.object()), as_json(&input));
    }

    #[test]
    fn every_success_keeps_the_requeue_invariant(
        nodes in proptest::collection::vec("[a-z]{1,6}", 0..5),
    ) {
        let nodes_json: Vec<String> = nodes
            .iter()
            .map(|n| format!(r#"{{"name":"{n}","type":"t"}}"#))
            .collect();
        let input = format!(
            r#"{{"metadata":{{"name":"lab"}},"spec":{{"nodes":[{}]}}}}"#,
            nodes_json.join(",")
        );
        // Duplicate generated names fail validation; that is fine here.
        if let Ok(result) = reconciler().reconcile(&input) {
            if !result.is_requeue() {
                prop_assert_eq!(result.delay(), Duration::ZERO);
            }
        }
    }
}
