//! The topology reconciliation transform.
//!
//! Derives one node resource per declared node and one link resource per
//! declared link, records them in `status`, and maintains the `Ready`
//! condition. The transform asks for one more pass whenever it changed the
//! status, and reports a stable point once a pass leaves the status as it
//! found it.

use std::collections::HashSet;
use std::sync::Arc;

use reconcile::{Transform, TransformError, Transformed};

use crate::meta::Extra;
use crate::{
    Clock, Condition, ConditionStatus, DerivedLink, DerivedNode, LinkSpec, NodeSpec, ObjectMeta,
    Topology, TopologyConfig, TopologySpec, READY_CONDITION, RECONCILED_REASON,
};

/// Transform for the `Topology` kind.
#[derive(Clone)]
pub struct TopologyTransform {
    config: TopologyConfig,
    clock: Arc<dyn Clock>,
}

impl TopologyTransform {
    /// Creates a transform reading time from `clock`.
    pub fn new(config: TopologyConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Builds the node resources for `spec`, named `<topology>.<node>`.
    pub fn derive_nodes(
        &self,
        parent: &ObjectMeta,
        spec: &TopologySpec,
    ) -> Result<Vec<DerivedNode>, TransformError> {
        spec.nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let merged = node.merged_with(spec.defaults.as_ref());
                // Both fields are guaranteed by validation.
                let (Some(name), Some(node_type)) = (merged.name, merged.node_type) else {
                    return Err(TransformError::internal(format!(
                        "spec.nodes[{idx}] reached the transform without a name and type"
                    )));
                };
                Ok(DerivedNode::new(
                    child_meta(parent, &name),
                    NodeSpec {
                        node: name,
                        region: merged.region,
                        site: merged.site,
                        rack: merged.rack,
                        position: merged.position,
                        labels: merged.labels,
                        node_type,
                        provider: merged.provider,
                        version: merged.version,
                        serial_number: self.config.serial_number.clone(),
                        manufacturer: self.config.manufacturer.clone(),
                        admin_state: self.config.admin_state,
                    },
                ))
            })
            .collect()
    }

    /// Builds the link resources for `spec`, named `<topology>.<parts>` where
    /// the parts are the set endpoint identifiers joined with `.`.
    pub fn derive_links(
        &self,
        parent: &ObjectMeta,
        spec: &TopologySpec,
    ) -> Result<Vec<DerivedLink>, TransformError> {
        let mut seen = HashSet::new();
        let mut links = Vec::with_capacity(spec.links().len());

        for (idx, link) in spec.links().iter().enumerate() {
            let endpoints = link.endpoints().to_vec();
            let parts: Vec<String> = endpoints.iter().flat_map(|e| e.name_parts()).collect();
            let metadata = child_meta(parent, &parts.join("."));

            if !seen.insert(metadata.name.clone()) {
                return Err(TransformError::input(format!(
                    "spec.links[{idx}] derives link name \"{}\" which is already in use",
                    metadata.name
                )));
            }

            links.push(DerivedLink::new(
                metadata,
                LinkSpec {
                    endpoints,
                    admin_state: self.config.admin_state,
                },
            ));
        }

        Ok(links)
    }
}

/// Metadata of a child resource: `<parent>.<suffix>` in the parent's namespace.
fn child_meta(parent: &ObjectMeta, suffix: &str) -> ObjectMeta {
    ObjectMeta {
        namespace: parent.namespace.clone(),
        ..ObjectMeta::named(format!("{}.{suffix}", parent.name))
    }
}

impl Transform<Topology> for TopologyTransform {
    fn transform(&self, mut topology: Topology) -> Result<Transformed<Topology>, TransformError> {
        let Some(spec) = &topology.spec else {
            return Ok(Transformed::stable(topology));
        };

        let nodes = self.derive_nodes(&topology.metadata, spec)?;
        let links = self.derive_links(&topology.metadata, spec)?;
        let generation = topology.metadata.generation;

        let status = topology.status.get_or_insert_with(Default::default);
        let mut changed = false;

        if status.nodes.as_ref() != Some(&nodes) {
            status.nodes = Some(nodes);
            changed = true;
        }
        if status.links.as_ref() != Some(&links) {
            status.links = Some(links);
            changed = true;
        }

        let ready = Condition {
            condition_type: READY_CONDITION.to_owned(),
            status: ConditionStatus::True,
            reason: RECONCILED_REASON.to_owned(),
            message: String::new(),
            last_transition_time: self.clock.now(),
            observed_generation: generation,
            extra: Extra::new(),
        };
        let conditions = status.conditions.get_or_insert_with(Vec::new);
        match conditions
            .iter_mut()
            .find(|c| c.condition_type == READY_CONDITION)
        {
            Some(existing) if existing.same_state_as(&ready) => {}
            Some(existing) => {
                *existing = ready;
                changed = true;
            }
            None => {
                conditions.push(ready);
                changed = true;
            }
        }

        if changed {
            Ok(Transformed::requeue_after(
                topology,
                self.config.requeue_after(),
            ))
        } else {
            Ok(Transformed::stable(topology))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use reconcile::Requeue;

    use super::*;
    use crate::{AdminState, FixedClock, Timestamp};

    fn clock_at(secs: i64) -> Arc<dyn Clock> {
        let at = Utc.timestamp_opt(secs, 0).single().unwrap();
        Arc::new(FixedClock::new(Timestamp::from_utc(at)))
    }

    fn transform_at(secs: i64) -> TopologyTransform {
        TopologyTransform::new(TopologyConfig::default(), clock_at(secs))
    }

    fn topology(json: &str) -> Topology {
        serde_json::from_str(json).unwrap()
    }

    const TWO_NODES: &str = r#"{"kind":"Topology","metadata":{"name":"lab","namespace":"prod","generation":3},"spec":{
        "defaults":{"type":"ixr-d3","region":"eu"},
        "nodes":[{"name":"edge1"},{"name":"edge2","region":"us"}],
        "links":[{"endpoints":[{"node":"edge1","port":1},{"node":"edge2","moduleBay":1,"port":2}]}]}}"#;

    #[test]
    fn topology_without_spec_is_left_alone() {
        let input = topology(r#"{"kind":"Topology","metadata":{"name":"wim"}}"#);
        let out = transform_at(0).transform(input.clone()).unwrap();
        assert_eq!(out.resource, input);
        assert_eq!(out.requeue, Requeue::Never);
    }

    #[test]
    fn derives_children_and_requeues_on_first_pass() {
        let out = transform_at(100).transform(topology(TWO_NODES)).unwrap();
        assert_eq!(out.requeue, Requeue::After(std::time::Duration::from_secs(30)));

        let status = out.resource.status.unwrap();
        let nodes = status.nodes.as_ref().unwrap();
        assert_eq!(nodes[0].api_version, "infra.kuid.dev/v1alpha1");
        assert_eq!(nodes[0].kind, "Node");
        assert_eq!(nodes[0].metadata.name, "lab.edge1");
        assert_eq!(nodes[0].metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(nodes[0].spec.node, "edge1");
        assert_eq!(nodes[0].spec.region.as_deref(), Some("eu"));
        assert_eq!(nodes[0].spec.node_type, "ixr-d3");
        assert_eq!(nodes[0].spec.serial_number, "dummy");
        assert_eq!(nodes[0].spec.manufacturer, "Nokia");
        assert_eq!(nodes[0].spec.admin_state, AdminState::Enable);
        assert_eq!(nodes[1].spec.region.as_deref(), Some("us"));

        let links = status.links.as_ref().unwrap();
        assert_eq!(links[0].api_version, "infra.kuid.dev/v1alpha1");
        assert_eq!(links[0].kind, "Link");
        assert_eq!(links[0].metadata.name, "lab.edge1.1.edge2.1.2");
        assert_eq!(links[0].metadata.namespace.as_deref(), Some("prod"));

        let ready = status.condition(READY_CONDITION).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.reason, RECONCILED_REASON);
        assert_eq!(ready.observed_generation, Some(3));
        assert_eq!(ready.last_transition_time.as_datetime().timestamp(), 100);
    }

    #[test]
    fn second_pass_is_stable_and_keeps_transition_time() {
        let first = transform_at(100).transform(topology(TWO_NODES)).unwrap();
        let second = transform_at(200).transform(first.resource.clone()).unwrap();

        assert_eq!(second.requeue, Requeue::Never);
        assert_eq!(second.resource, first.resource);
    }

    #[test]
    fn generation_bump_updates_the_condition() {
        let first = transform_at(100).transform(topology(TWO_NODES)).unwrap();
        let mut bumped = first.resource;
        bumped.metadata.generation = Some(4);

        let out = transform_at(200).transform(bumped).unwrap();
        assert!(out.requeue.is_requeue());
        let status = out.resource.status.unwrap();
        let ready = status.condition(READY_CONDITION).unwrap();
        assert_eq!(ready.observed_generation, Some(4));
        assert_eq!(ready.last_transition_time.as_datetime().timestamp(), 200);
    }

    #[test]
    fn other_conditions_are_preserved() {
        let input = topology(
            r#"{"metadata":{"name":"lab"},"spec":{},"status":{"conditions":[
                {"type":"Synced","status":"False","reason":"Pending","message":"",
                 "lastTransitionTime":"2024-01-01T00:00:00Z"}]}}"#,
        );
        let out = transform_at(0).transform(input).unwrap();
        let status = out.resource.status.unwrap();
        assert!(status.condition("Synced").is_some());
        assert!(status.condition(READY_CONDITION).is_some());
    }

    #[test]
    fn colliding_link_names_are_an_input_error() {
        let input = topology(
            r#"{"metadata":{"name":"lab"},"spec":{
                "nodes":[{"name":"a","type":"x"},{"name":"b","type":"x"}],
                "links":[{"endpoints":[{"node":"a","port":1},{"node":"b","port":1}]},
                         {"endpoints":[{"node":"a","port":1},{"node":"b","port":1}]}]}}"#,
        );
        let err = transform_at(0).transform(input).unwrap_err();
        assert!(matches!(err, TransformError::Input { .. }));
    }

    #[test]
    fn unvalidated_node_is_an_internal_error() {
        let input = topology(r#"{"metadata":{"name":"lab"},"spec":{"nodes":[{"name":"a"}]}}"#);
        let err = transform_at(0).transform(input).unwrap_err();
        assert!(matches!(err, TransformError::Internal { .. }));
    }
}
