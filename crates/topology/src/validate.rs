//! Semantic validation rules of the `Topology` kind.
//!
//! All violations are collected and reported together, in document order.
//! The messages are part of the schema's stable contract; hosts surface them
//! verbatim.

use std::collections::{HashMap, HashSet};

use reconcile::ValidationError;

use crate::{Topology, KIND};

/// Validates a decoded topology.
pub fn validate(topology: &Topology) -> Result<(), ValidationError> {
    match ValidationError::from_violations(violations(topology)) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Returns every rule the topology breaks, in document order.
pub fn violations(topology: &Topology) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(kind) = topology.kind.as_deref() {
        if kind != KIND {
            out.push(format!("kind must be \"{KIND}\", got \"{kind}\""));
        }
    }

    if topology.metadata.name.trim().is_empty() {
        out.push("metadata.name must not be empty".to_owned());
    }

    let Some(spec) = &topology.spec else {
        return out;
    };

    let defaults = spec.defaults.as_ref();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut declared: HashSet<&str> = HashSet::new();

    for (idx, node) in spec.nodes().iter().enumerate() {
        let merged = node.merged_with(defaults);

        match node.name.as_deref().filter(|n| !n.trim().is_empty()) {
            None => out.push(format!("spec.nodes[{idx}].name must not be empty")),
            Some(name) => {
                declared.insert(name);
                if first_seen.insert(name, idx).is_some() {
                    out.push(format!("spec.nodes[{idx}].name \"{name}\" is duplicated"));
                }
            }
        }

        if merged
            .node_type
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
        {
            out.push(format!("spec.nodes[{idx}].type is required"));
        }
    }

    for (idx, link) in spec.links().iter().enumerate() {
        let endpoints = link.endpoints();
        if endpoints.len() != 2 {
            out.push(format!(
                "spec.links[{idx}].endpoints must contain exactly 2 entries, got {}",
                endpoints.len()
            ));
        }
        for endpoint in endpoints {
            if !declared.contains(endpoint.node.as_str()) {
                out.push(format!(
                    "Endpoint references unknown node: {}",
                    endpoint.node
                ));
            }
        }
    }

    out
}
