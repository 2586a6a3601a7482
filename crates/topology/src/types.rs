//! The `Topology` resource (`topo.kubenet.dev/v1alpha1`) and the child
//! resources derived from it.
//!
//! Every user-facing struct keeps unknown JSON fields in an `extra` map so
//! that a reconcile pass never drops data it does not understand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::{Condition, Extra, ObjectMeta, Relationship};

/// Kind name of the resource.
pub const KIND: &str = "Topology";

/// Type of the condition the transform maintains.
pub const READY_CONDITION: &str = "Ready";

/// Reason recorded on the `Ready` condition after a successful pass.
pub const RECONCILED_REASON: &str = "Reconciled";

/// API group/version of the derived node and link resources.
pub const INFRA_API_VERSION: &str = "infra.kuid.dev/v1alpha1";

/// Kind of a derived node resource.
pub const NODE_KIND: &str = "Node";

/// Kind of a derived link resource.
pub const LINK_KIND: &str = "Link";

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// A set of nodes and the links between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub metadata: ObjectMeta,

    /// Desired state. A topology without a spec has nothing to reconcile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<TopologySpec>,

    /// Observed state, owned by the transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TopologyStatus>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Desired state of a [`Topology`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpec {
    /// Values inherited by every node that does not set them itself.
    /// `defaults.name` is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<TopologyNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<TopologyNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<TopologyLink>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl TopologySpec {
    /// Returns the declared nodes, or an empty slice.
    pub fn nodes(&self) -> &[TopologyNode] {
        self.nodes.as_deref().unwrap_or_default()
    }

    /// Returns the declared links, or an empty slice.
    pub fn links(&self) -> &[TopologyLink] {
        self.links.as_deref().unwrap_or_default()
    }
}

/// A node as declared in a topology, or the node defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// Manufacturer-specific node type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl TopologyNode {
    /// Returns this node with every unset field taken from `defaults`.
    /// The name is never inherited.
    pub fn merged_with(&self, defaults: Option<&TopologyNode>) -> TopologyNode {
        let Some(d) = defaults else {
            return self.clone();
        };
        TopologyNode {
            name: self.name.clone(),
            region: self.region.clone().or_else(|| d.region.clone()),
            site: self.site.clone().or_else(|| d.site.clone()),
            rack: self.rack.clone().or_else(|| d.rack.clone()),
            position: self.position.clone().or_else(|| d.position.clone()),
            labels: self.labels.clone().or_else(|| d.labels.clone()),
            node_type: self.node_type.clone().or_else(|| d.node_type.clone()),
            provider: self.provider.clone().or_else(|| d.provider.clone()),
            version: self.version.clone().or_else(|| d.version.clone()),
            extra: self.extra.clone(),
        }
    }
}

/// A link as declared in a topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyLink {
    /// The two endpoints of the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<LinkEndpoint>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl TopologyLink {
    /// Returns the endpoints, or an empty slice.
    pub fn endpoints(&self) -> &[LinkEndpoint] {
        self.endpoints.as_deref().unwrap_or_default()
    }
}

/// One side of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEndpoint {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_bay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<u32>,
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<u32>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl LinkEndpoint {
    /// Creates an endpoint on `node`/`port`.
    pub fn new(node: impl Into<String>, port: u32) -> Self {
        Self {
            node: node.into(),
            module_bay: None,
            module: None,
            port,
            adaptor: None,
            endpoint: None,
            extra: Extra::new(),
        }
    }

    /// Returns the set identifier parts in declaration order: node,
    /// moduleBay, module, port, adaptor, endpoint.
    pub fn name_parts(&self) -> Vec<String> {
        let mut parts = vec![self.node.clone()];
        parts.extend(self.module_bay.map(|v| v.to_string()));
        parts.extend(self.module.map(|v| v.to_string()));
        parts.push(self.port.to_string());
        parts.extend(self.adaptor.clone());
        parts.extend(self.endpoint.map(|v| v.to_string()));
        parts
    }
}

// ---------------------------------------------------------------------------
// Status and derived children
// ---------------------------------------------------------------------------

/// Observed state of a [`Topology`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,

    /// Node resources derived from the spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<DerivedNode>>,

    /// Link resources derived from the spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<DerivedLink>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl TopologyStatus {
    /// Returns the condition of the given type, if any.
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|c| c.condition_type == condition_type)
    }
}

/// Administrative state of an infrastructure resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Enable,
    Maintenance,
    /// Spelling matches the upstream API.
    Decomissioned,
    Standby,
}

/// A node resource (`infra.kuid.dev/v1alpha1`) derived from a topology node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedNode {
    pub api_version: String,
    pub kind: String,
    /// Named `<topology>.<node>`, in the topology's namespace.
    pub metadata: ObjectMeta,
    pub spec: NodeSpec,
}

impl DerivedNode {
    pub fn new(metadata: ObjectMeta, spec: NodeSpec) -> Self {
        Self {
            api_version: INFRA_API_VERSION.to_owned(),
            kind: NODE_KIND.to_owned(),
            metadata,
            spec,
        }
    }
}

/// Desired state of a derived node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Short node name as declared in the topology.
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub serial_number: String,
    pub manufacturer: String,
    pub admin_state: AdminState,
}

/// A link resource (`infra.kuid.dev/v1alpha1`) derived from a topology link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedLink {
    pub api_version: String,
    pub kind: String,
    /// Named `<topology>.<endpoint parts>`, in the topology's namespace.
    pub metadata: ObjectMeta,
    pub spec: LinkSpec,
}

impl DerivedLink {
    pub fn new(metadata: ObjectMeta, spec: LinkSpec) -> Self {
        Self {
            api_version: INFRA_API_VERSION.to_owned(),
            kind: LINK_KIND.to_owned(),
            metadata,
            spec,
        }
    }
}

/// Desired state of a derived link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub endpoints: Vec<LinkEndpoint>,
    pub admin_state: AdminState,
}
