//! Topology resource schema.
//!
//! Defines the `Topology` kind (`topo.kubenet.dev/v1alpha1`): a named set of
//! nodes, node defaults and point-to-point links. This crate supplies the
//! three collaborators the reconciliation core consumes:
//!
//! - [`TopologySchema`]: JSON decode/encode and the semantic rules in
//!   [`validate`].
//! - [`TopologyTransform`]: derives node and link resources into `status`
//!   and maintains the `Ready` condition.
//! - [`Clock`]: injected time, so the transform stays deterministic under
//!   test.
//!
//! [`reconciler`] wires them into a [`reconcile::Reconciler`].
//!
//! ## Architectural Layer
//!
//! **Domain schema.** No I/O; the only source of non-determinism is the
//! injected [`Clock`].

use std::sync::Arc;

pub mod clock;
pub mod config;
pub mod meta;
pub mod schema;
pub mod transform;
pub mod types;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use config::{ConfigError, TopologyConfig};
pub use meta::{Condition, ConditionStatus, ObjectMeta, Relationship};
pub use schema::TopologySchema;
pub use transform::TopologyTransform;
pub use types::{
    AdminState, DerivedLink, DerivedNode, LinkEndpoint, LinkSpec, NodeSpec, Topology,
    TopologyLink, TopologyNode, TopologySpec, TopologyStatus, INFRA_API_VERSION, KIND,
    LINK_KIND, NODE_KIND, READY_CONDITION, RECONCILED_REASON,
};

/// The reconciler for the `Topology` kind.
pub type TopologyReconciler = reconcile::Reconciler<TopologySchema, TopologyTransform>;

/// Builds a topology reconciler from its configuration and clock.
pub fn reconciler(config: TopologyConfig, clock: Arc<dyn Clock>) -> TopologyReconciler {
    reconcile::Reconciler::new(TopologySchema, TopologyTransform::new(config, clock))
}
