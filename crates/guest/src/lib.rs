//! Boundary adapter for the topology reconciler.
//!
//! Exposes exactly one operation across the host/guest boundary:
//!
//! ```text
//! reconcile: func(object: string) -> result<reconcile-result, reconcile-error>
//! ```
//!
//! as declared in `wit/reconciler.wit`. The adapter owns no reconciliation
//! logic. It binds a [`reconcile::ReconcileFn`] to the export slot once
//! ([`registry`]), forwards each payload to it, and marshals the outcome into
//! the wire records ([`wire`]).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** On `wasm32` the component-model export generated by
//! `wit-bindgen` delegates to [`registry::call`]. On native targets the same
//! entry point is called in-process by the host harness.

use std::sync::Arc;

use reconcile::TracingObserver;
use topology::{SystemClock, TopologyConfig, TopologyReconciler};

pub mod registry;
pub mod wire;

#[cfg(target_arch = "wasm32")]
mod component;

pub use registry::{call, exported, is_registered, register, AlreadyRegistered, Export};
pub use wire::{to_wire, Envelope, WireError, WireResult};

/// The reconciler bound to the export when the host registers nothing:
/// default topology configuration, system clock, `tracing` observer.
pub fn default_reconciler() -> TopologyReconciler {
    configured_reconciler(TopologyConfig::default())
}

/// A topology reconciler with the given configuration, the system clock and
/// the `tracing` observer.
pub fn configured_reconciler(config: TopologyConfig) -> TopologyReconciler {
    topology::reconciler(config, Arc::new(SystemClock)).with_observer(Arc::new(TracingObserver))
}
