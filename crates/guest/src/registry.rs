//! The export slot.
//!
//! Exactly one reconciler is bound to the `reconcile` export per process.
//! Binding happens once, before or at the first call, and can never be
//! changed afterwards: [`register`] succeeds only while the slot is empty,
//! and the first call through [`exported`] fills an empty slot with
//! [`crate::default_reconciler`].

use std::sync::{Arc, OnceLock};

use reconcile::ReconcileFn;
use thiserror::Error;
use tracing::debug_span;

use crate::wire::{to_wire, WireError, WireResult};

static EXPORT: OnceLock<Export> = OnceLock::new();

/// The slot already holds a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a reconciler is already bound to the reconcile export")]
pub struct AlreadyRegistered;

/// Immutable handle to the reconciler serving the export.
#[derive(Clone)]
pub struct Export {
    handle: Arc<dyn ReconcileFn>,
}

impl Export {
    /// Wraps a reconciler.
    pub fn new(handle: Arc<dyn ReconcileFn>) -> Self {
        Self { handle }
    }

    /// Reconciles one payload and returns the wire outcome.
    pub fn call(&self, object: &str) -> Result<WireResult, WireError> {
        let _span = debug_span!("reconcile", input_len = object.len()).entered();
        to_wire(self.handle.reconcile(object))
    }
}

/// Binds `export` to the process-wide slot.
pub fn register(export: Export) -> Result<(), AlreadyRegistered> {
    EXPORT.set(export).map_err(|_| AlreadyRegistered)
}

/// Returns `true` once the slot has been filled.
pub fn is_registered() -> bool {
    EXPORT.get().is_some()
}

/// Returns the bound export, binding the default reconciler if the slot is
/// still empty.
pub fn exported() -> &'static Export {
    EXPORT.get_or_init(|| Export::new(Arc::new(crate::default_reconciler())))
}

/// Calls the bound export. This is what the component export delegates to.
pub fn call(object: &str) -> Result<WireResult, WireError> {
    exported().call(object)
}
