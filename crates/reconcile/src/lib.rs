//! Reconciliation core.
//!
//! This crate defines the contract every guest-side reconciler honours: a
//! pure, synchronous `reconcile(input) -> Outcome` that decodes, validates,
//! transforms and re-encodes one resource, and answers with either a
//! [`ReconcileResult`] (plus a [`Requeue`] hint) or a [`ReconcileError`].
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies
//! and holds no state across calls. Schema crates implement
//! [`ResourceSchema`] and [`Transform`]; the boundary adapter binds a
//! [`Reconciler`] to the export slot through [`ReconcileFn`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`reconciler`] | The pipeline, its [`Stage`] machine and the [`ReconcileFn`] port |
//! | [`schema`] | Collaborator ports and their error types, JSON codec helpers |
//! | [`types`] | Success outcome: [`ReconcileResult`], [`Requeue`], [`Transformed`] |
//! | [`errors`] | Failure outcome: [`ReconcileError`] and its code taxonomy |
//! | [`observer`] | Optional structured-event hook |

pub mod errors;
pub mod observer;
pub mod reconciler;
pub mod schema;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    ErrorClass, ErrorCode, ErrorKind, ReconcileError, EMPTY_INPUT_MESSAGE, ENCODE_FAILED_MESSAGE,
};
pub use observer::{ReconcileObserver, TracingObserver};
pub use reconciler::{ReconcileFn, Reconciler, Stage};
pub use schema::{
    DecodeCategory, DecodeError, EncodeError, ResourceSchema, Transform, TransformError,
    ValidationError,
};
pub use types::{Outcome, ReconcileResult, Requeue, Transformed};
