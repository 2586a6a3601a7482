//! The reconciliation pipeline.
//!
//! [`Reconciler`] binds a [`ResourceSchema`] and a [`Transform`] into the
//! single `reconcile(input) -> Outcome` operation. Each call walks the
//! [`Stage`] machine once, in strict order, and stops at the first failure:
//!
//! ```text
//! Start → Decoding → Validating → Transforming → Encoding → Success
//!   └──────────┴───────────┴─────────────┴────────────┴────→ Failed
//! ```
//!
//! There is no retry inside the core. A host that wants another pass reads
//! the [`crate::Requeue`] decision of a successful outcome.

use std::sync::Arc;

use crate::{
    ErrorKind, Outcome, ReconcileError, ReconcileObserver, ReconcileResult, ResourceSchema,
    Transform, TransformError, Transformed,
};

// ---------------------------------------------------------------------------
// Stage machine
// ---------------------------------------------------------------------------

/// Per-call pipeline state. Not persisted between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before the emptiness check.
    Start,
    /// Decoding the payload into the domain resource.
    Decoding,
    /// Running the schema validator.
    Validating,
    /// Running the domain transformation.
    Transforming,
    /// Re-encoding the transformed resource.
    Encoding,
    /// Terminal: a [`ReconcileResult`] is returned.
    Success,
    /// Terminal: a [`ReconcileError`] is returned.
    Failed,
}

impl Stage {
    /// Returns `true` for [`Stage::Success`] and [`Stage::Failed`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Decoding => "decoding",
            Self::Validating => "validating",
            Self::Transforming => "transforming",
            Self::Encoding => "encoding",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl From<TransformError> for ReconcileError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Input { message } => Self::new(ErrorKind::TransformInput, message),
            TransformError::Internal { message } => {
                Self::new(ErrorKind::TransformInternal, message)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Object-safe view of a reconciler, as bound to the export slot by the
/// boundary adapter.
pub trait ReconcileFn: Send + Sync {
    /// Reconciles one encoded resource.
    fn reconcile(&self, input: &str) -> Outcome;
}

/// A reconciler for one resource type.
///
/// Holds only immutable collaborators, so a single instance can serve any
/// number of concurrent calls.
pub struct Reconciler<S, T> {
    schema: S,
    transform: T,
    observer: Option<Arc<dyn ReconcileObserver>>,
}

impl<S, T> Reconciler<S, T>
where
    S: ResourceSchema,
    T: Transform<S::Resource>,
{
    /// Creates a reconciler with no observer.
    pub fn new(schema: S, transform: T) -> Self {
        Self {
            schema,
            transform,
            observer: None,
        }
    }

    /// Installs an observer that receives stage and outcome events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Reconciles one encoded resource.
    pub fn reconcile(&self, input: &str) -> Outcome {
        let outcome = self.run(input);
        self.enter(if outcome.is_ok() {
            Stage::Success
        } else {
            Stage::Failed
        });
        if let Some(observer) = &self.observer {
            observer.finished(&outcome);
        }
        outcome
    }

    fn run(&self, input: &str) -> Outcome {
        self.enter(Stage::Start);
        if input.trim().is_empty() {
            return Err(ReconcileError::empty_input());
        }

        self.enter(Stage::Decoding);
        let resource = self.schema.decode(input).map_err(|err| {
            if let Some(observer) = &self.observer {
                observer.decode_failed(&err);
            }
            ReconcileError::decode(err.category)
        })?;

        self.enter(Stage::Validating);
        self.schema
            .validate(&resource)
            .map_err(|err| ReconcileError::new(ErrorKind::Validation, err.message()))?;

        self.enter(Stage::Transforming);
        let Transformed { resource, requeue } = self.transform.transform(resource)?;

        self.enter(Stage::Encoding);
        let object = self
            .schema
            .encode(&resource)
            .map_err(|_| ReconcileError::encode())?;

        Ok(ReconcileResult::new(object, requeue))
    }

    fn enter(&self, stage: Stage) {
        if let Some(observer) = &self.observer {
            observer.stage(stage);
        }
    }
}

impl<S, T> ReconcileFn for Reconciler<S, T>
where
    S: ResourceSchema,
    T: Transform<S::Resource>,
{
    fn reconcile(&self, input: &str) -> Outcome {
        Reconciler::reconcile(self, input)
    }
}
