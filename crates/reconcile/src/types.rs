//! Success outcome of a reconciliation call.
//!
//! A [`ReconcileResult`] carries the re-encoded resource and a [`Requeue`]
//! decision. The decision is a sum type rather than a `(bool, Duration)` pair
//! so that "do not requeue, but after 30 seconds" cannot be constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ReconcileError;

// ---------------------------------------------------------------------------
// Requeue decision
// ---------------------------------------------------------------------------

/// Whether the host should invoke `reconcile` again for the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requeue {
    /// The resource is stable; no further pass is needed.
    #[default]
    Never,
    /// Another pass is needed after at least this delay. A zero delay means
    /// "as soon as the host sees fit".
    After(Duration),
}

impl Requeue {
    /// Returns `true` if the host should requeue.
    pub fn is_requeue(self) -> bool {
        matches!(self, Self::After(_))
    }

    /// Returns the requeue delay; always zero for [`Requeue::Never`].
    pub fn delay(self) -> Duration {
        match self {
            Self::Never => Duration::ZERO,
            Self::After(delay) => delay,
        }
    }

    /// Returns the delay in whole seconds, rounded up and saturating at
    /// `u32::MAX`. This is the unit carried on the wire.
    pub fn delay_secs(self) -> u32 {
        let delay = self.delay();
        let secs = delay
            .as_secs()
            .saturating_add(u64::from(delay.subsec_nanos() > 0));
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

// ---------------------------------------------------------------------------
// Reconcile result
// ---------------------------------------------------------------------------

/// A successful reconciliation: the updated resource the host should persist
/// and whether to come back later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    object: String,
    requeue: Requeue,
}

impl ReconcileResult {
    /// A final result: the resource has reached a stable point.
    pub fn done(object: impl Into<String>) -> Self {
        Self::new(object, Requeue::Never)
    }

    /// A result that asks the host for another pass after `delay`.
    pub fn requeue_after(object: impl Into<String>, delay: Duration) -> Self {
        Self::new(object, Requeue::After(delay))
    }

    /// Creates a result from an explicit [`Requeue`] decision.
    pub fn new(object: impl Into<String>, requeue: Requeue) -> Self {
        Self {
            object: object.into(),
            requeue,
        }
    }

    /// Returns the encoded resource.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Consumes the result, returning the encoded resource.
    pub fn into_object(self) -> String {
        self.object
    }

    /// Returns the requeue decision.
    pub fn requeue(&self) -> Requeue {
        self.requeue
    }

    /// Returns `true` if the host should requeue.
    pub fn is_requeue(&self) -> bool {
        self.requeue.is_requeue()
    }

    /// Returns the requeue delay; zero whenever [`Self::is_requeue`] is false.
    pub fn delay(&self) -> Duration {
        self.requeue.delay()
    }
}

/// Exactly one of the two outcome shapes of a reconciliation call.
pub type Outcome = Result<ReconcileResult, ReconcileError>;

// ---------------------------------------------------------------------------
// Transformation output
// ---------------------------------------------------------------------------

/// What a transformation stage hands back to the core: the updated resource
/// and its own verdict on whether another pass is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<R> {
    /// The transformed resource, ready to be re-encoded.
    pub resource: R,
    /// The transformation's requeue decision.
    pub requeue: Requeue,
}

impl<R> Transformed<R> {
    /// The resource is stable.
    pub fn stable(resource: R) -> Self {
        Self {
            resource,
            requeue: Requeue::Never,
        }
    }

    /// The resource needs another pass after `delay`.
    pub fn requeue_after(resource: R, delay: Duration) -> Self {
        Self {
            resource,
            requeue: Requeue::After(delay),
        }
    }
}
