//! Optional structured-event hook for a reconciliation call.
//!
//! The core never logs on its own. A caller that wants visibility installs a
//! [`ReconcileObserver`]; [`TracingObserver`] forwards the events to
//! `tracing`, which is what the guest and host layers use.

use tracing::{debug, error, trace, warn};

use crate::{DecodeError, ErrorClass, Outcome, Stage};

/// Receives events from one or more reconciliation calls.
///
/// Every method has an empty default so implementors only override what they
/// care about. Observers are shared across concurrent calls and must not
/// assume calls are serialised.
pub trait ReconcileObserver: Send + Sync {
    /// The call entered `stage`.
    fn stage(&self, _stage: Stage) {}

    /// The decoder rejected the payload. `err.detail` carries the decoder's
    /// diagnostic, which the returned error deliberately omits.
    fn decode_failed(&self, _err: &DecodeError) {}

    /// The call is about to return `outcome`.
    fn finished(&self, _outcome: &Outcome) {}
}

/// Forwards observer events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn stage(&self, stage: Stage) {
        trace!(stage = %stage, terminal = stage.is_terminal(), "reconcile stage");
    }

    fn decode_failed(&self, err: &DecodeError) {
        debug!(category = %err.category, detail = %err.detail, "payload rejected by decoder");
    }

    fn finished(&self, outcome: &Outcome) {
        match outcome {
            Ok(result) => debug!(
                requeue = result.is_requeue(),
                requeue_after_secs = result.requeue().delay_secs(),
                object_len = result.object().len(),
                "reconcile succeeded"
            ),
            Err(err) if err.class() == ErrorClass::Internal => error!(
                code = err.code().as_u32(),
                kind = ?err.kind(),
                message = err.message(),
                "reconcile failed internally"
            ),
            Err(err) => warn!(
                code = err.code().as_u32(),
                kind = ?err.kind(),
                message = err.message(),
                "reconcile rejected input"
            ),
        }
    }
}
