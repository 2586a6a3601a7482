//! Wire shapes of the `reconcile` export.
//!
//! [`WireResult`] and [`WireError`] mirror the `reconcile-result` and
//! `reconcile-error` records of `wit/reconciler.wit` field for field. Hosts
//! that do not speak the component model exchange an [`Envelope`] as JSON
//! instead: `{"ok": {...}}` or `{"err": {...}}`.

use reconcile::{Outcome, ReconcileError, ReconcileResult};
use serde::{Deserialize, Serialize};

/// `reconcile-result` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WireResult {
    pub requeue: bool,
    /// Whole seconds; `0` whenever `requeue` is false.
    pub requeue_after: u32,
    pub object: String,
}

impl From<ReconcileResult> for WireResult {
    fn from(result: ReconcileResult) -> Self {
        let requeue = result.requeue();
        Self {
            requeue: requeue.is_requeue(),
            requeue_after: requeue.delay_secs(),
            object: result.into_object(),
        }
    }
}

/// `reconcile-error` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub code: u32,
    pub message: String,
}

impl From<ReconcileError> for WireError {
    fn from(err: ReconcileError) -> Self {
        Self {
            code: err.code().as_u32(),
            message: err.message().to_owned(),
        }
    }
}

/// Converts a core outcome into its wire form.
pub fn to_wire(outcome: Outcome) -> Result<WireResult, WireError> {
    outcome.map(WireResult::from).map_err(WireError::from)
}

// ---------------------------------------------------------------------------
// JSON envelope
// ---------------------------------------------------------------------------

/// Tagged JSON encoding of a wire outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Ok(WireResult),
    Err(WireError),
}

impl Envelope {
    /// Returns `true` for [`Envelope::Err`].
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Encodes the envelope as a single line of JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Result<WireResult, WireError>> for Envelope {
    fn from(result: Result<WireResult, WireError>) -> Self {
        match result {
            Ok(ok) => Self::Ok(ok),
            Err(err) => Self::Err(err),
        }
    }
}
