//! Failure outcome of a reconciliation call.
//!
//! [`ReconcileError`] is the only error shape the host ever observes. It is
//! deliberately flat: a stable numeric [`ErrorCode`] the host may branch on,
//! and a message the host must only log or surface.
//!
//! The [`ErrorKind`] names the pipeline stage that failed. It is available to
//! in-process callers and observers but is not part of the wire contract; the
//! wire carries only `code` and `message`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Who is responsible for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The caller-supplied payload is at fault. Resubmitting the same payload
    /// will fail the same way.
    Input,
    /// The reconciliation logic or schema is at fault despite valid input.
    /// Hosts should alert rather than blindly retry.
    Internal,
}

impl ErrorClass {
    /// Returns the stable wire code for this class.
    pub fn code(self) -> ErrorCode {
        match self {
            Self::Input => ErrorCode::INPUT,
            Self::Internal => ErrorCode::INTERNAL,
        }
    }
}

// ---------------------------------------------------------------------------

/// Stable numeric error code, mirroring the HTTP status taxonomy.
///
/// | Code | Class |
/// |------|-------|
/// | 400  | [`ErrorClass::Input`] |
/// | 500  | [`ErrorClass::Internal`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// Caller/input errors.
    pub const INPUT: Self = Self(400);

    /// Reconciliation defects.
    pub const INTERNAL: Self = Self(500);

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// The pipeline stage a [`ReconcileError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The payload was empty or whitespace-only.
    EmptyInput,
    /// The payload could not be decoded into the domain resource.
    Decode,
    /// The decoded resource failed semantic validation.
    Validation,
    /// The transformation rejected the resource because of its content.
    TransformInput,
    /// The transformation failed for a reason unrelated to the input.
    TransformInternal,
    /// The transformed resource could not be encoded.
    Encode,
}

impl ErrorKind {
    /// Returns the responsibility class of this kind.
    pub fn class(self) -> ErrorClass {
        match self {
            Self::EmptyInput | Self::Decode | Self::Validation | Self::TransformInput => {
                ErrorClass::Input
            }
            Self::TransformInternal | Self::Encode => ErrorClass::Internal,
        }
    }
}

// ---------------------------------------------------------------------------
// Reconcile error
// ---------------------------------------------------------------------------

/// Message returned for empty or whitespace-only payloads.
pub const EMPTY_INPUT_MESSAGE: &str = "cannot reconcile with empty input";

/// Message returned when the transformed resource cannot be encoded.
pub const ENCODE_FAILED_MESSAGE: &str = "cannot encode reconciled resource";

/// A structured reconciliation failure.
///
/// Never carries a partial result. The message is for humans only; hosts make
/// control decisions from [`ReconcileError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("reconcile failed ({}): {message}", .kind.class().code())]
pub struct ReconcileError {
    kind: ErrorKind,
    message: String,
}

impl ReconcileError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The payload was empty or whitespace-only.
    pub fn empty_input() -> Self {
        Self::new(ErrorKind::EmptyInput, EMPTY_INPUT_MESSAGE)
    }

    /// The payload could not be decoded; `description` is a short, stable
    /// summary of why.
    pub fn decode(description: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Decode,
            format!("cannot decode input: {description}"),
        )
    }

    /// The transformed resource could not be encoded.
    pub fn encode() -> Self {
        Self::new(ErrorKind::Encode, ENCODE_FAILED_MESSAGE)
    }

    /// Returns the stage this error originated from.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the responsibility class.
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Returns the stable wire code.
    pub fn code(&self) -> ErrorCode {
        self.kind.class().code()
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
