//! Collaborator ports consumed by the reconciliation core.
//!
//! The core does not know what resource it reconciles. A schema crate supplies
//! a [`ResourceSchema`] (decode, validate, encode) and a [`Transform`]
//! (defaulting, normalisation, status computation); the core sequences them
//! and turns their failures into [`crate::ReconcileError`]s.
//!
//! The [`json`] module provides the serde-based codec most schemas want.

use thiserror::Error;

use crate::Transformed;

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Short, stable classification of a decode failure.
///
/// This is the only part of a decoder error that reaches the host; the
/// decoder's own text is kept in [`DecodeError::detail`] for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeCategory {
    /// The payload is not well-formed in the encoding (e.g. not JSON).
    Syntax,
    /// The payload ended before a complete document was read.
    Eof,
    /// The payload is well-formed but does not match the resource structure.
    Data,
    /// The underlying reader failed.
    Io,
}

impl std::fmt::Display for DecodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Syntax => "syntax error",
            Self::Eof => "unexpected end of input",
            Self::Data => "invalid structure",
            Self::Io => "io error",
        };
        f.write_str(text)
    }
}

/// The payload could not be decoded into the domain resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category}: {detail}")]
pub struct DecodeError {
    /// Stable classification.
    pub category: DecodeCategory,
    /// Decoder-specific diagnostic. Not part of the stable interface.
    pub detail: String,
}

impl DecodeError {
    /// Creates a decode error.
    pub fn new(category: DecodeCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let category = match err.classify() {
            Category::Io => DecodeCategory::Io,
            Category::Syntax => DecodeCategory::Syntax,
            Category::Data => DecodeCategory::Data,
            Category::Eof => DecodeCategory::Eof,
        };
        Self::new(category, err.to_string())
    }
}

// ---------------------------------------------------------------------------

/// The decoded resource failed semantic validation.
///
/// The message belongs to the domain schema's stable contract and is surfaced
/// to the host unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a validation error from a list of violations, joined with
    /// `"; "`. Returns `None` if there are no violations.
    pub fn from_violations<I, S>(violations: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = violations
            .into_iter()
            .map(|v| v.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("; ");
        if joined.is_empty() {
            None
        } else {
            Some(Self::new(joined))
        }
    }

    /// Returns the validator's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------

/// The transformed resource could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct EncodeError {
    /// Encoder-specific diagnostic.
    pub detail: String,
}

impl EncodeError {
    /// Creates an encode error.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

// ---------------------------------------------------------------------------

/// The transformation stage failed.
///
/// The transformation knows whether the failure is the caller's fault, so it
/// picks the class itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The resource content makes the transformation impossible (e.g. two
    /// derived children collide). Maps to an input-class error.
    #[error("{message}")]
    Input {
        /// Human-readable description, surfaced verbatim.
        message: String,
    },

    /// The transformation itself is defective. Maps to an internal-class
    /// error.
    #[error("{message}")]
    Internal {
        /// Human-readable description, surfaced verbatim.
        message: String,
    },
}

impl TransformError {
    /// Creates an input-class transform error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Creates an internal-class transform error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Decoder, validator and encoder for one domain resource type.
pub trait ResourceSchema: Send + Sync {
    /// The typed, decoded resource.
    type Resource;

    /// Decodes a non-empty payload into the resource.
    fn decode(&self, payload: &str) -> Result<Self::Resource, DecodeError>;

    /// Checks the semantic rules of the resource.
    fn validate(&self, resource: &Self::Resource) -> Result<(), ValidationError>;

    /// Encodes the resource using the same encoding [`Self::decode`] accepts.
    fn encode(&self, resource: &Self::Resource) -> Result<String, EncodeError>;
}

/// Domain-specific reconciliation logic for a validated resource.
///
/// Implementations must be pure with respect to everything except their own
/// injected collaborators (e.g. a clock).
pub trait Transform<R>: Send + Sync {
    /// Transforms a validated resource and decides whether another pass is
    /// needed.
    fn transform(&self, resource: R) -> Result<Transformed<R>, TransformError>;
}

impl<R, F> Transform<R> for F
where
    F: Fn(R) -> Result<Transformed<R>, TransformError> + Send + Sync,
{
    fn transform(&self, resource: R) -> Result<Transformed<R>, TransformError> {
        self(resource)
    }
}

// ---------------------------------------------------------------------------
// JSON codec
// ---------------------------------------------------------------------------

/// serde_json-backed decode/encode helpers for [`ResourceSchema`] impls.
pub mod json {
    use serde::de::DeserializeOwned;
    use serde::Serialize;

    use super::{DecodeError, EncodeError};

    /// Decodes a JSON document.
    pub fn decode<R: DeserializeOwned>(payload: &str) -> Result<R, DecodeError> {
        serde_json::from_str(payload).map_err(DecodeError::from)
    }

    /// Encodes a value as compact JSON.
    pub fn encode<R: Serialize>(resource: &R) -> Result<String, EncodeError> {
        serde_json::to_string(resource).map_err(EncodeError::from)
    }
}
