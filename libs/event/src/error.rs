//! Error types for transfer conversion.

use thiserror::Error;

use crate::schema::FieldKind;

/// Errors that can occur when converting events to or from transfer records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The concrete variant type cannot be round-tripped.
    #[error("type `{type_name}` is not eligible for transfer conversion: field `{field}` {rule}")]
    IneligibleType {
        type_name: &'static str,
        field: &'static str,
        rule: EligibilityRule,
    },

    /// The recorded namespace or type tag does not name a registered variant.
    #[error("cannot resolve event type `{type_tag}` in namespace `{namespace}`: {reason}")]
    ResolutionFailure {
        namespace: String,
        type_tag: String,
        reason: ResolutionReason,
    },

    /// The resolved variant rejected the reconstructed field set.
    #[error("cannot reconstruct `{type_tag}`: {source}")]
    ReconstructionFailure {
        type_tag: String,
        #[source]
        source: ReconstructionError,
    },

    /// The record nests deeper than the configured limit.
    #[error("event nesting exceeds depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A variant was registered twice under the same tags.
    #[error("event type `{type_tag}` already registered in namespace `{namespace}`")]
    DuplicateRegistration { namespace: String, type_tag: String },

    /// A float field has no JSON representation (NaN or an infinity).
    #[error("field `{field}` holds a non-finite float, which JSON cannot represent")]
    NonFiniteFloat { field: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Returns true if the error comes from the structural validator.
    pub fn is_ineligible(&self) -> bool {
        matches!(self, CodecError::IneligibleType { .. })
    }

    /// Returns true if the namespace or type tag could not be resolved.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, CodecError::ResolutionFailure { .. })
    }

    /// Returns true if a resolved variant could not be rebuilt from its fields.
    pub fn is_reconstruction_failure(&self) -> bool {
        matches!(self, CodecError::ReconstructionFailure { .. })
    }

    pub(crate) fn reconstruction(type_tag: impl Into<String>, source: ReconstructionError) -> Self {
        CodecError::ReconstructionFailure {
            type_tag: type_tag.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

/// The validator rule a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EligibilityRule {
    #[error("is private (leading underscore)")]
    PrivateField,

    #[error("is excluded from construction")]
    ExcludedFromConstructor,

    #[error("collides with a reserved tag name")]
    ReservedName,

    #[error("is declared more than once")]
    DuplicateField,
}

/// Why a namespace/type tag pair failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionReason {
    #[error("unknown namespace")]
    UnknownNamespace,

    #[error("unknown type tag")]
    UnknownTypeTag,

    #[error("tag is not valid UTF-8")]
    InvalidUtf8,
}

/// Field-level reasons a reconstruction was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("unexpected field `{0}`")]
    UnexpectedField(String),

    #[error("field `{0}` given more than once")]
    DuplicateField(String),

    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        found: String,
    },
}
