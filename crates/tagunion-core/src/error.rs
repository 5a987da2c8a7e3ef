//! Error types for schema construction.
//!
//! These are configuration errors: the schema itself is malformed. Validation
//! failures on input data are reported as issues instead (see [`crate::issue`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Primitive;

/// Stable, machine-readable error codes.
///
/// Variant names and their serialized `snake_case` strings are part of the
/// public contract and must not change across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A variant's discriminator field yields no extractable value.
    MissingDiscriminator,
    /// A nested union yields no value for its parent's discriminator.
    MissingNestedDiscriminator,
    /// Two variants claim the same discriminator value.
    DuplicateDiscriminatorValue,
    /// Mutually exclusive configuration options were combined.
    InvalidConfig,
    /// A union was created with an empty variant list.
    NoVariants,
    /// A variant is neither an object schema nor a discriminated union.
    InvalidVariant,
    /// A declarative schema definition could not be built.
    InvalidDefinition,
    /// JSON (de)serialization error.
    JsonParseError,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(
        "A discriminator value for key `{discriminator}` could not be extracted from all schema options"
    )]
    MissingDiscriminator { discriminator: String },

    #[error(
        "No value for key `{discriminator}` was found for discriminated union with discriminator `{nested}`"
    )]
    MissingNestedDiscriminator {
        discriminator: String,
        nested: String,
    },

    #[error("Discriminator property `{discriminator}` has duplicate value `{value}`")]
    DuplicateDiscriminatorValue {
        discriminator: String,
        value: Primitive,
    },

    #[error("{message}")]
    InvalidConfig { message: String },

    #[error("Discriminated union on `{discriminator}` needs at least one option")]
    NoVariants { discriminator: String },

    #[error(
        "Options of a discriminated union on `{discriminator}` must be object or discriminated union schemas (found: {found})"
    )]
    InvalidVariant { discriminator: String, found: String },

    #[error("Invalid schema definition: {message}")]
    InvalidDefinition { message: String },

    #[error("JSON (de)serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SchemaError {
    /// Returns the stable error code for this error variant.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            SchemaError::MissingDiscriminator { .. } => ErrorCode::MissingDiscriminator,
            SchemaError::MissingNestedDiscriminator { .. } => {
                ErrorCode::MissingNestedDiscriminator
            }
            SchemaError::DuplicateDiscriminatorValue { .. } => {
                ErrorCode::DuplicateDiscriminatorValue
            }
            SchemaError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            SchemaError::NoVariants { .. } => ErrorCode::NoVariants,
            SchemaError::InvalidVariant { .. } => ErrorCode::InvalidVariant,
            SchemaError::InvalidDefinition { .. } => ErrorCode::InvalidDefinition,
            SchemaError::JsonError(_) => ErrorCode::JsonParseError,
        }
    }

    /// The discriminator key the error concerns, if any.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            SchemaError::MissingDiscriminator { discriminator }
            | SchemaError::MissingNestedDiscriminator { discriminator, .. }
            | SchemaError::DuplicateDiscriminatorValue { discriminator, .. }
            | SchemaError::NoVariants { discriminator }
            | SchemaError::InvalidVariant { discriminator, .. } => Some(discriminator),
            SchemaError::InvalidConfig { .. }
            | SchemaError::InvalidDefinition { .. }
            | SchemaError::JsonError(_) => None,
        }
    }

    /// Produces a structured JSON error.
    ///
    /// Format: `{"code": "...", "message": "...", "discriminator": "..." | null}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
            "discriminator": self.discriminator(),
        })
    }
}
