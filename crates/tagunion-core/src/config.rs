//! Creation parameters for discriminated unions.
//!
//! Callers supply [`RawCreateParams`], a flat bag of optional settings. It is
//! converted into [`CreateParams`], whose [`ErrorStrategy`] makes the custom
//! error map and the simple message overrides mutually exclusive by type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::issue::{ErrorMap, ErrorMapContext, IssueKind};

const CONFLICTING_ERROR_OPTIONS: &str = "Can't use \"invalid_type_error\" or \"invalid_union_discriminator\" in conjunction with custom error map.";

/// Simple message overrides for the two issues a union raises itself.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (`invalid-type-error`,
/// `invalid-union-discriminator`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessageOverrides {
    /// Replaces the not-an-object message.
    pub invalid_type_error: Option<String>,
    /// Replaces the no-matching-variant message.
    pub invalid_union_discriminator: Option<String>,
}

impl MessageOverrides {
    pub fn is_empty(&self) -> bool {
        self.invalid_type_error.is_none() && self.invalid_union_discriminator.is_none()
    }
}

/// How a union formats the messages of the issues it raises.
#[derive(Clone, Default)]
pub enum ErrorStrategy {
    /// Built-in messages.
    #[default]
    Default,
    /// A custom map formats every message.
    CustomMap(ErrorMap),
    /// Per-issue message overrides; anything not overridden keeps the default.
    Messages(MessageOverrides),
}

impl ErrorStrategy {
    pub fn message_for(&self, kind: &IssueKind, ctx: &ErrorMapContext<'_>) -> String {
        match self {
            ErrorStrategy::Default => ctx.default_error.to_string(),
            ErrorStrategy::CustomMap(map) => map(kind, ctx),
            ErrorStrategy::Messages(overrides) => {
                let custom = match kind {
                    IssueKind::InvalidType { .. } => overrides.invalid_type_error.as_ref(),
                    IssueKind::InvalidUnionDiscriminator { .. } => {
                        overrides.invalid_union_discriminator.as_ref()
                    }
                    _ => None,
                };
                custom.map_or_else(|| ctx.default_error.to_string(), String::clone)
            }
        }
    }
}

impl fmt::Debug for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStrategy::Default => f.write_str("Default"),
            ErrorStrategy::CustomMap(_) => f.write_str("CustomMap(..)"),
            ErrorStrategy::Messages(overrides) => {
                f.debug_tuple("Messages").field(overrides).finish()
            }
        }
    }
}

/// Unvalidated creation parameters, as accepted by
/// [`discriminated_union`](crate::discriminated_union).
#[derive(Clone, Default)]
pub struct RawCreateParams {
    pub error_map: Option<ErrorMap>,
    pub invalid_type_error: Option<String>,
    pub invalid_union_discriminator: Option<String>,
    /// Metadata only; no behavioral effect.
    pub description: Option<String>,
}

impl RawCreateParams {
    pub fn with_error_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&IssueKind, &ErrorMapContext<'_>) -> String + Send + Sync + 'static,
    {
        self.error_map = Some(std::sync::Arc::new(map));
        self
    }

    pub fn with_invalid_type_error(mut self, message: impl Into<String>) -> Self {
        self.invalid_type_error = Some(message.into());
        self
    }

    pub fn with_invalid_union_discriminator(mut self, message: impl Into<String>) -> Self {
        self.invalid_union_discriminator = Some(message.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for RawCreateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCreateParams")
            .field("error_map", &self.error_map.as_ref().map(|_| ".."))
            .field("invalid_type_error", &self.invalid_type_error)
            .field("invalid_union_discriminator", &self.invalid_union_discriminator)
            .field("description", &self.description)
            .finish()
    }
}

/// Validated creation parameters.
#[derive(Debug, Clone, Default)]
pub struct CreateParams {
    pub errors: ErrorStrategy,
    pub description: Option<String>,
}

impl TryFrom<RawCreateParams> for CreateParams {
    type Error = SchemaError;

    fn try_from(raw: RawCreateParams) -> Result<Self, Self::Error> {
        let overrides = MessageOverrides {
            invalid_type_error: raw.invalid_type_error,
            invalid_union_discriminator: raw.invalid_union_discriminator,
        };
        let errors = match (raw.error_map, overrides.is_empty()) {
            (Some(_), false) => {
                return Err(SchemaError::InvalidConfig {
                    message: CONFLICTING_ERROR_OPTIONS.to_string(),
                })
            }
            (Some(map), true) => ErrorStrategy::CustomMap(map),
            (None, false) => ErrorStrategy::Messages(overrides),
            (None, true) => ErrorStrategy::Default,
        };
        Ok(Self {
            errors,
            description: raw.description,
        })
    }
}
