//! Validation issues: structured, per-call failures on untrusted input.
//!
//! Issues are never raised as errors from schema construction; they accumulate
//! in a [`ParseContext`](crate::parse::ParseContext) and surface to the caller
//! as a [`ValidationError`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::{Primitive, Value, ValueType};

/// One segment of an issue path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Kind-specific issue payload, serialized with a `code` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueKind {
    InvalidType {
        expected: ValueType,
        received: ValueType,
    },
    InvalidLiteral {
        expected: Primitive,
        received: Value,
    },
    InvalidEnumValue {
        options: Vec<Primitive>,
        received: Value,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    InvalidUnionDiscriminator {
        options: Vec<Primitive>,
    },
    Custom,
}

impl IssueKind {
    /// The serialized `code` of this issue.
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::InvalidType { .. } => "invalid_type",
            IssueKind::InvalidLiteral { .. } => "invalid_literal",
            IssueKind::InvalidEnumValue { .. } => "invalid_enum_value",
            IssueKind::UnrecognizedKeys { .. } => "unrecognized_keys",
            IssueKind::InvalidUnionDiscriminator { .. } => "invalid_union_discriminator",
            IssueKind::Custom => "custom",
        }
    }

    pub fn default_message(&self) -> String {
        match self {
            IssueKind::InvalidType { received, .. } if *received == ValueType::Undefined => {
                "Required".to_string()
            }
            IssueKind::InvalidType { expected, received } => {
                format!("Expected {expected}, received {received}")
            }
            IssueKind::InvalidLiteral { expected, .. } => {
                format!(
                    "Invalid literal value, expected {}",
                    expected.to_value().to_json()
                )
            }
            IssueKind::InvalidEnumValue { options, received } => format!(
                "Invalid enum value. Expected {}, received {}",
                join_values(options, " | "),
                Primitive::from_value(received)
                    .map(|p| p.quoted())
                    .unwrap_or_else(|| received.value_type().to_string()),
            ),
            IssueKind::UnrecognizedKeys { keys } => {
                let quoted: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
                format!("Unrecognized key(s) in object: {}", quoted.join(", "))
            }
            IssueKind::InvalidUnionDiscriminator { options } => format!(
                "Invalid discriminator value. Expected {}",
                join_values(options, " | ")
            ),
            IssueKind::Custom => "Invalid input".to_string(),
        }
    }
}

fn join_values(values: &[Primitive], separator: &str) -> String {
    values
        .iter()
        .map(Primitive::quoted)
        .collect::<Vec<_>>()
        .join(separator)
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(flatten)]
    pub kind: IssueKind,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// What a custom error map sees besides the issue itself.
#[derive(Debug)]
pub struct ErrorMapContext<'a> {
    /// The message that would be used without the custom map.
    pub default_error: &'a str,
    /// The data being validated where the issue was raised.
    pub data: &'a Value,
    pub path: &'a [PathSegment],
}

/// Custom message formatter: receives the issue payload and context, returns
/// the final message.
pub type ErrorMap = Arc<dyn Fn(&IssueKind, &ErrorMapContext<'_>) -> String + Send + Sync>;

/// The failed outcome of a parse: every issue collected, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.issues).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string_pretty(&self.issues).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl std::error::Error for ValidationError {}

/// Result of parsing a value against a schema.
pub type ParseResult = Result<Value, ValidationError>;

/// Outcome of a non-failing parse.
///
/// Serialized (via [`SafeParseReturn::to_json`]) as `{"success": true, "data": ..}`
/// or `{"success": false, "error": {"issues": [..]}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParseReturn {
    Success(Value),
    Failure(ValidationError),
}

impl SafeParseReturn {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParseReturn::Success(_))
    }

    pub fn into_result(self) -> ParseResult {
        match self {
            SafeParseReturn::Success(value) => Ok(value),
            SafeParseReturn::Failure(err) => Err(err),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SafeParseReturn::Success(value) => serde_json::json!({
                "success": true,
                "data": value.to_json(),
            }),
            SafeParseReturn::Failure(err) => serde_json::json!({
                "success": false,
                "error": { "issues": err.to_json() },
            }),
        }
    }
}

impl From<ParseResult> for SafeParseReturn {
    fn from(result: ParseResult) -> Self {
        match result {
            Ok(value) => SafeParseReturn::Success(value),
            Err(err) => SafeParseReturn::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_field_message_is_required() {
        let kind = IssueKind::InvalidType {
            expected: ValueType::String,
            received: ValueType::Undefined,
        };
        assert_eq!(kind.default_message(), "Required");
    }

    #[test]
    fn test_invalid_type_message() {
        let kind = IssueKind::InvalidType {
            expected: ValueType::Object,
            received: ValueType::Null,
        };
        assert_eq!(kind.default_message(), "Expected object, received null");
    }

    #[test]
    fn test_discriminator_message_quotes_strings() {
        let kind = IssueKind::InvalidUnionDiscriminator {
            options: vec![Primitive::from("a"), Primitive::from("b"), Primitive::from(3)],
        };
        assert_eq!(
            kind.default_message(),
            "Invalid discriminator value. Expected 'a' | 'b' | 3"
        );
    }

    #[test]
    fn test_issue_serializes_with_code_tag() {
        let issue = Issue {
            kind: IssueKind::InvalidUnionDiscriminator {
                options: vec![Primitive::from("a"), Primitive::from("b")],
            },
            path: vec![PathSegment::from("type")],
            message: "Invalid discriminator value. Expected 'a' | 'b'".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "code": "invalid_union_discriminator",
                "options": ["a", "b"],
                "path": ["type"],
                "message": "Invalid discriminator value. Expected 'a' | 'b'",
            })
        );
    }

    #[test]
    fn test_safe_parse_return_json_shape() {
        let ok = SafeParseReturn::from(Ok(Value::from("x")));
        assert!(ok.is_success());
        assert_eq!(ok.to_json(), json!({"success": true, "data": "x"}));

        let failed = SafeParseReturn::from(Err(ValidationError {
            issues: vec![Issue {
                kind: IssueKind::Custom,
                path: vec![],
                message: "bad".to_string(),
            }],
        }));
        assert!(!failed.is_success());
        assert_eq!(ok.into_result(), Ok(Value::from("x")));
        assert_eq!(failed.clone().into_result().unwrap_err().issues.len(), 1);
        assert_eq!(
            failed.to_json(),
            json!({
                "success": false,
                "error": {"issues": [{"code": "custom", "path": [], "message": "bad"}]},
            })
        );
    }

    #[test]
    fn test_path_mixes_keys_and_indices() {
        let path = vec![PathSegment::from("items"), PathSegment::from(2)];
        assert_eq!(serde_json::to_value(path).unwrap(), json!(["items", 2]));
    }
}
