//! Declarative schema definitions.
//!
//! [`SchemaDef`] is the JSON form of a [`Schema`] tree, tagged by `"kind"`.
//! It covers every node that carries no closure (lazy schemas and effects
//! are code-only):
//!
//! ```json
//! {
//!   "kind": "discriminated_union",
//!   "discriminator": "type",
//!   "messages": { "invalid-union-discriminator": "unknown shape" },
//!   "options": [
//!     { "kind": "object", "shape": { "type": { "kind": "literal", "value": "a" } } },
//!     { "kind": "object", "shape": { "type": { "kind": "literal", "value": "b" } } }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{CreateParams, ErrorStrategy, MessageOverrides};
use crate::error::SchemaError;
use crate::schema::{NativeEnum, ObjectSchema, Schema, UnknownKeys};
use crate::union::{DiscriminatedUnion, Variant};
use crate::value::{Primitive, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaDef {
    Any,
    String,
    Number,
    Boolean,
    Bigint,
    Null,
    Undefined,
    Literal {
        value: serde_json::Value,
    },
    Enum {
        values: Vec<String>,
    },
    NativeEnum {
        members: IndexMap<String, serde_json::Value>,
    },
    Array {
        items: Box<SchemaDef>,
    },
    Object {
        shape: IndexMap<String, SchemaDef>,
        #[serde(default)]
        unknown_keys: UnknownKeys,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        catchall: Option<Box<SchemaDef>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unrecognized_keys_message: Option<String>,
    },
    Optional {
        inner: Box<SchemaDef>,
    },
    Nullable {
        inner: Box<SchemaDef>,
    },
    Default {
        inner: Box<SchemaDef>,
        value: serde_json::Value,
    },
    DiscriminatedUnion {
        discriminator: String,
        options: Vec<SchemaDef>,
        #[serde(default, skip_serializing_if = "MessageOverrides::is_empty")]
        messages: MessageOverrides,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl SchemaDef {
    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Build the runtime schema. Discriminated unions are constructed (and
    /// checked) bottom-up, so the first construction error anywhere in the
    /// tree is returned.
    pub fn build(&self) -> Result<Schema, SchemaError> {
        let schema = match self {
            SchemaDef::Any => Schema::Any,
            SchemaDef::String => Schema::String,
            SchemaDef::Number => Schema::Number,
            SchemaDef::Boolean => Schema::Boolean,
            SchemaDef::Bigint => Schema::BigInt,
            SchemaDef::Null => Schema::Null,
            SchemaDef::Undefined => Schema::Undefined,
            SchemaDef::Literal { value } => Schema::Literal(scalar(value, "literal value")?),
            SchemaDef::Enum { values } => Schema::Enum(values.clone()),
            SchemaDef::NativeEnum { members } => {
                let members = members
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), scalar(value, "native enum member")?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                Schema::NativeEnum(NativeEnum::new(members))
            }
            SchemaDef::Array { items } => Schema::array(items.build()?),
            SchemaDef::Object {
                shape,
                unknown_keys,
                catchall,
                unrecognized_keys_message,
            } => {
                let fields = shape
                    .iter()
                    .map(|(key, def)| Ok((key.clone(), def.build()?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                let mut object = ObjectSchema::new(fields).with_unknown_keys(*unknown_keys);
                if let Some(message) = unrecognized_keys_message {
                    object = object.strict_with_message(message.clone());
                }
                if let Some(catchall) = catchall {
                    object = object.catchall(catchall.build()?);
                }
                Schema::Object(object)
            }
            SchemaDef::Optional { inner } => inner.build()?.optional(),
            SchemaDef::Nullable { inner } => inner.build()?.nullable(),
            SchemaDef::Default { inner, value } => {
                inner.build()?.default_value(Value::from(value.clone()))
            }
            SchemaDef::DiscriminatedUnion {
                discriminator,
                options,
                messages,
                description,
            } => {
                let variants = options
                    .iter()
                    .map(|def| Variant::from_schema(discriminator, def.build()?))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                let errors = if messages.is_empty() {
                    ErrorStrategy::Default
                } else {
                    ErrorStrategy::Messages(messages.clone())
                };
                let params = CreateParams {
                    errors,
                    description: description.clone(),
                };
                Schema::from(DiscriminatedUnion::with_params(
                    discriminator.as_str(),
                    variants,
                    params,
                )?)
            }
        };
        Ok(schema)
    }
}

fn scalar(value: &serde_json::Value, what: &str) -> Result<Primitive, SchemaError> {
    Primitive::from_json(value).ok_or_else(|| SchemaError::InvalidDefinition {
        message: format!("{what} must be a JSON scalar, got {value}"),
    })
}
