//! Leaf schemas: the value shapes a discriminated union is built from.
//!
//! [`Schema`] is a closed sum type. Every consumer (the parser, the
//! discriminator extractor, the deep-partial rewrite) matches on it
//! exhaustively, so adding a node kind is a compile error until each site
//! decides how to treat it.

mod effects;
mod object;

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use indexmap::IndexMap;

pub use effects::{Effect, Effects};
pub use object::{ObjectSchema, UnknownKeys};

use crate::issue::{IssueKind, ParseResult, PathSegment};
use crate::parse::ParseContext;
use crate::union::DiscriminatedUnion;
use crate::value::{Primitive, Value, ValueType};

#[derive(Debug, Clone)]
pub enum Schema {
    Any,
    String,
    Number,
    Boolean,
    BigInt,
    /// Accepts exactly `null`.
    Null,
    /// Accepts exactly `undefined` (an absent key).
    Undefined,
    Literal(Primitive),
    /// A fixed set of string choices.
    Enum(Vec<String>),
    NativeEnum(NativeEnum),
    Array(Box<Schema>),
    Object(ObjectSchema),
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    /// Substitutes `value` for `undefined` input before parsing `inner`.
    Default {
        inner: Box<Schema>,
        value: Value,
    },
    Lazy(LazySchema),
    Effects(Effects),
    DiscriminatedUnion(Box<DiscriminatedUnion>),
}

/// A named set of runtime values, like a host-language enum.
///
/// Parsing and discriminator extraction both use the member *values*; the
/// member names are descriptive only.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEnum {
    members: IndexMap<String, Primitive>,
}

impl NativeEnum {
    pub fn new<I, K, V>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Primitive>,
    {
        Self {
            members: members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn members(&self) -> &IndexMap<String, Primitive> {
        &self.members
    }

    /// Distinct member values, in declaration order.
    pub fn values(&self) -> Vec<Primitive> {
        let mut values: Vec<Primitive> = Vec::with_capacity(self.members.len());
        for value in self.members.values() {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }
}

/// A deferred schema, produced on demand (e.g. for recursive definitions).
#[derive(Clone)]
pub struct LazySchema(Arc<dyn Fn() -> Schema + Send + Sync>);

impl LazySchema {
    pub fn schema(&self) -> Schema {
        (self.0)()
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazySchema(..)")
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Schema {
    pub fn literal(value: impl Into<Primitive>) -> Schema {
        Schema::Literal(value.into())
    }

    pub fn enumeration<I, S>(values: I) -> Schema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn native_enum(native: NativeEnum) -> Schema {
        Schema::NativeEnum(native)
    }

    pub fn array(items: Schema) -> Schema {
        Schema::Array(Box::new(items))
    }

    pub fn object<I, K>(fields: I) -> Schema
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object(ObjectSchema::new(fields))
    }

    pub fn lazy<F>(f: F) -> Schema
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Schema::Lazy(LazySchema(Arc::new(f)))
    }

    /// Wrap in `Optional`. Already-optional schemas are returned unchanged.
    pub fn optional(self) -> Schema {
        match self {
            Schema::Optional(_) => self,
            other => Schema::Optional(Box::new(other)),
        }
    }

    pub fn nullable(self) -> Schema {
        Schema::Nullable(Box::new(self))
    }

    pub fn default_value(self, value: impl Into<Value>) -> Schema {
        Schema::Default {
            inner: Box::new(self),
            value: value.into(),
        }
    }

    /// Strip every `Optional` layer.
    pub fn unwrap_optional(&self) -> &Schema {
        let mut current = self;
        while let Schema::Optional(inner) = current {
            current = inner;
        }
        current
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Schema::Optional(_))
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Any => "any",
            Schema::String => "string",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::BigInt => "bigint",
            Schema::Null => "null",
            Schema::Undefined => "undefined",
            Schema::Literal(_) => "literal",
            Schema::Enum(_) => "enum",
            Schema::NativeEnum(_) => "native_enum",
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
            Schema::Optional(_) => "optional",
            Schema::Nullable(_) => "nullable",
            Schema::Default { .. } => "default",
            Schema::Lazy(_) => "lazy",
            Schema::Effects(_) => "effects",
            Schema::DiscriminatedUnion(_) => "discriminated_union",
        }
    }

    /// Recursively make nested object structure optional.
    ///
    /// Objects have every field made optional (and deep-partialed); arrays,
    /// optionals and nullables are rewritten through to their inner schema.
    /// Everything else is returned unchanged.
    pub fn deep_partial(&self) -> Schema {
        match self {
            Schema::Object(object) => Schema::Object(object.deep_partial()),
            Schema::Array(items) => Schema::Array(Box::new(items.deep_partial())),
            Schema::Optional(inner) => Schema::Optional(Box::new(inner.deep_partial())),
            Schema::Nullable(inner) => Schema::Nullable(Box::new(inner.deep_partial())),
            Schema::Any
            | Schema::String
            | Schema::Number
            | Schema::Boolean
            | Schema::BigInt
            | Schema::Null
            | Schema::Undefined
            | Schema::Literal(_)
            | Schema::Enum(_)
            | Schema::NativeEnum(_)
            | Schema::Default { .. }
            | Schema::Lazy(_)
            | Schema::Effects(_)
            | Schema::DiscriminatedUnion(_) => self.clone(),
        }
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

impl From<DiscriminatedUnion> for Schema {
    fn from(union: DiscriminatedUnion) -> Self {
        Schema::DiscriminatedUnion(Box::new(union))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Schema {
    /// Parse `data` synchronously.
    pub fn parse(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value(data, &mut ctx);
        ctx.finish(output)
    }

    /// Parse `data`, awaiting any asynchronous effects.
    pub async fn parse_async(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value_async(data, &mut ctx).await;
        ctx.finish(output)
    }

    pub(crate) fn parse_value(&self, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
        match self {
            Schema::Any => Some(data.clone()),
            Schema::String => expect_type(data, ValueType::String, ctx),
            Schema::Number => expect_type(data, ValueType::Number, ctx),
            Schema::Boolean => expect_type(data, ValueType::Boolean, ctx),
            Schema::BigInt => expect_type(data, ValueType::Bigint, ctx),
            Schema::Null => expect_type(data, ValueType::Null, ctx),
            Schema::Undefined => expect_type(data, ValueType::Undefined, ctx),
            Schema::Literal(expected) => parse_literal(expected, data, ctx),
            Schema::Enum(choices) => parse_enum(choices, data, ctx),
            Schema::NativeEnum(native) => parse_native_enum(native, data, ctx),
            Schema::Array(items) => {
                let Value::Array(values) = data else {
                    return type_mismatch(data, ValueType::Array, ctx);
                };
                let mut output = Vec::with_capacity(values.len());
                let mut valid = true;
                for (index, value) in values.iter().enumerate() {
                    ctx.push(PathSegment::Index(index));
                    match items.parse_value(value, ctx) {
                        Some(parsed) => output.push(parsed),
                        None => valid = false,
                    }
                    ctx.pop();
                }
                valid.then_some(Value::Array(output))
            }
            Schema::Object(object) => object.parse_value(data, ctx),
            Schema::Optional(inner) => match data {
                Value::Undefined => Some(Value::Undefined),
                _ => inner.parse_value(data, ctx),
            },
            Schema::Nullable(inner) => match data {
                Value::Null => Some(Value::Null),
                _ => inner.parse_value(data, ctx),
            },
            Schema::Default { inner, value } => match data {
                Value::Undefined => inner.parse_value(value, ctx),
                _ => inner.parse_value(data, ctx),
            },
            Schema::Lazy(lazy) => lazy.schema().parse_value(data, ctx),
            Schema::Effects(effects) => effects.parse_value(data, ctx),
            Schema::DiscriminatedUnion(union) => union.parse_value(data, ctx),
        }
    }

    /// Async counterpart of [`Schema::parse_value`]. Nodes that never suspend
    /// reuse the synchronous path.
    pub(crate) fn parse_value_async<'a>(
        &'a self,
        data: &'a Value,
        ctx: &'a mut ParseContext,
    ) -> BoxFuture<'a, Option<Value>> {
        match self {
            Schema::Array(items) => async move {
                let Value::Array(values) = data else {
                    return type_mismatch(data, ValueType::Array, ctx);
                };
                let mut output = Vec::with_capacity(values.len());
                let mut valid = true;
                for (index, value) in values.iter().enumerate() {
                    ctx.push(PathSegment::Index(index));
                    match items.parse_value_async(value, ctx).await {
                        Some(parsed) => output.push(parsed),
                        None => valid = false,
                    }
                    ctx.pop();
                }
                valid.then_some(Value::Array(output))
            }
            .boxed(),
            Schema::Object(object) => object.parse_value_async(data, ctx),
            Schema::Optional(inner) => match data {
                Value::Undefined => future::ready(Some(Value::Undefined)).boxed(),
                _ => inner.parse_value_async(data, ctx),
            },
            Schema::Nullable(inner) => match data {
                Value::Null => future::ready(Some(Value::Null)).boxed(),
                _ => inner.parse_value_async(data, ctx),
            },
            Schema::Default { inner, value } => match data {
                Value::Undefined => inner.parse_value_async(value, ctx),
                _ => inner.parse_value_async(data, ctx),
            },
            Schema::Lazy(lazy) => async move {
                let schema = lazy.schema();
                schema.parse_value_async(data, ctx).await
            }
            .boxed(),
            Schema::Effects(effects) => effects.parse_value_async(data, ctx),
            Schema::DiscriminatedUnion(union) => union.parse_value_async(data, ctx),
            Schema::Any
            | Schema::String
            | Schema::Number
            | Schema::Boolean
            | Schema::BigInt
            | Schema::Null
            | Schema::Undefined
            | Schema::Literal(_)
            | Schema::Enum(_)
            | Schema::NativeEnum(_) => future::ready(self.parse_value(data, ctx)).boxed(),
        }
    }
}

pub(crate) fn type_mismatch(
    data: &Value,
    expected: ValueType,
    ctx: &mut ParseContext,
) -> Option<Value> {
    ctx.add_issue(
        IssueKind::InvalidType {
            expected,
            received: data.value_type(),
        },
        data,
    );
    None
}

fn expect_type(data: &Value, expected: ValueType, ctx: &mut ParseContext) -> Option<Value> {
    if data.value_type() == expected {
        Some(data.clone())
    } else {
        type_mismatch(data, expected, ctx)
    }
}

fn parse_literal(expected: &Primitive, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
    if Primitive::from_value(data).as_ref() == Some(expected) {
        return Some(data.clone());
    }
    ctx.add_issue(
        IssueKind::InvalidLiteral {
            expected: expected.clone(),
            received: data.clone(),
        },
        data,
    );
    None
}

fn parse_enum(choices: &[String], data: &Value, ctx: &mut ParseContext) -> Option<Value> {
    if let Value::String(s) = data {
        if choices.contains(s) {
            return Some(data.clone());
        }
    }
    ctx.add_issue(
        IssueKind::InvalidEnumValue {
            options: choices.iter().map(|c| Primitive::from(c.as_str())).collect(),
            received: data.clone(),
        },
        data,
    );
    None
}

fn parse_native_enum(native: &NativeEnum, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
    let values = native.values();
    if Primitive::from_value(data).is_some_and(|p| values.contains(&p)) {
        return Some(data.clone());
    }
    ctx.add_issue(
        IssueKind::InvalidEnumValue {
            options: values,
            received: data.clone(),
        },
        data,
    );
    None
}
