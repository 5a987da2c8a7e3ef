//! Discriminated unions: a set of object variants selected by the value of
//! one shared key.
//!
//! Construction runs in three steps:
//!
//! 1. **Compact** ([`compact_variants`]): nested unions keyed on the same field
//!    are flattened into the parent.
//! 2. **Build** the dispatch table: every variant's discriminator values are
//!    extracted ([`extract_discriminator_values`]) and mapped to the variant.
//!    Unions on a different key contribute the parent-key values of all their
//!    leaves.
//! 3. **Freeze**: the union is immutable from here on. Transformations
//!    ([`DiscriminatedUnion::pick`] and friends) build a new union.
//!
//! Validation is a single table lookup followed by exactly one delegate call.

mod compact;
mod dispatch;
mod extract;
mod transform;

use futures::future::{self, BoxFuture};
use futures::FutureExt;

pub use compact::compact_variants;
pub use dispatch::DispatchTable;
pub use extract::{extract_discriminator_values, Extraction};

use crate::config::CreateParams;
use crate::error::SchemaError;
use crate::issue::{IssueKind, ParseResult, PathSegment, SafeParseReturn};
use crate::parse::ParseContext;
use crate::schema::{ObjectSchema, Schema};
use crate::value::{Primitive, Value, ValueType};

/// One option of a discriminated union.
#[derive(Debug, Clone)]
pub enum Variant {
    Object(ObjectSchema),
    Union(Box<DiscriminatedUnion>),
}

impl Variant {
    /// Convert a general schema into a variant; only object schemas and
    /// discriminated unions qualify.
    pub fn from_schema(discriminator: &str, schema: Schema) -> Result<Self, SchemaError> {
        match schema {
            Schema::Object(object) => Ok(Variant::Object(object)),
            Schema::DiscriminatedUnion(union) => Ok(Variant::Union(union)),
            other => Err(SchemaError::InvalidVariant {
                discriminator: discriminator.to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Variant::Object(object) => Some(object),
            Variant::Union(_) => None,
        }
    }

    pub fn as_union(&self) -> Option<&DiscriminatedUnion> {
        match self {
            Variant::Object(_) => None,
            Variant::Union(union) => Some(union),
        }
    }

    fn parse_value(&self, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
        match self {
            Variant::Object(object) => object.parse_value(data, ctx),
            Variant::Union(union) => union.parse_value(data, ctx),
        }
    }

    fn parse_value_async<'a>(
        &'a self,
        data: &'a Value,
        ctx: &'a mut ParseContext,
    ) -> BoxFuture<'a, Option<Value>> {
        match self {
            Variant::Object(object) => object.parse_value_async(data, ctx),
            Variant::Union(union) => union.parse_value_async(data, ctx),
        }
    }
}

impl From<ObjectSchema> for Variant {
    fn from(object: ObjectSchema) -> Self {
        Variant::Object(object)
    }
}

impl From<DiscriminatedUnion> for Variant {
    fn from(union: DiscriminatedUnion) -> Self {
        Variant::Union(Box::new(union))
    }
}

impl From<Variant> for Schema {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Object(object) => Schema::Object(object),
            Variant::Union(union) => Schema::DiscriminatedUnion(union),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscriminatedUnion {
    discriminator: String,
    options: Vec<Variant>,
    options_map: DispatchTable,
    params: CreateParams,
}

impl DiscriminatedUnion {
    /// Build a union with default parameters.
    pub fn new(
        discriminator: impl Into<String>,
        variants: Vec<Variant>,
    ) -> Result<Self, SchemaError> {
        Self::with_params(discriminator, variants, CreateParams::default())
    }

    pub fn with_params(
        discriminator: impl Into<String>,
        variants: Vec<Variant>,
        params: CreateParams,
    ) -> Result<Self, SchemaError> {
        let discriminator = discriminator.into();
        if variants.is_empty() {
            return Err(SchemaError::NoVariants { discriminator });
        }
        let options = compact_variants(&discriminator, variants);
        let options_map = dispatch::build_dispatch_table(&discriminator, &options)?;
        Ok(Self {
            discriminator,
            options,
            options_map,
            params,
        })
    }

    /// A new union over `variants` sharing this union's key and parameters.
    pub(crate) fn rebuild(&self, variants: Vec<Variant>) -> Result<Self, SchemaError> {
        Self::with_params(self.discriminator.clone(), variants, self.params.clone())
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// The compacted variant list.
    pub fn options(&self) -> &[Variant] {
        &self.options
    }

    /// Every accepted discriminator value with the variant it selects, in
    /// insertion order.
    pub fn options_map(&self) -> impl Iterator<Item = (&Primitive, &Variant)> {
        self.options_map
            .iter()
            .map(|(value, index)| (value, &self.options[index]))
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.options_map
    }

    pub fn variant_for(&self, value: &Primitive) -> Option<&Variant> {
        self.options_map.get(value).map(|index| &self.options[index])
    }

    pub fn discriminator_values(&self) -> Vec<Primitive> {
        self.options_map.keys().cloned().collect()
    }

    pub fn description(&self) -> Option<&str> {
        self.params.description.as_deref()
    }

    pub fn params(&self) -> &CreateParams {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl DiscriminatedUnion {
    /// Validate `data`, returning the parsed value or every issue found.
    pub fn parse(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value(data, &mut ctx);
        ctx.finish(output)
    }

    pub fn safe_parse(&self, data: &Value) -> SafeParseReturn {
        self.parse(data).into()
    }

    /// Validate `data`, awaiting asynchronous effects in the selected variant.
    pub async fn parse_async(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value_async(data, &mut ctx).await;
        ctx.finish(output)
    }

    pub async fn safe_parse_async(&self, data: &Value) -> SafeParseReturn {
        self.parse_async(data).await.into()
    }

    pub(crate) fn parse_value(&self, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
        let variant = self.select(data, ctx)?;
        variant.parse_value(data, ctx)
    }

    pub(crate) fn parse_value_async<'a>(
        &'a self,
        data: &'a Value,
        ctx: &'a mut ParseContext,
    ) -> BoxFuture<'a, Option<Value>> {
        match self.select(data, ctx) {
            Some(variant) => variant.parse_value_async(data, ctx),
            None => future::ready(None).boxed(),
        }
    }

    /// Find the variant owning `data`'s discriminator value, recording an
    /// issue when there is none.
    fn select(&self, data: &Value, ctx: &mut ParseContext) -> Option<&Variant> {
        let Value::Object(fields) = data else {
            ctx.add_issue_with(
                IssueKind::InvalidType {
                    expected: ValueType::Object,
                    received: data.value_type(),
                },
                data,
                &self.params.errors,
            );
            return None;
        };

        let value = fields.get(&self.discriminator).unwrap_or(&Value::Undefined);
        let selected = Primitive::from_value(value).and_then(|key| self.variant_for(&key));
        if selected.is_none() {
            ctx.push(PathSegment::Key(self.discriminator.clone()));
            ctx.add_issue_with(
                IssueKind::InvalidUnionDiscriminator {
                    options: self.discriminator_values(),
                },
                data,
                &self.params.errors,
            );
            ctx.pop();
            return None;
        }
        tracing::trace!(discriminator = %self.discriminator, "dispatching to variant");
        selected
    }
}
