//! Structural transformations over every variant of a union.
//!
//! Each transformation maps the variant list (recursing into nested unions),
//! then re-compacts and rebuilds the dispatch table. Masks are adjusted per
//! level so that the discriminator field survives: `pick` always includes it,
//! `omit` and `partial` never touch it, and `deep_partial` requires the key of
//! the current level plus every ancestor.

use indexmap::IndexSet;

use super::{DiscriminatedUnion, Variant};
use crate::error::SchemaError;
use crate::schema::{Schema, UnknownKeys};

impl DiscriminatedUnion {
    pub fn strict(&self) -> Result<Self, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// [`strict`](Self::strict) with a custom `unrecognized_keys` message on
    /// every leaf variant.
    pub fn strict_with_message(&self, message: impl Into<String>) -> Result<Self, SchemaError> {
        let message = message.into();
        self.map_variants("strict", |variant| match variant {
            Variant::Object(object) => Ok(object.strict_with_message(message.clone()).into()),
            Variant::Union(union) => Ok(union.strict_with_message(message.clone())?.into()),
        })
    }

    pub fn strip(&self) -> Result<Self, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    pub fn passthrough(&self) -> Result<Self, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Apply one unknown-key policy to every variant.
    pub fn with_unknown_keys(&self, policy: UnknownKeys) -> Result<Self, SchemaError> {
        self.map_variants("unknown_keys", |variant| match variant {
            Variant::Object(object) => Ok(object.with_unknown_keys(policy).into()),
            Variant::Union(union) => Ok(union.with_unknown_keys(policy)?.into()),
        })
    }

    pub fn catchall(&self, schema: Schema) -> Result<Self, SchemaError> {
        self.map_variants("catchall", |variant| match variant {
            Variant::Object(object) => Ok(object.catchall(schema.clone()).into()),
            Variant::Union(union) => Ok(union.catchall(schema.clone())?.into()),
        })
    }

    /// Keep only the masked fields; the discriminator is always kept.
    pub fn pick<S: AsRef<str>>(&self, mask: &[S]) -> Result<Self, SchemaError> {
        let mask = with_key(mask, &self.discriminator);
        self.map_variants("pick", |variant| match variant {
            Variant::Object(object) => Ok(object.pick(&mask).into()),
            Variant::Union(union) => Ok(union.pick(&mask)?.into()),
        })
    }

    /// Drop the masked fields; the discriminator is never dropped.
    pub fn omit<S: AsRef<str>>(&self, mask: &[S]) -> Result<Self, SchemaError> {
        let mask = without_key(mask, &self.discriminator);
        self.map_variants("omit", |variant| match variant {
            Variant::Object(object) => Ok(object.omit(&mask).into()),
            Variant::Union(union) => Ok(union.omit(&mask)?.into()),
        })
    }

    /// Make every field of every variant optional, except the discriminator.
    pub fn partial(&self) -> Result<Self, SchemaError> {
        let keys: Vec<String> = self.all_keys().into_iter().collect();
        self.partial_fields(&keys)
    }

    pub fn partial_fields<S: AsRef<str>>(&self, mask: &[S]) -> Result<Self, SchemaError> {
        let mask = without_key(mask, &self.discriminator);
        self.map_variants("partial", |variant| match variant {
            Variant::Object(object) => Ok(object.partial_fields(&mask).into()),
            Variant::Union(union) => Ok(union.partial_fields(&mask)?.into()),
        })
    }

    pub fn required(&self) -> Result<Self, SchemaError> {
        self.map_variants("required", |variant| match variant {
            Variant::Object(object) => Ok(object.required().into()),
            Variant::Union(union) => Ok(union.required()?.into()),
        })
    }

    pub fn required_fields<S: AsRef<str>>(&self, mask: &[S]) -> Result<Self, SchemaError> {
        self.map_variants("required", |variant| match variant {
            Variant::Object(object) => Ok(object.required_fields(mask).into()),
            Variant::Union(union) => Ok(union.required_fields(mask)?.into()),
        })
    }

    /// Recursively make nested object structure optional. Discriminator
    /// fields of this union and of every nested union end up required.
    pub fn deep_partial(&self) -> Result<Self, SchemaError> {
        self.deep_partial_protecting(&[])
    }

    fn deep_partial_protecting(&self, ancestors: &[String]) -> Result<Self, SchemaError> {
        let protected = with_key(ancestors, &self.discriminator);
        self.map_variants("deep_partial", |variant| match variant {
            Variant::Object(object) => Ok(object.deep_partial_except(&protected).into()),
            Variant::Union(union) => Ok(union.deep_partial_protecting(&protected)?.into()),
        })
    }

    /// Every field key of every leaf variant, transitively, in discovery
    /// order.
    pub fn all_keys(&self) -> IndexSet<String> {
        let mut keys = IndexSet::new();
        for variant in &self.options {
            match variant {
                Variant::Object(object) => keys.extend(object.keys().map(str::to_string)),
                Variant::Union(union) => keys.extend(union.all_keys()),
            }
        }
        keys
    }

    fn map_variants<F>(&self, operation: &str, f: F) -> Result<Self, SchemaError>
    where
        F: Fn(&Variant) -> Result<Variant, SchemaError>,
    {
        let variants = self.options.iter().map(f).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            operation,
            discriminator = %self.discriminator,
            variants = variants.len(),
            "re-flattening transformed union"
        );
        self.rebuild(variants)
    }
}

fn with_key<S: AsRef<str>>(mask: &[S], key: &str) -> Vec<String> {
    let mut keys: Vec<String> = mask.iter().map(|k| k.as_ref().to_string()).collect();
    if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
    }
    keys
}

fn without_key<S: AsRef<str>>(mask: &[S], key: &str) -> Vec<String> {
    mask.iter()
        .map(|k| k.as_ref().to_string())
        .filter(|k| k != key)
        .collect()
}
