//! Discriminator-value extraction.
//!
//! Given the schema of a variant's discriminator field, compute the finite set
//! of values that select that variant. Only a fixed set of value-shape forms is
//! recognized; anything else is [`Extraction::Unsupported`].

use indexmap::IndexSet;

use crate::schema::Schema;
use crate::value::Primitive;

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The values that select the variant, in discovery order.
    Values(IndexSet<Primitive>),
    /// The schema's shape carries no extractable discriminator.
    Unsupported,
}

impl Extraction {
    fn single(value: Primitive) -> Self {
        Extraction::Values(IndexSet::from([value]))
    }

    /// `{value} ∪ inner`. An unsupported inner still yields `{value}`.
    fn with(value: Primitive, inner: Extraction) -> Self {
        let mut values = IndexSet::from([value]);
        values.extend(inner.into_values());
        Extraction::Values(values)
    }

    /// The extracted values; empty when unsupported.
    pub fn into_values(self) -> IndexSet<Primitive> {
        match self {
            Extraction::Values(values) => values,
            Extraction::Unsupported => IndexSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Extraction::Values(values) => values.is_empty(),
            Extraction::Unsupported => true,
        }
    }
}

/// Compute the discriminator values a field schema accepts.
pub fn extract_discriminator_values(schema: &Schema) -> Extraction {
    match schema {
        Schema::Lazy(lazy) => extract_discriminator_values(&lazy.schema()),
        Schema::Effects(effects) => extract_discriminator_values(effects.inner()),
        Schema::Literal(value) => Extraction::single(value.clone()),
        Schema::Enum(choices) => Extraction::Values(
            choices
                .iter()
                .map(|c| Primitive::from(c.as_str()))
                .collect(),
        ),
        Schema::NativeEnum(native) => Extraction::Values(native.values().into_iter().collect()),
        Schema::Default { inner, .. } => extract_discriminator_values(inner),
        Schema::Optional(inner) => {
            Extraction::with(Primitive::Undefined, extract_discriminator_values(inner))
        }
        Schema::Nullable(inner) => {
            Extraction::with(Primitive::Null, extract_discriminator_values(inner))
        }
        Schema::Undefined => Extraction::single(Primitive::Undefined),
        Schema::Null => Extraction::single(Primitive::Null),
        // A union in field position has no single inner type to read from.
        Schema::DiscriminatedUnion(_) => Extraction::Unsupported,
        Schema::Any
        | Schema::String
        | Schema::Number
        | Schema::Boolean
        | Schema::BigInt
        | Schema::Array(_)
        | Schema::Object(_) => Extraction::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NativeEnum;
    use crate::value::Value;

    fn values(schema: &Schema) -> Vec<Primitive> {
        extract_discriminator_values(schema)
            .into_values()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_literal() {
        assert_eq!(values(&Schema::literal("a")), vec![Primitive::from("a")]);
    }

    #[test]
    fn test_enum_yields_all_choices() {
        assert_eq!(
            values(&Schema::enumeration(["a", "b", "c"])),
            vec![Primitive::from("a"), Primitive::from("b"), Primitive::from("c")]
        );
    }

    #[test]
    fn test_native_enum_uses_values() {
        let fruits = NativeEnum::new([("Apple", 0), ("Banana", 1)]);
        assert_eq!(
            values(&Schema::native_enum(fruits)),
            vec![Primitive::from(0), Primitive::from(1)]
        );
    }

    #[test]
    fn test_optional_adds_undefined_first() {
        assert_eq!(
            values(&Schema::literal("1").optional()),
            vec![Primitive::Undefined, Primitive::from("1")]
        );
    }

    #[test]
    fn test_optional_of_unsupported_still_yields_undefined() {
        assert_eq!(values(&Schema::String.optional()), vec![Primitive::Undefined]);
    }

    #[test]
    fn test_nullable_adds_null() {
        assert_eq!(
            values(&Schema::literal("x").nullable()),
            vec![Primitive::Null, Primitive::from("x")]
        );
    }

    #[test]
    fn test_wrappers_are_unwrapped() {
        let lazy = Schema::lazy(|| Schema::literal("a"));
        assert_eq!(values(&lazy), vec![Primitive::from("a")]);

        let defaulted = Schema::literal("foo").default_value("foo");
        assert_eq!(values(&defaulted), vec![Primitive::from("foo")]);

        let preprocessed = Schema::literal("bar").preprocess(|v: &Value| v.clone());
        assert_eq!(values(&preprocessed), vec![Primitive::from("bar")]);
    }

    #[test]
    fn test_null_and_undefined() {
        assert_eq!(values(&Schema::Null), vec![Primitive::Null]);
        assert_eq!(values(&Schema::Undefined), vec![Primitive::Undefined]);
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(
            extract_discriminator_values(&Schema::String),
            Extraction::Unsupported
        );
        assert!(extract_discriminator_values(&Schema::object([("a", Schema::String)])).is_empty());
    }
}
