//! Dispatch table construction: discriminator value → owning variant.

use indexmap::{IndexMap, IndexSet};

use super::extract::extract_discriminator_values;
use super::{DiscriminatedUnion, Variant};
use crate::error::SchemaError;
use crate::schema::ObjectSchema;
use crate::value::Primitive;

/// Insertion-ordered map from discriminator value to an index into the
/// union's variant list.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: IndexMap<Primitive, usize>,
}

impl DispatchTable {
    pub fn get(&self, value: &Primitive) -> Option<usize> {
        self.entries.get(value).copied()
    }

    /// Every accepted value, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Primitive> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Primitive, usize)> {
        self.entries.iter().map(|(value, index)| (value, *index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_unique(
        &mut self,
        discriminator: &str,
        value: Primitive,
        index: usize,
    ) -> Result<(), SchemaError> {
        if self.entries.contains_key(&value) {
            return Err(SchemaError::DuplicateDiscriminatorValue {
                discriminator: discriminator.to_string(),
                value,
            });
        }
        self.entries.insert(value, index);
        Ok(())
    }
}

/// Build the dispatch table for an already-compacted variant list.
pub(crate) fn build_dispatch_table(
    discriminator: &str,
    variants: &[Variant],
) -> Result<DispatchTable, SchemaError> {
    let mut table = DispatchTable::default();
    for (index, variant) in variants.iter().enumerate() {
        let values = match variant {
            Variant::Object(object) => leaf_values(discriminator, object)?,
            Variant::Union(union) => nested_values(discriminator, union)?,
        };
        for value in values {
            table.insert_unique(discriminator, value, index)?;
        }
    }
    tracing::debug!(
        discriminator,
        variants = variants.len(),
        values = table.len(),
        "built dispatch table"
    );
    Ok(table)
}

/// Values of `discriminator` on a leaf variant; a missing field or an
/// unrecognized field shape is an error.
fn leaf_values(
    discriminator: &str,
    object: &ObjectSchema,
) -> Result<IndexSet<Primitive>, SchemaError> {
    let values = object
        .field(discriminator)
        .map(extract_discriminator_values)
        .map(|extraction| extraction.into_values())
        .unwrap_or_default();
    if values.is_empty() {
        return Err(SchemaError::MissingDiscriminator {
            discriminator: discriminator.to_string(),
        });
    }
    Ok(values)
}

/// Values of the parent's `discriminator` across every leaf of a nested union
/// keyed on a different field. Every descendant leaf must expose the parent's
/// key; the first one that does not aborts the build. Repeated values inside
/// the nested union collapse into one.
fn nested_values(
    discriminator: &str,
    union: &DiscriminatedUnion,
) -> Result<IndexSet<Primitive>, SchemaError> {
    let mut values = IndexSet::new();
    for variant in union.options() {
        match variant {
            Variant::Object(object) => values.extend(leaf_values(discriminator, object)?),
            Variant::Union(child) => {
                let child_values = nested_values(discriminator, child)?;
                if child_values.is_empty() {
                    return Err(SchemaError::MissingNestedDiscriminator {
                        discriminator: discriminator.to_string(),
                        nested: child.discriminator().to_string(),
                    });
                }
                values.extend(child_values);
            }
        }
    }
    if values.is_empty() {
        return Err(SchemaError::MissingNestedDiscriminator {
            discriminator: discriminator.to_string(),
            nested: union.discriminator().to_string(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn leaf(fields: &[(&str, &str)]) -> Variant {
        Variant::Object(ObjectSchema::new(
            fields.iter().map(|(k, v)| (*k, Schema::literal(*v))),
        ))
    }

    #[test]
    fn test_table_maps_values_to_indices() {
        let variants = vec![leaf(&[("type", "a")]), leaf(&[("type", "b")])];
        let table = build_dispatch_table("type", &variants).unwrap();
        assert_eq!(table.get(&Primitive::from("a")), Some(0));
        assert_eq!(table.get(&Primitive::from("b")), Some(1));
        assert_eq!(table.get(&Primitive::from("c")), None);
    }

    #[test]
    fn test_duplicate_value_fails() {
        let variants = vec![leaf(&[("type", "a")]), leaf(&[("type", "a")])];
        let err = build_dispatch_table("type", &variants).unwrap_err();
        let SchemaError::DuplicateDiscriminatorValue { ref value, .. } = err else {
            panic!("expected a duplicate value error, got {err:?}");
        };
        assert_eq!(*value, Primitive::from("a"));
    }

    #[test]
    fn test_missing_field_fails() {
        let variants = vec![leaf(&[("type", "a")]), leaf(&[("kind", "b")])];
        let err = build_dispatch_table("type", &variants).unwrap_err();
        assert!(matches!(err, SchemaError::MissingDiscriminator { .. }));
    }

    #[test]
    fn test_nested_union_values_are_deduplicated() {
        let nested = DiscriminatedUnion::new(
            "sub",
            vec![
                leaf(&[("type", "c"), ("sub", "a")]),
                leaf(&[("type", "c"), ("sub", "b")]),
            ],
        )
        .unwrap();
        let variants = vec![leaf(&[("type", "a")]), Variant::from(nested)];
        let table = build_dispatch_table("type", &variants).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&Primitive::from("c")), Some(1));
    }

    #[test]
    fn test_nested_leaf_without_parent_key_fails() {
        let nested = DiscriminatedUnion::new(
            "foo",
            vec![leaf(&[("foo", "c")]), leaf(&[("foo", "d")])],
        )
        .unwrap();
        let variants = vec![leaf(&[("type", "a")]), Variant::from(nested)];
        let err = build_dispatch_table("type", &variants).unwrap_err();
        assert!(err
            .to_string()
            .contains("value for key `type` could not be extracted"));
    }
}
