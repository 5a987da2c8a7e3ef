//! Property-based tests for union construction and dispatch.
//!
//! Generates sets of distinct lowercase tags, builds one leaf variant per tag
//! (each with its own payload field), and checks:
//!
//! - dispatch: a value carrying tag `t` is validated by the variant built for
//!   `t`, and an unknown tag yields exactly one `invalid_union_discriminator`
//!   issue listing every tag in insertion order;
//! - uniqueness: a repeated tag always fails construction;
//! - flattening: nesting same-key unions in either grouping yields the same
//!   flat option set, and wrapping a union in itself changes nothing.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;
use tagunion_core::{
    discriminated_union, DiscriminatedUnion, ErrorCode, ObjectSchema, Primitive, Schema, Value,
    Variant,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// 1..8 distinct lowercase tags, in a stable order.
fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z]{1,6}", 1..8).prop_map(|set| set.into_iter().collect())
}

/// A tag that can never collide with `arb_tags` output.
fn arb_unknown_tag() -> impl Strategy<Value = String> {
    "[A-Z]{1,6}"
}

fn leaf(tag: &str) -> Variant {
    ObjectSchema::new([
        ("kind".to_string(), Schema::literal(tag)),
        (format!("{tag}_payload"), Schema::Number),
    ])
    .into()
}

fn build(tags: &[String]) -> DiscriminatedUnion {
    discriminated_union("kind", tags.iter().map(|t| leaf(t)).collect(), None).unwrap()
}

fn sample(tag: &str) -> Value {
    Value::object([
        ("kind".to_string(), Value::from(tag)),
        (format!("{tag}_payload"), Value::from(1)),
    ])
}

fn value_set(union: &DiscriminatedUnion) -> BTreeSet<String> {
    union
        .discriminator_values()
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..Default::default() })]

    #[test]
    fn prop_every_tag_dispatches_to_its_variant(tags in arb_tags()) {
        let union = build(&tags);
        for tag in &tags {
            let data = sample(tag);
            prop_assert_eq!(union.parse(&data), Ok(data.clone()));
        }
    }

    #[test]
    fn prop_wrong_payload_is_reported_by_the_selected_variant(tags in arb_tags()) {
        let union = build(&tags);
        let tag = &tags[0];
        let data = Value::from(json!({ "kind": tag }));
        let err = union.parse(&data).unwrap_err();
        prop_assert_eq!(err.issues.len(), 1);
        prop_assert_eq!(err.issues[0].code(), "invalid_type");
    }

    #[test]
    fn prop_unknown_tag_lists_all_options(tags in arb_tags(), unknown in arb_unknown_tag()) {
        let union = build(&tags);
        let err = union.parse(&Value::from(json!({ "kind": unknown }))).unwrap_err();
        prop_assert_eq!(err.issues.len(), 1);
        let issue = serde_json::to_value(&err.issues[0]).unwrap();
        prop_assert_eq!(&issue["code"], &json!("invalid_union_discriminator"));
        prop_assert_eq!(&issue["path"], &json!(["kind"]));
        prop_assert_eq!(&issue["options"], &json!(tags));
    }

    #[test]
    fn prop_repeated_tag_fails(tags in arb_tags(), pick in any::<prop::sample::Index>()) {
        let repeated = tags[pick.index(tags.len())].clone();
        let mut variants: Vec<Variant> = tags.iter().map(|t| leaf(t)).collect();
        variants.push(leaf(&repeated));
        let err = discriminated_union("kind", variants, None).unwrap_err();
        prop_assert_eq!(err.error_code(), ErrorCode::DuplicateDiscriminatorValue);
    }

    #[test]
    fn prop_flattening_is_associative(
        a in arb_tags(),
        b in arb_tags(),
        c in arb_tags(),
    ) {
        // Keep the three groups disjoint by prefixing.
        let tag = |p: &str, t: &String| format!("{p}{t}");
        let a: Vec<String> = a.iter().map(|t| tag("a", t)).collect();
        let b: Vec<String> = b.iter().map(|t| tag("b", t)).collect();
        let c: Vec<String> = c.iter().map(|t| tag("c", t)).collect();

        let left = discriminated_union(
            "kind",
            vec![
                discriminated_union(
                    "kind",
                    vec![build(&a).into(), build(&b).into()],
                    None,
                )
                .unwrap()
                .into(),
                build(&c).into(),
            ],
            None,
        )
        .unwrap();
        let right = discriminated_union(
            "kind",
            vec![
                build(&a).into(),
                discriminated_union(
                    "kind",
                    vec![build(&b).into(), build(&c).into()],
                    None,
                )
                .unwrap()
                .into(),
            ],
            None,
        )
        .unwrap();

        let total = a.len() + b.len() + c.len();
        prop_assert_eq!(left.options().len(), total);
        prop_assert_eq!(right.options().len(), total);
        prop_assert!(left.options().iter().all(|o| o.as_object().is_some()));
        prop_assert_eq!(value_set(&left), value_set(&right));
    }

    #[test]
    fn prop_flattening_is_idempotent(tags in arb_tags()) {
        let flat = build(&tags);
        let wrapped = discriminated_union("kind", vec![build(&tags).into()], None).unwrap();
        prop_assert_eq!(wrapped.options().len(), flat.options().len());
        prop_assert_eq!(wrapped.discriminator_values(), flat.discriminator_values());
    }

    #[test]
    fn prop_every_table_key_maps_to_an_option(tags in arb_tags()) {
        let union = build(&tags);
        for tag in &tags {
            let variant = union.variant_for(&Primitive::from(tag.as_str()));
            prop_assert!(variant.is_some());
        }
        prop_assert_eq!(union.dispatch_table().len(), tags.len());
    }
}
