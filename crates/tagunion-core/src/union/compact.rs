//! Union compaction: flatten nested unions that share the parent's key.

use super::Variant;

/// Flatten every variant that is a union keyed on `discriminator` into its own
/// options.
///
/// Output order: the options of each same-key union (union order, then
/// in-list order), followed by all other variants in their original order.
/// This is a single pass: nested unions are compacted when they are built, so
/// a same-key child is already flat.
pub fn compact_variants(discriminator: &str, variants: Vec<Variant>) -> Vec<Variant> {
    let (homologues, others): (Vec<Variant>, Vec<Variant>) = variants
        .into_iter()
        .partition(|variant| is_homologue(discriminator, variant));

    homologues
        .into_iter()
        .flat_map(|variant| match variant {
            Variant::Union(union) => union.options,
            other => vec![other],
        })
        .chain(others)
        .collect()
}

fn is_homologue(discriminator: &str, variant: &Variant) -> bool {
    matches!(variant, Variant::Union(union) if union.discriminator == discriminator)
}
