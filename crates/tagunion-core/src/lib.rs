//! # tagunion-core
//!
//! Discriminated-union schemas: validate a value against one of several
//! object shapes, chosen in constant time by the value of a shared key.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tagunion_core::{discriminated_union, ObjectSchema, Schema, Value};
//!
//! let shapes = discriminated_union(
//!     "kind",
//!     vec![
//!         ObjectSchema::new([("kind", Schema::literal("circle")), ("radius", Schema::Number)]).into(),
//!         ObjectSchema::new([("kind", Schema::literal("square")), ("side", Schema::Number)]).into(),
//!     ],
//!     None,
//! )
//! .unwrap();
//!
//! let parsed = shapes.parse(&Value::from(json!({"kind": "circle", "radius": 2.0})));
//! assert!(parsed.is_ok());
//!
//! let err = shapes.parse(&Value::from(json!({"kind": "hexagon"}))).unwrap_err();
//! assert_eq!(err.issues[0].message, "Invalid discriminator value. Expected 'circle' | 'square'");
//! ```
//!
//! ## Construction
//!
//! Nested unions keyed on the same field are flattened into their parent;
//! nested unions on a different key stay nested and contribute the parent-key
//! values of all their leaves. Construction fails with a [`SchemaError`] when
//! a variant has no extractable discriminator value, when two variants claim
//! the same value, or when the creation parameters conflict.

pub mod config;
pub mod definition;
pub mod error;
pub mod issue;
pub(crate) mod parse;
pub mod schema;
pub mod union;
pub mod value;

pub use config::{CreateParams, ErrorStrategy, MessageOverrides, RawCreateParams};
pub use definition::SchemaDef;
pub use error::{ErrorCode, SchemaError};
pub use issue::{
    ErrorMap, ErrorMapContext, Issue, IssueKind, ParseResult, PathSegment, SafeParseReturn,
    ValidationError,
};
pub use schema::{Effect, Effects, NativeEnum, ObjectSchema, Schema, UnknownKeys};
pub use union::{
    compact_variants, extract_discriminator_values, DiscriminatedUnion, DispatchTable,
    Extraction, Variant,
};
pub use value::{Primitive, Value, ValueType};

/// Build a discriminated union over `variants`, keyed on `discriminator`.
///
/// `params` are validated first: combining a custom `error_map` with either
/// message override is an [`SchemaError::InvalidConfig`].
pub fn discriminated_union(
    discriminator: &str,
    variants: Vec<Variant>,
    params: Option<RawCreateParams>,
) -> Result<DiscriminatedUnion, SchemaError> {
    let params = CreateParams::try_from(params.unwrap_or_default())?;
    let union = DiscriminatedUnion::with_params(discriminator, variants, params)?;
    tracing::debug!(
        discriminator,
        options = union.options().len(),
        values = union.dispatch_table().len(),
        "created discriminated union"
    );
    Ok(union)
}
