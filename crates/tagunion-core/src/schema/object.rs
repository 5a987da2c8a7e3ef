//! Object-shaped schemas and their value-preserving field-set transforms.

use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{type_mismatch, Schema};
use crate::issue::{IssueKind, ParseResult, PathSegment};
use crate::parse::ParseContext;
use crate::value::{Value, ValueType};

/// Policy for input keys that are not part of the shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Reject with an `unrecognized_keys` issue.
    Strict,
    /// Drop silently.
    #[default]
    Strip,
    /// Copy through unvalidated.
    Passthrough,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    shape: IndexMap<String, Schema>,
    unknown_keys: UnknownKeys,
    catchall: Option<Box<Schema>>,
    unrecognized_keys_message: Option<String>,
}

impl ObjectSchema {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self {
            shape: fields.into_iter().map(|(k, s)| (k.into(), s)).collect(),
            unknown_keys: UnknownKeys::default(),
            catchall: None,
            unrecognized_keys_message: None,
        }
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.shape
    }

    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.shape.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.keys().map(String::as_str)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn catchall_schema(&self) -> Option<&Schema> {
        self.catchall.as_deref()
    }

    // -- Transforms ---------------------------------------------------------

    pub fn with_unknown_keys(&self, policy: UnknownKeys) -> Self {
        Self {
            unknown_keys: policy,
            ..self.clone()
        }
    }

    pub fn strict(&self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Like [`strict`](Self::strict), reporting unknown keys with `message`
    /// in place of the built-in text.
    pub fn strict_with_message(&self, message: impl Into<String>) -> Self {
        Self {
            unknown_keys: UnknownKeys::Strict,
            unrecognized_keys_message: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn strip(&self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    pub fn passthrough(&self) -> Self {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Validate every unknown key against `schema`. Overrides the unknown-key
    /// policy while set.
    pub fn catchall(&self, schema: Schema) -> Self {
        Self {
            catchall: Some(Box::new(schema)),
            ..self.clone()
        }
    }

    /// Keep only the fields named in `mask`. Unknown mask keys are ignored.
    pub fn pick<S: AsRef<str>>(&self, mask: &[S]) -> Self {
        self.filter_fields(|key| in_mask(mask, key))
    }

    /// Drop the fields named in `mask`.
    pub fn omit<S: AsRef<str>>(&self, mask: &[S]) -> Self {
        self.filter_fields(|key| !in_mask(mask, key))
    }

    /// Make every field optional.
    pub fn partial(&self) -> Self {
        self.map_fields(|_, schema| schema.clone().optional())
    }

    /// Make the fields named in `mask` optional.
    pub fn partial_fields<S: AsRef<str>>(&self, mask: &[S]) -> Self {
        self.map_fields(|key, schema| {
            if in_mask(mask, key) {
                schema.clone().optional()
            } else {
                schema.clone()
            }
        })
    }

    /// Strip every `Optional` layer from every field.
    pub fn required(&self) -> Self {
        self.map_fields(|_, schema| schema.unwrap_optional().clone())
    }

    /// Strip every `Optional` layer from the fields named in `mask`.
    pub fn required_fields<S: AsRef<str>>(&self, mask: &[S]) -> Self {
        self.map_fields(|key, schema| {
            if in_mask(mask, key) {
                schema.unwrap_optional().clone()
            } else {
                schema.clone()
            }
        })
    }

    pub fn deep_partial(&self) -> Self {
        self.deep_partial_except::<&str>(&[])
    }

    /// Deep-partial every field except those in `protected`, which become
    /// required instead (every `Optional` layer stripped).
    pub fn deep_partial_except<S: AsRef<str>>(&self, protected: &[S]) -> Self {
        self.map_fields(|key, schema| {
            if in_mask(protected, key) {
                schema.unwrap_optional().clone()
            } else {
                schema.deep_partial().optional()
            }
        })
    }

    fn filter_fields(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            shape: self
                .shape
                .iter()
                .filter(|(key, _)| keep(key))
                .map(|(key, schema)| (key.clone(), schema.clone()))
                .collect(),
            ..self.clone()
        }
    }

    fn map_fields(&self, f: impl Fn(&str, &Schema) -> Schema) -> Self {
        Self {
            shape: self
                .shape
                .iter()
                .map(|(key, schema)| (key.clone(), f(key, schema)))
                .collect(),
            ..self.clone()
        }
    }

    // -- Parsing ------------------------------------------------------------

    pub fn parse(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value(data, &mut ctx);
        ctx.finish(output)
    }

    pub async fn parse_async(&self, data: &Value) -> ParseResult {
        let mut ctx = ParseContext::new();
        let output = self.parse_value_async(data, &mut ctx).await;
        ctx.finish(output)
    }

    pub(crate) fn parse_value(&self, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
        let Value::Object(input) = data else {
            return type_mismatch(data, ValueType::Object, ctx);
        };
        let mut output = IndexMap::with_capacity(input.len());
        let mut valid = true;

        for (key, schema) in &self.shape {
            let value = input.get(key).unwrap_or(&Value::Undefined);
            ctx.push(PathSegment::Key(key.clone()));
            let parsed = schema.parse_value(value, ctx);
            ctx.pop();
            valid &= write_field(&mut output, input.contains_key(key), key, parsed);
        }

        let extra = self.extra_keys(input);
        if let Some(catchall) = &self.catchall {
            for key in extra {
                ctx.push(PathSegment::Key(key.to_string()));
                let parsed = catchall.parse_value(&input[key], ctx);
                ctx.pop();
                valid &= write_field(&mut output, true, key, parsed);
            }
        } else {
            valid &= self.apply_unknown_keys(input, &extra, &mut output, data, ctx);
        }

        valid.then_some(Value::Object(output))
    }

    pub(crate) fn parse_value_async<'a>(
        &'a self,
        data: &'a Value,
        ctx: &'a mut ParseContext,
    ) -> BoxFuture<'a, Option<Value>> {
        async move {
            let Value::Object(input) = data else {
                return type_mismatch(data, ValueType::Object, ctx);
            };
            let mut output = IndexMap::with_capacity(input.len());
            let mut valid = true;

            for (key, schema) in &self.shape {
                let value = input.get(key).unwrap_or(&Value::Undefined);
                ctx.push(PathSegment::Key(key.clone()));
                let parsed = schema.parse_value_async(value, ctx).await;
                ctx.pop();
                valid &= write_field(&mut output, input.contains_key(key), key, parsed);
            }

            let extra = self.extra_keys(input);
            if let Some(catchall) = &self.catchall {
                for key in extra {
                    ctx.push(PathSegment::Key(key.to_string()));
                    let parsed = catchall.parse_value_async(&input[key], ctx).await;
                    ctx.pop();
                    valid &= write_field(&mut output, true, key, parsed);
                }
            } else {
                valid &= self.apply_unknown_keys(input, &extra, &mut output, data, ctx);
            }

            valid.then_some(Value::Object(output))
        }
        .boxed()
    }

    fn extra_keys<'v>(&self, input: &'v IndexMap<String, Value>) -> Vec<&'v str> {
        input
            .keys()
            .filter(|key| !self.shape.contains_key(*key))
            .map(String::as_str)
            .collect()
    }

    /// Handle keys outside the shape when no catchall is set. Returns whether
    /// the object is still valid.
    fn apply_unknown_keys(
        &self,
        input: &IndexMap<String, Value>,
        extra: &[&str],
        output: &mut IndexMap<String, Value>,
        data: &Value,
        ctx: &mut ParseContext,
    ) -> bool {
        match self.unknown_keys {
            UnknownKeys::Strip => true,
            UnknownKeys::Passthrough => {
                for key in extra {
                    output.insert((*key).to_string(), input[*key].clone());
                }
                true
            }
            UnknownKeys::Strict if extra.is_empty() => true,
            UnknownKeys::Strict => {
                let kind = IssueKind::UnrecognizedKeys {
                    keys: extra.iter().map(|k| (*k).to_string()).collect(),
                };
                match &self.unrecognized_keys_message {
                    Some(message) => ctx.add_issue_message(kind, message.clone()),
                    None => ctx.add_issue(kind, data),
                }
                false
            }
        }
    }
}

fn in_mask<S: AsRef<str>>(mask: &[S], key: &str) -> bool {
    mask.iter().any(|m| m.as_ref() == key)
}

/// Store a parsed field. A key lands in the output when it was present in the
/// input or parsed to something other than `undefined`.
fn write_field(
    output: &mut IndexMap<String, Value>,
    present: bool,
    key: &str,
    parsed: Option<Value>,
) -> bool {
    match parsed {
        Some(value) => {
            if present || !value.is_undefined() {
                output.insert(key.to_string(), value);
            }
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn sample() -> ObjectSchema {
        ObjectSchema::new([
            ("type", Schema::literal("a")),
            ("foo", Schema::String),
            ("bar", Schema::String.optional()),
        ])
    }

    #[test]
    fn test_missing_required_field() {
        let err = sample().parse(&v(json!({"type": "a"}))).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, vec![PathSegment::from("foo")]);
        assert_eq!(err.issues[0].message, "Required");
    }

    #[test]
    fn test_strip_is_default() {
        let out = sample()
            .parse(&v(json!({"type": "a", "foo": "x", "extra": 1})))
            .unwrap();
        assert_eq!(out.to_json(), json!({"type": "a", "foo": "x"}));
    }

    #[test]
    fn test_strict_reports_unrecognized_keys() {
        let err = sample()
            .strict()
            .parse(&v(json!({"type": "a", "foo": "x", "extra": 1})))
            .unwrap_err();
        assert_eq!(
            err.issues[0].kind,
            IssueKind::UnrecognizedKeys {
                keys: vec!["extra".to_string()]
            }
        );
        assert!(err.issues[0].path.is_empty());
    }

    #[test]
    fn test_strict_with_message_overrides_unrecognized_keys_text() {
        let schema = sample().strict_with_message("no extras");
        let err = schema
            .parse(&v(json!({"type": "a", "foo": "x", "extra": 1})))
            .unwrap_err();
        assert_eq!(err.issues[0].code(), "unrecognized_keys");
        assert_eq!(err.issues[0].message, "no extras");

        // Other issues keep their built-in messages
        let err = schema.parse(&v(json!({"type": "a"}))).unwrap_err();
        assert_eq!(err.issues[0].message, "Required");
    }

    #[test]
    fn test_passthrough_keeps_unknown_keys() {
        let out = sample()
            .passthrough()
            .parse(&v(json!({"type": "a", "foo": "x", "extra": 1})))
            .unwrap();
        assert_eq!(out.to_json(), json!({"type": "a", "foo": "x", "extra": 1}));
    }

    #[test]
    fn test_catchall_validates_unknown_keys() {
        let schema = sample().strict().catchall(Schema::Number);
        assert!(matches!(schema.catchall_schema(), Some(Schema::Number)));
        assert!(schema
            .parse(&v(json!({"type": "a", "foo": "x", "n": 1})))
            .is_ok());
        let err = schema
            .parse(&v(json!({"type": "a", "foo": "x", "n": "1"})))
            .unwrap_err();
        assert_eq!(err.issues[0].path, vec![PathSegment::from("n")]);
    }

    #[test]
    fn test_present_undefined_key_is_kept() {
        let schema = ObjectSchema::new([("type", Schema::Undefined)]);
        let out = schema
            .parse(&Value::object([("type", Value::Undefined)]))
            .unwrap();
        assert_eq!(out.as_object().unwrap().get("type"), Some(&Value::Undefined));

        let out = schema.parse(&Value::Object(IndexMap::new())).unwrap();
        assert!(out.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_pick_and_omit() {
        let picked = sample().pick(&["foo"]);
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["foo"]);
        let omitted = sample().omit(&["foo"]);
        assert_eq!(omitted.keys().collect::<Vec<_>>(), vec!["type", "bar"]);
    }

    #[test]
    fn test_partial_and_required() {
        let partial = sample().partial_fields(&["foo"]);
        assert!(partial.field("foo").unwrap().is_optional());
        assert!(!partial.field("type").unwrap().is_optional());

        let required = sample().required();
        assert!(!required.field("bar").unwrap().is_optional());
    }

    #[test]
    fn test_deep_partial_except_protects_keys() {
        let schema = ObjectSchema::new([
            ("type", Schema::literal("a")),
            ("nested", Schema::object([("x", Schema::Number)])),
        ])
        .deep_partial_except(&["type"]);
        assert!(!schema.field("type").unwrap().is_optional());
        assert!(schema.parse(&v(json!({"type": "a", "nested": {}}))).is_ok());
        assert!(schema.parse(&v(json!({}))).is_err());
    }

    #[test]
    fn test_deep_partial_except_requires_optional_protected_key() {
        let schema = ObjectSchema::new([
            ("type", Schema::literal("a").optional()),
            ("val", Schema::Number),
        ])
        .deep_partial_except(&["type"]);
        assert!(!schema.field("type").unwrap().is_optional());
        assert!(schema.field("val").unwrap().is_optional());
        assert!(schema.parse(&v(json!({"val": 1}))).is_err());
    }
}
