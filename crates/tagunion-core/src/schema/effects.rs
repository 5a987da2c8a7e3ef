//! Value-transforming wrappers: preprocessing, transforms and refinements.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::Schema;
use crate::parse::{ParseContext, ASYNC_IN_SYNC};
use crate::value::Value;

type PreprocessFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type RefineFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncRefineFn = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;
type AsyncTransformFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

#[derive(Clone)]
pub enum Effect {
    /// Rewrites the input before the inner schema sees it.
    Preprocess(PreprocessFn),
    /// Rewrites the inner schema's output.
    Transform(TransformFn),
    Refine { check: RefineFn, message: String },
    AsyncRefine { check: AsyncRefineFn, message: String },
    AsyncTransform(AsyncTransformFn),
}

impl Effect {
    fn is_async(&self) -> bool {
        matches!(self, Effect::AsyncRefine { .. } | Effect::AsyncTransform(_))
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Effect::Preprocess(_) => "Preprocess",
            Effect::Transform(_) => "Transform",
            Effect::Refine { .. } => "Refine",
            Effect::AsyncRefine { .. } => "AsyncRefine",
            Effect::AsyncTransform(_) => "AsyncTransform",
        };
        write!(f, "{name}(..)")
    }
}

/// An inner schema plus one effect applied around it.
#[derive(Debug, Clone)]
pub struct Effects {
    inner: Box<Schema>,
    effect: Effect,
}

impl Effects {
    pub fn new(inner: Schema, effect: Effect) -> Self {
        Self {
            inner: Box::new(inner),
            effect,
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub(crate) fn parse_value(&self, data: &Value, ctx: &mut ParseContext) -> Option<Value> {
        if self.effect.is_async() {
            ctx.add_custom(ASYNC_IN_SYNC);
            return None;
        }
        match &self.effect {
            Effect::Preprocess(f) => self.inner.parse_value(&f(data), ctx),
            Effect::Transform(f) => self.inner.parse_value(data, ctx).map(|v| f(v)),
            Effect::Refine { check, message } => {
                let value = self.inner.parse_value(data, ctx)?;
                if check(&value) {
                    Some(value)
                } else {
                    ctx.add_custom(message.clone());
                    None
                }
            }
            Effect::AsyncRefine { .. } | Effect::AsyncTransform(_) => None,
        }
    }

    pub(crate) fn parse_value_async<'a>(
        &'a self,
        data: &'a Value,
        ctx: &'a mut ParseContext,
    ) -> BoxFuture<'a, Option<Value>> {
        async move {
            match &self.effect {
                Effect::Preprocess(f) => {
                    let processed = f(data);
                    self.inner.parse_value_async(&processed, ctx).await
                }
                Effect::Transform(f) => self.inner.parse_value_async(data, ctx).await.map(|v| f(v)),
                Effect::Refine { check, message } => {
                    let value = self.inner.parse_value_async(data, ctx).await?;
                    if check(&value) {
                        Some(value)
                    } else {
                        ctx.add_custom(message.clone());
                        None
                    }
                }
                Effect::AsyncRefine { check, message } => {
                    let value = self.inner.parse_value_async(data, ctx).await?;
                    if check(value.clone()).await {
                        Some(value)
                    } else {
                        ctx.add_custom(message.clone());
                        None
                    }
                }
                Effect::AsyncTransform(f) => {
                    let value = self.inner.parse_value_async(data, ctx).await?;
                    Some(f(value).await)
                }
            }
        }
        .boxed()
    }
}

impl Schema {
    pub fn preprocess<F>(self, f: F) -> Schema
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Schema::Effects(Effects::new(self, Effect::Preprocess(Arc::new(f))))
    }

    pub fn transform<F>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Schema::Effects(Effects::new(self, Effect::Transform(Arc::new(f))))
    }

    pub fn refine<F>(self, check: F, message: impl Into<String>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::Effects(Effects::new(
            self,
            Effect::Refine {
                check: Arc::new(check),
                message: message.into(),
            },
        ))
    }

    pub fn refine_async<F, Fut>(self, check: F, message: impl Into<String>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Schema::Effects(Effects::new(
            self,
            Effect::AsyncRefine {
                check: Arc::new(move |value| check(value).boxed()),
                message: message.into(),
            },
        ))
    }

    pub fn transform_async<F, Fut>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Schema::Effects(Effects::new(
            self,
            Effect::AsyncTransform(Arc::new(move |value| f(value).boxed())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;

    #[test]
    fn test_preprocess_runs_before_inner() {
        let schema = Schema::literal("bar").preprocess(|v| match v {
            Value::Number(n) if *n == 1.0 => Value::from("bar"),
            other => other.clone(),
        });
        assert_eq!(schema.parse(&Value::from(1)), Ok(Value::from("bar")));
    }

    #[test]
    fn test_refine_failure_is_custom_issue() {
        let schema = Schema::String.refine(
            |v| matches!(v, Value::String(s) if s.len() > 2),
            "too short",
        );
        let Schema::Effects(effects) = &schema else {
            panic!("expected effects, got {}", schema.kind_name());
        };
        assert!(matches!(effects.inner(), Schema::String));
        let Effect::Refine { message, .. } = effects.effect() else {
            panic!("expected a refinement, got {:?}", effects.effect());
        };
        assert_eq!(message, "too short");

        let err = schema.parse(&Value::from("ab")).unwrap_err();
        assert_eq!(err.issues[0].kind, IssueKind::Custom);
        assert_eq!(err.issues[0].message, "too short");
    }

    #[test]
    fn test_async_effect_in_sync_parse_reports_issue() {
        let schema = Schema::String.refine_async(|_| async { true }, "never");
        let err = schema.parse(&Value::from("x")).unwrap_err();
        assert_eq!(err.issues[0].message, ASYNC_IN_SYNC);
    }

    #[tokio::test]
    async fn test_async_transform() {
        let schema = Schema::String.transform_async(|v| async move {
            match v {
                Value::String(s) => Value::Number(s.parse().unwrap_or(f64::NAN)),
                other => other,
            }
        });
        assert_eq!(
            schema.parse_async(&Value::from("12")).await,
            Ok(Value::Number(12.0))
        );
    }
}
