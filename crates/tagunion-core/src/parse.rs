//! Per-call parse state: the current path and the issue sink.

use crate::config::ErrorStrategy;
use crate::issue::{ErrorMapContext, Issue, IssueKind, ParseResult, PathSegment, ValidationError};
use crate::value::Value;

/// Message reported when an async effect is reached through a sync parse.
pub(crate) const ASYNC_IN_SYNC: &str =
    "Asynchronous effect encountered during synchronous parse; use parse_async instead";

#[derive(Debug, Default)]
pub(crate) struct ParseContext {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl ParseContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.path.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.path.pop();
    }

    /// Record an issue at the current path with the built-in message.
    pub(crate) fn add_issue(&mut self, kind: IssueKind, data: &Value) {
        self.add_issue_with(kind, data, &ErrorStrategy::Default);
    }

    /// Record an issue at the current path, formatting its message through
    /// the raising schema's error strategy.
    pub(crate) fn add_issue_with(&mut self, kind: IssueKind, data: &Value, errors: &ErrorStrategy) {
        let default_error = kind.default_message();
        let message = errors.message_for(
            &kind,
            &ErrorMapContext {
                default_error: &default_error,
                data,
                path: &self.path,
            },
        );
        self.issues.push(Issue {
            kind,
            path: self.path.clone(),
            message,
        });
    }

    pub(crate) fn add_custom(&mut self, message: impl Into<String>) {
        self.add_issue_message(IssueKind::Custom, message);
    }

    /// Record an issue at the current path with a fixed message.
    pub(crate) fn add_issue_message(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.issues.push(Issue {
            kind,
            path: self.path.clone(),
            message: message.into(),
        });
    }

    pub(crate) fn finish(self, output: Option<Value>) -> ParseResult {
        match output {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationError {
                issues: self.issues,
            }),
        }
    }
}
