//! A chainable error value exposing every problem capability.

use std::borrow::Cow;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DEFAULT_MAX_CAUSE_DEPTH;
use crate::source::{Frame, ProblemSource};

const DEFAULT_KIND: &str = "DomainError";
const STD_ERROR_KIND: &str = "Error";

/// Error raised by application code that wants to shape its own problem
/// response: title, type URI, status code and extension members.
///
/// ```
/// use api_problem::{DomainError, ProblemBuilder};
///
/// let err = DomainError::new("order 42 is already shipped")
///     .with_code(409)
///     .with_type("https://example.com/problems/order-state")
///     .with_additional_detail("order_id", 42);
///
/// let problem = ProblemBuilder::new(500, &err).build();
/// assert_eq!(problem.status(), 409);
/// assert_eq!(problem.title(), "Conflict");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
#[must_use]
pub struct DomainError {
    message: String,
    kind: Cow<'static, str>,
    code: Option<i64>,
    title: Option<String>,
    type_url: Option<String>,
    additional_details: Map<String, Value>,
    #[source]
    cause: Option<Box<DomainError>>,
    trace: Vec<Frame>,
}

impl DomainError {
    /// Creates an error whose trace starts at the call site.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let mut err = Self::bare(message.into(), Cow::Borrowed(DEFAULT_KIND));
        err.trace.push(Frame::caller());
        err
    }

    fn bare(message: String, kind: Cow<'static, str>) -> Self {
        Self {
            message,
            kind,
            code: None,
            title: None,
            type_url: None,
            additional_details: Map::new(),
            cause: None,
            trace: Vec::new(),
        }
    }

    /// Converts a standard error and its `source()` chain.
    ///
    /// Works for anything exposing `std::error::Error`, including
    /// `anyhow::Error` via `&*err`. The chain is cut after
    /// [`DEFAULT_MAX_CAUSE_DEPTH`] ancestors; use
    /// [`from_std_error_with_depth`](Self::from_std_error_with_depth) to pass
    /// `ProblemConfig::max_cause_depth` instead.
    #[track_caller]
    pub fn from_std_error(err: &dyn std::error::Error) -> Self {
        Self::from_std_error_with_depth(err, DEFAULT_MAX_CAUSE_DEPTH)
    }

    /// Like [`from_std_error`](Self::from_std_error), keeping at most
    /// `max_depth` ancestors.
    #[track_caller]
    pub fn from_std_error_with_depth(err: &dyn std::error::Error, max_depth: usize) -> Self {
        let mut messages = vec![err.to_string()];
        let mut next = err.source();
        while let Some(cause) = next {
            if messages.len() > max_depth {
                tracing::warn!(max_depth, "error source chain truncated while converting");
                break;
            }
            messages.push(cause.to_string());
            next = cause.source();
        }

        let mut chain: Option<Box<Self>> = None;
        while let Some(message) = messages.pop() {
            let mut link = Self::bare(message, Cow::Borrowed(STD_ERROR_KIND));
            link.cause = chain;
            chain = Some(Box::new(link));
        }

        let mut top = match chain {
            Some(top) => *top,
            None => Self::bare(err.to_string(), Cow::Borrowed(STD_ERROR_KIND)),
        };
        top.trace.push(Frame::caller());
        top
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<Cow<'static, str>>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = Some(type_url.into());
        self
    }

    /// Adds extension members, overwriting existing keys.
    pub fn with_additional_details(mut self, details: Map<String, Value>) -> Self {
        self.additional_details.extend(details);
        self
    }

    pub fn with_additional_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.additional_details.insert(key.into(), value.into());
        self
    }

    pub fn with_cause(mut self, cause: DomainError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.trace.push(frame);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    #[must_use]
    pub fn cause(&self) -> Option<&DomainError> {
        self.cause.as_deref()
    }
}

impl ProblemSource for DomainError {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.kind)
    }

    fn code(&self) -> Option<i64> {
        self.code
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn problem_type(&self) -> Option<&str> {
        self.type_url.as_deref()
    }

    fn additional_details(&self) -> Option<&Map<String, Value>> {
        if self.additional_details.is_empty() {
            None
        } else {
            Some(&self.additional_details)
        }
    }

    fn cause(&self) -> Option<&dyn ProblemSource> {
        self.cause.as_deref().map(|c| c as &dyn ProblemSource)
    }

    fn trace(&self) -> &[Frame] {
        &self.trace
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[derive(Debug, Error)]
    #[error("write failed")]
    struct WriteFailed(#[source] DiskFull);

    #[test]
    fn new_records_call_site() {
        let err = DomainError::new("boom");
        assert_eq!(err.trace.len(), 1);
        assert!(err.trace[0].file.ends_with("domain_error.rs"));
        assert_eq!(ProblemSource::kind(&err), "DomainError");
    }

    #[test]
    fn setters_populate_capabilities() {
        let err = DomainError::new("boom")
            .with_code(401)
            .with_title("problem title")
            .with_type("http://example.com/api/help/401")
            .with_additional_detail("foo", "bar");

        assert_eq!(ProblemSource::code(&err), Some(401));
        assert_eq!(ProblemSource::title(&err), Some("problem title"));
        assert_eq!(err.problem_type(), Some("http://example.com/api/help/401"));
        assert_eq!(
            err.additional_details().and_then(|d| d.get("foo")),
            Some(&Value::from("bar"))
        );
    }

    #[test]
    fn empty_additional_details_are_absent() {
        assert!(DomainError::new("boom").additional_details().is_none());
    }

    #[test]
    fn cause_is_exposed_as_std_source_and_capability() {
        let err = DomainError::new("parent").with_cause(DomainError::new("child"));
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("child"));
        let cause = ProblemSource::cause(&err).unwrap();
        assert_eq!(cause.message(), "child");
    }

    #[test]
    fn additional_details_merge_like_the_builder() {
        let mut first = Map::new();
        first.insert("foo".to_owned(), Value::from("bar"));
        first.insert("keep".to_owned(), Value::from(1));
        let mut second = Map::new();
        second.insert("foo".to_owned(), Value::from("baz"));

        let err = DomainError::new("boom")
            .with_additional_detail("early", true)
            .with_additional_details(first)
            .with_additional_details(second);
        let details = err.additional_details().unwrap();
        assert_eq!(details.get("early"), Some(&Value::from(true)));
        assert_eq!(details.get("keep"), Some(&Value::from(1)));
        assert_eq!(details.get("foo"), Some(&Value::from("baz")));
    }

    #[test]
    fn from_std_error_with_depth_cuts_chain() {
        let err = DomainError::from_std_error_with_depth(&WriteFailed(DiskFull), 0);
        assert_eq!(err.message(), "write failed");
        assert!(err.cause().is_none());
        assert_eq!(err.trace.len(), 1);
        assert!(err.trace[0].file.ends_with("domain_error.rs"));
    }

    #[test]
    fn from_std_error_keeps_chain_order() {
        let err = DomainError::from_std_error(&WriteFailed(DiskFull));
        assert_eq!(err.message(), "write failed");
        assert_eq!(ProblemSource::kind(&err), "Error");
        assert_eq!(err.trace.len(), 1);
        let cause = err.cause().unwrap();
        assert_eq!(cause.message(), "disk full");
        assert!(cause.cause().is_none());
        assert!(cause.trace.is_empty());
    }
}
