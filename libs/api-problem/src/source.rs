//! Inputs a problem can be built from: plain messages and error values.

use std::borrow::Cow;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of an execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Source file, as reported by `file!()`.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// Enclosing function, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Frame {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            function: None,
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Frame for the caller of the surrounding `#[track_caller]` function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for Frame {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

/// Capabilities an error value may expose to the problem builder.
///
/// Only [`message`](ProblemSource::message) is required. Every other method
/// reports "not provided" by default, and the builder treats absence as no
/// contribution rather than as malformed input.
pub trait ProblemSource {
    /// Human-readable message, used verbatim as the problem detail.
    fn message(&self) -> Cow<'_, str>;

    /// Kind name used as the last-resort title.
    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(std::any::type_name::<Self>()))
    }

    /// Numeric code; a value in `100..=599` overrides the caller's status.
    fn code(&self) -> Option<i64> {
        None
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn problem_type(&self) -> Option<&str> {
        None
    }

    fn additional_details(&self) -> Option<&Map<String, Value>> {
        None
    }

    /// The error this one wraps, if any.
    fn cause(&self) -> Option<&dyn ProblemSource> {
        None
    }

    fn trace(&self) -> &[Frame] {
        &[]
    }
}

/// Strips the module path and generic arguments: `a::b::Foo<T>` becomes `Foo`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// What the problem describes: a plain message or an error value.
#[derive(Clone, Copy)]
pub enum Detail<'a> {
    Message(&'a str),
    Error(&'a dyn ProblemSource),
}

impl<'a> Detail<'a> {
    #[must_use]
    pub fn error(source: &'a dyn ProblemSource) -> Self {
        Self::Error(source)
    }

    #[must_use]
    pub fn as_error(self) -> Option<&'a dyn ProblemSource> {
        match self {
            Self::Error(source) => Some(source),
            Self::Message(_) => None,
        }
    }
}

impl std::fmt::Debug for Detail<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Self::Error(source) => f
                .debug_struct("Error")
                .field("kind", &source.kind())
                .field("message", &source.message())
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for Detail<'a> {
    fn from(message: &'a str) -> Self {
        Self::Message(message)
    }
}

impl<'a> From<&'a String> for Detail<'a> {
    fn from(message: &'a String) -> Self {
        Self::Message(message.as_str())
    }
}

impl<'a> From<&'a dyn ProblemSource> for Detail<'a> {
    fn from(source: &'a dyn ProblemSource) -> Self {
        Self::Error(source)
    }
}

impl<'a> From<&'a crate::DomainError> for Detail<'a> {
    fn from(source: &'a crate::DomainError) -> Self {
        Self::Error(source)
    }
}
