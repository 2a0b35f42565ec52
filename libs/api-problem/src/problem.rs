//! RFC 7807 Problem Details built from a status and a message or error value.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::{DEFAULT_MAX_CAUSE_DEPTH, DEFAULT_PROBLEM_TYPE, ProblemConfig};
use crate::source::{Detail, Frame, ProblemSource};
use crate::status::{self, RawStatus, UNKNOWN_TITLE, status_title};

/// Members that always come from the canonical fields, never from extensions.
pub const RESERVED_KEYS: [&str; 4] = ["status", "type", "title", "detail"];

const TRACE_KEY: &str = "trace";
const EXCEPTION_STACK_KEY: &str = "exception_stack";

/// One ancestor of the source error, as reported in `exception_stack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseEntry {
    /// Code exposed by the ancestor; `null` when it has none.
    pub code: Option<i64>,
    /// The ancestor's message, verbatim.
    pub message: String,
    /// The ancestor's own execution trace.
    pub trace: Vec<Frame>,
}

impl CauseEntry {
    fn capture(source: &dyn ProblemSource) -> Self {
        Self {
            code: source.code(),
            message: source.message().into_owned(),
            trace: source.trace().to_vec(),
        }
    }
}

/// Owned copy of what the source error exposed, taken at build time.
#[derive(Debug, Clone, PartialEq)]
struct ErrorSnapshot {
    trace: Vec<Frame>,
    causes: Vec<CauseEntry>,
}

impl ErrorSnapshot {
    fn capture(top: &dyn ProblemSource, max_depth: usize) -> Self {
        let mut visited = vec![top];
        let mut causes = Vec::new();
        let mut next = top.cause();

        while let Some(cause) = next {
            if visited.iter().any(|seen| same_object(*seen, cause)) {
                tracing::warn!(depth = causes.len(), "cycle in error cause chain, stopping");
                break;
            }
            if causes.len() >= max_depth {
                tracing::warn!(max_depth, "error cause chain truncated");
                break;
            }
            visited.push(cause);
            causes.push(CauseEntry::capture(cause));
            next = cause.cause();
        }

        Self {
            trace: top.trace().to_vec(),
            causes,
        }
    }
}

/// An inline cause shares its parent's address, so identity needs more than
/// the data pointer. Vtables may be duplicated across codegen units, hence the
/// size and kind fallback.
fn same_object<'a>(a: &'a dyn ProblemSource, b: &'a dyn ProblemSource) -> bool {
    std::ptr::eq(a, b)
        || (std::ptr::addr_eq(a, b)
            && std::mem::size_of_val(a) == std::mem::size_of_val(b)
            && a.kind() == b.kind())
}

/// Assembles a [`Problem`] from a status and a message or error value.
///
/// Resolution rules:
/// - status: a valid code carried by the error wins, then the given status;
///   anything outside `100..=599` becomes 500
/// - title: explicit title, the error's title, the status table, the error's
///   kind name, then `"Unknown"`
/// - type: explicit type, the error's type, then the configured default
/// - extensions: the error's extension members overlaid with the explicit ones
#[derive(Debug)]
#[must_use]
pub struct ProblemBuilder<'a> {
    status: RawStatus,
    detail: Detail<'a>,
    type_url: Option<String>,
    title: Option<String>,
    additional_details: Map<String, Value>,
    default_type: String,
    max_cause_depth: usize,
    detail_includes_stack_trace: bool,
}

impl<'a> ProblemBuilder<'a> {
    pub fn new(status: impl Into<RawStatus>, detail: impl Into<Detail<'a>>) -> Self {
        Self {
            status: status.into(),
            detail: detail.into(),
            type_url: None,
            title: None,
            additional_details: Map::new(),
            default_type: DEFAULT_PROBLEM_TYPE.to_owned(),
            max_cause_depth: DEFAULT_MAX_CAUSE_DEPTH,
            detail_includes_stack_trace: false,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = Some(type_url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds extension members; they win over members exposed by the error.
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

    pub fn with_detail_includes_stack_trace(mut self, flag: bool) -> Self {
        self.detail_includes_stack_trace = flag;
        self
    }

    pub fn with_config(mut self, config: &ProblemConfig) -> Self {
        self.default_type.clone_from(&config.default_type);
        self.max_cause_depth = config.max_cause_depth;
        self.detail_includes_stack_trace = config.display_exceptions;
        self
    }

    pub fn build(self) -> Problem {
        let error = self.detail.as_error();
        let status = status::resolve(self.status, error.and_then(ProblemSource::code));

        let detail = match self.detail {
            Detail::Message(message) => message.to_owned(),
            Detail::Error(source) => source.message().into_owned(),
        };

        let title = self
            .title
            .or_else(|| error.and_then(ProblemSource::title).map(str::to_owned))
            .or_else(|| status_title(status).map(str::to_owned))
            .or_else(|| error.map(|e| e.kind().into_owned()))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_owned());

        let type_url = self
            .type_url
            .or_else(|| error.and_then(ProblemSource::problem_type).map(str::to_owned))
            .unwrap_or(self.default_type);

        let mut additional_details = error
            .and_then(ProblemSource::additional_details)
            .cloned()
            .unwrap_or_default();
        additional_details.extend(self.additional_details);

        Problem {
            status,
            type_url,
            title,
            detail,
            additional_details,
            detail_includes_stack_trace: self.detail_includes_stack_trace,
            error: error.map(|e| ErrorSnapshot::capture(e, self.max_cause_depth)),
        }
    }
}

/// RFC 7807 Problem Details.
///
/// Canonical fields are fixed at build time. Only the trace flag can change
/// afterwards, so [`to_map`](Problem::to_map) returns the same document until
/// the flag is toggled.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Problem {
    status: u16,
    type_url: String,
    title: String,
    detail: String,
    additional_details: Map<String, Value>,
    detail_includes_stack_trace: bool,
    error: Option<ErrorSnapshot>,
}

impl Problem {
    /// Shorthand for `ProblemBuilder::new(status, detail).build()`.
    pub fn new<'a>(status: impl Into<RawStatus>, detail: impl Into<Detail<'a>>) -> Self {
        ProblemBuilder::new(status, detail).build()
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn problem_type(&self) -> &str {
        &self.type_url
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn additional_details(&self) -> &Map<String, Value> {
        &self.additional_details
    }

    #[must_use]
    pub fn additional_detail(&self, key: &str) -> Option<&Value> {
        self.additional_details.get(key)
    }

    #[must_use]
    pub fn detail_includes_stack_trace(&self) -> bool {
        self.detail_includes_stack_trace
    }

    pub fn set_detail_includes_stack_trace(&mut self, flag: bool) {
        self.detail_includes_stack_trace = flag;
    }

    pub fn with_detail_includes_stack_trace(mut self, flag: bool) -> Self {
        self.detail_includes_stack_trace = flag;
        self
    }

    /// Trace of the source error; empty for message-based problems.
    #[must_use]
    pub fn trace(&self) -> &[Frame] {
        self.error.as_ref().map_or(&[], |e| e.trace.as_slice())
    }

    /// Ancestors of the source error, outermost first, excluding the error itself.
    #[must_use]
    pub fn cause_chain(&self) -> &[CauseEntry] {
        self.error.as_ref().map_or(&[], |e| e.causes.as_slice())
    }

    /// Case-insensitive lookup of a canonical field, `additionalDetails`, or
    /// a single extension member.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match name.to_ascii_lowercase().as_str() {
            "status" => Some(Value::from(self.status)),
            "type" => Some(Value::from(self.type_url.as_str())),
            "title" => Some(Value::from(self.title.as_str())),
            "detail" => Some(Value::from(self.detail.as_str())),
            "additionaldetails" | "additional_details" => {
                Some(Value::Object(self.additional_details.clone()))
            }
            _ => self
                .additional_details
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone()),
        }
    }

    /// Renders the problem document.
    ///
    /// Extension members named like a canonical field are dropped. With the
    /// trace flag on and an error source, `trace` and `exception_stack` are
    /// added and shadow same-named extension members.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("status".to_owned(), Value::from(self.status));
        map.insert("title".to_owned(), Value::from(self.title.as_str()));
        map.insert("type".to_owned(), Value::from(self.type_url.as_str()));
        map.insert("detail".to_owned(), Value::from(self.detail.as_str()));

        if self.detail_includes_stack_trace
            && let Some(error) = &self.error
        {
            map.insert(TRACE_KEY.to_owned(), to_array(&error.trace));
            map.insert(EXCEPTION_STACK_KEY.to_owned(), to_array(&error.causes));
        }

        for (key, value) in &self.additional_details {
            if RESERVED_KEYS.contains(&key.as_str()) || map.contains_key(key) {
                continue;
            }
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// Rebuilds a problem from a received document.
    ///
    /// Unknown members become extension members. A status may be an integer,
    /// an integral float such as `404.0`, or a numeric string; anything else
    /// becomes 500. A missing title falls back to the status table.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut raw_status = RawStatus::from(None::<i64>);
        let mut type_url = None;
        let mut title = None;
        let mut detail = None;
        let mut additional_details = Map::new();

        for (key, value) in map {
            match key.as_str() {
                "status" => raw_status = raw_status_of(&value),
                "type" => type_url = value.as_str().map(str::to_owned),
                "title" => title = value.as_str().map(str::to_owned),
                "detail" => detail = value.as_str().map(str::to_owned),
                _ => {
                    additional_details.insert(key, value);
                }
            }
        }

        let status = raw_status.normalize();
        Self {
            status,
            type_url: type_url.unwrap_or_else(|| DEFAULT_PROBLEM_TYPE.to_owned()),
            title: title
                .unwrap_or_else(|| status_title(status).unwrap_or(UNKNOWN_TITLE).to_owned()),
            detail: detail.unwrap_or_default(),
            additional_details,
            detail_includes_stack_trace: false,
            error: None,
        }
    }
}

fn to_array<T: Serialize>(items: &[T]) -> Value {
    serde_json::to_value(items).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn raw_status_of(value: &Value) -> RawStatus {
    match value {
        Value::Number(n) => RawStatus::from(integral(n)),
        Value::String(s) => RawStatus::from(s.as_str()),
        _ => RawStatus::from(None::<i64>),
    }
}

#[allow(clippy::cast_possible_truncation)] // `as` saturates; out-of-range values normalize to 500
fn integral(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract().abs() < f64::EPSILON)
            .map(|f| f as i64)
    })
}

impl Serialize for Problem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Problem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}
