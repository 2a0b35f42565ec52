//! Status code normalization and the canonical status-title table.

use http::StatusCode;

/// Status used whenever the supplied code is not a valid HTTP status.
pub const FALLBACK_STATUS: u16 = 500;

/// Title used when neither an override, the error, nor the table provide one.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Returns `true` for codes in the HTTP status range `100..=599`.
#[must_use]
pub fn is_valid_status(code: i64) -> bool {
    (100..600).contains(&code)
}

/// A status as supplied by the caller, before validation.
///
/// Accepts integers of any width and numeric strings so that callers handing
/// over loosely typed data (headers, config values, error codes) never have to
/// validate first. Anything that does not parse as an integer is kept as
/// "absent" and normalizes to [`FALLBACK_STATUS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatus(Option<i64>);

impl RawStatus {
    /// The raw integer, if the input was numeric.
    #[must_use]
    pub fn value(self) -> Option<i64> {
        self.0
    }

    /// Normalizes to a valid status, falling back to 500.
    #[must_use]
    pub fn normalize(self) -> u16 {
        normalize(self.0)
    }
}

impl From<Option<i64>> for RawStatus {
    fn from(code: Option<i64>) -> Self {
        Self(code)
    }
}

impl From<u16> for RawStatus {
    fn from(code: u16) -> Self {
        Self(Some(i64::from(code)))
    }
}

impl From<i32> for RawStatus {
    fn from(code: i32) -> Self {
        Self(Some(i64::from(code)))
    }
}

impl From<i64> for RawStatus {
    fn from(code: i64) -> Self {
        Self(Some(code))
    }
}

impl From<StatusCode> for RawStatus {
    fn from(code: StatusCode) -> Self {
        Self::from(code.as_u16())
    }
}

impl From<&str> for RawStatus {
    fn from(code: &str) -> Self {
        Self(code.trim().parse::<i64>().ok())
    }
}

impl From<String> for RawStatus {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

/// Coerces an optional raw code into the valid status range.
#[must_use]
pub fn normalize(code: Option<i64>) -> u16 {
    match code.filter(|c| is_valid_status(*c)) {
        Some(valid) => u16::try_from(valid).unwrap_or(FALLBACK_STATUS),
        None => {
            tracing::debug!(?code, "status outside 100..=599, using {FALLBACK_STATUS}");
            FALLBACK_STATUS
        }
    }
}

/// Picks the effective status: a valid error code wins over the raw status.
#[must_use]
pub fn resolve(raw: RawStatus, error_code: Option<i64>) -> u16 {
    match error_code.filter(|c| is_valid_status(*c)) {
        Some(code) => normalize(Some(code)),
        None => raw.normalize(),
    }
}

/// Canonical title for a well-known status code.
#[must_use]
pub const fn status_title(status: u16) -> Option<&'static str> {
    let title = match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "Switch Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };
    Some(title)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn valid_range_is_half_open() {
        assert!(is_valid_status(100));
        assert!(is_valid_status(599));
        assert!(!is_valid_status(99));
        assert!(!is_valid_status(600));
        assert!(!is_valid_status(705));
        assert!(!is_valid_status(-1));
    }

    #[test]
    fn raw_status_parses_numeric_strings() {
        assert_eq!(RawStatus::from("404").normalize(), 404);
        assert_eq!(RawStatus::from(" 409 ").normalize(), 409);
        assert_eq!(RawStatus::from("teapot").value(), None);
        assert_eq!(RawStatus::from("teapot").normalize(), FALLBACK_STATUS);
        assert_eq!(RawStatus::from(String::from("201")).normalize(), 201);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        for code in [-1_i64, 0, 7, 14, 99, 600, 705, i64::MAX] {
            assert_eq!(RawStatus::from(code).normalize(), FALLBACK_STATUS, "{code}");
        }
    }

    #[test]
    fn error_code_overrides_only_when_valid() {
        assert_eq!(resolve(RawStatus::from(500), Some(401)), 401);
        assert_eq!(resolve(RawStatus::from(404), Some(14)), 404);
        assert_eq!(resolve(RawStatus::from(14), Some(14)), FALLBACK_STATUS);
        assert_eq!(resolve(RawStatus::from(404), None), 404);
    }

    #[test]
    fn http_status_code_is_accepted() {
        assert_eq!(RawStatus::from(StatusCode::CONFLICT).normalize(), 409);
    }

    #[test]
    fn table_covers_common_codes() {
        assert_eq!(status_title(404), Some("Not Found"));
        assert_eq!(status_title(409), Some("Conflict"));
        assert_eq!(status_title(422), Some("Unprocessable Entity"));
        assert_eq!(status_title(500), Some("Internal Server Error"));
        assert_eq!(status_title(420), None);
    }
}
