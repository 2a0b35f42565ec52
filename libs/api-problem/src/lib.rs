//! RFC 7807 Problem Details for HTTP APIs
//!
//! Builds a canonical problem document from a status code and either a plain
//! message or an error value. Invalid input is normalized instead of rejected,
//! so the builder is safe to call from a last-resort error path:
//! - status codes outside `100..=599` become 500
//! - missing titles and types fall back to the status table and `about:blank`
//! - extension members can never overwrite `status`, `type`, `title` or `detail`
//!
//! Turning the document into a response (headers, transport status, body
//! encoding) is left to the caller; [`APPLICATION_PROBLEM_JSON`] is the
//! content type to send it with.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain_error;
pub mod problem;
pub mod source;
pub mod status;

pub use config::ProblemConfig;
pub use domain_error::DomainError;
pub use problem::{CauseEntry, Problem, ProblemBuilder, RESERVED_KEYS};
pub use source::{Detail, Frame, ProblemSource};
pub use status::{RawStatus, status_title};

/// Content type for Problem Details as per RFC 7807.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";
