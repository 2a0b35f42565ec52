//! Defaults applied by [`ProblemBuilder`](crate::ProblemBuilder).

use serde::Deserialize;

/// Type URI used when neither the caller nor the error supplies one.
pub const DEFAULT_PROBLEM_TYPE: &str = "about:blank";

/// Number of cause-chain ancestors kept before the chain is cut.
pub const DEFAULT_MAX_CAUSE_DEPTH: usize = 32;

/// Problem rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProblemConfig {
    /// Include `trace` and `exception_stack` in serialized problems.
    /// Default: `false`
    pub display_exceptions: bool,

    /// Type URI for problems that do not carry one.
    /// Default: `"about:blank"`
    pub default_type: String,

    /// Maximum number of ancestors collected from an error's cause chain.
    /// `DomainError::from_std_error` always uses the default; pass this value
    /// to `DomainError::from_std_error_with_depth` to apply it there too.
    /// Default: `32`
    pub max_cause_depth: usize,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            display_exceptions: false,
            default_type: DEFAULT_PROBLEM_TYPE.to_owned(),
            max_cause_depth: DEFAULT_MAX_CAUSE_DEPTH,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ProblemConfig::default();
        assert!(!cfg.display_exceptions);
        assert_eq!(cfg.default_type, "about:blank");
        assert_eq!(cfg.max_cause_depth, 32);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: ProblemConfig =
            serde_json::from_str(r#"{"display_exceptions": true}"#).unwrap();
        assert!(cfg.display_exceptions);
        assert_eq!(cfg.default_type, DEFAULT_PROBLEM_TYPE);
        assert_eq!(cfg.max_cause_depth, DEFAULT_MAX_CAUSE_DEPTH);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let res = serde_json::from_str::<ProblemConfig>(r#"{"display_exception": true}"#);
        assert!(res.is_err());
    }
}
