//! Resolution errors.

use thiserror::Error;

/// Errors raised while building matchers from configured literals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The literal does not have the shape of the domain.
    #[error("invalid {kind} syntax: {value:?}")]
    InvalidSyntax { kind: &'static str, value: String },

    /// A component of the literal is outside its accepted range.
    #[error("{field} {actual} out of range {min}..={max} in {value:?}")]
    OutOfRange {
        field: &'static str,
        actual: i32,
        min: i32,
        max: i32,
        value: String,
    },

    /// Span bounds are not strictly increasing.
    #[error("span lower bound {from:?} must be before upper bound {to:?}")]
    InvalidSpan { from: String, to: String },

    /// The matcher kind is not defined for the domain.
    #[error("{matcher} matcher is not supported for {domain} values")]
    UnsupportedMatcher {
        matcher: &'static str,
        domain: &'static str,
    },
}

impl ResolveError {
    /// Stable machine-readable code for logs and diagnostics.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidSyntax { .. } => "invalid_syntax",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidSpan { .. } => "invalid_span",
            Self::UnsupportedMatcher { .. } => "unsupported_matcher",
        }
    }
}
