//! Value matchers.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Domain, ResolveError, YearWindow};

/// Order in which the resolver scans candidates for a matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Earliest candidate first.
    #[default]
    Asc,

    /// Latest candidate first.
    Desc,
}

/// Predicate over one canonical value.
///
/// Literals are canonicalized when the matcher is built; an invalid literal
/// is a configuration error. Matching itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact canonical equality.
    Point { domain: Domain, target: String },

    /// Inclusive canonical range.
    Span {
        domain: Domain,
        from: String,
        to: String,
        direction: Direction,
    },

    /// Saturday or Sunday.
    Weekend {
        window: YearWindow,
        direction: Direction,
    },
}

impl Matcher {
    /// Exact value. A name literal must keep at least one letter.
    pub fn point(domain: Domain, literal: &str) -> Result<Self, ResolveError> {
        let target = domain.canonicalize(literal)?;
        if target.is_empty() {
            return Err(ResolveError::InvalidSyntax {
                kind: domain.as_str(),
                value: literal.to_string(),
            });
        }
        Ok(Self::Point { domain, target })
    }

    /// Range `[from, to]`. Requires `from < to`; not defined for names.
    pub fn span(domain: Domain, from: &str, to: &str) -> Result<Self, ResolveError> {
        if domain == Domain::Name {
            return Err(ResolveError::UnsupportedMatcher {
                matcher: "span",
                domain: domain.as_str(),
            });
        }

        let from = domain.canonicalize(from)?;
        let to = domain.canonicalize(to)?;
        if from >= to {
            return Err(ResolveError::InvalidSpan { from, to });
        }

        Ok(Self::Span {
            domain,
            from,
            to,
            direction: Direction::Asc,
        })
    }

    /// Weekend days around the current local year.
    pub fn weekend() -> Self {
        Self::weekend_in(YearWindow::current())
    }

    pub fn weekend_in(window: YearWindow) -> Self {
        Self::Weekend {
            window,
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub fn asc(self) -> Self {
        self.with_direction(Direction::Asc)
    }

    #[must_use]
    pub fn desc(self) -> Self {
        self.with_direction(Direction::Desc)
    }

    /// Sets the scan direction. Points have none and are returned unchanged.
    #[must_use]
    pub fn with_direction(self, direction: Direction) -> Self {
        match self {
            Self::Point { .. } => self,
            Self::Span {
                domain, from, to, ..
            } => Self::Span {
                domain,
                from,
                to,
                direction,
            },
            Self::Weekend { window, .. } => Self::Weekend { window, direction },
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Point { .. } => Direction::Asc,
            Self::Span { direction, .. } | Self::Weekend { direction, .. } => *direction,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Point { domain, .. } | Self::Span { domain, .. } => *domain,
            Self::Weekend { window, .. } => Domain::Date(*window),
        }
    }

    /// Tests a raw upstream value. Malformed values never match.
    pub fn matches(&self, raw: &str) -> bool {
        let value = match self.domain().canonicalize(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    value = %raw,
                    matcher = %self,
                    reason = e.reason_code(),
                    error = %e,
                    "Ignoring value that cannot be canonicalized"
                );
                return false;
            }
        };

        match self {
            Self::Point { target, .. } => value == *target,
            Self::Span { from, to, .. } => *from <= value && value <= *to,
            Self::Weekend { .. } => match NaiveDate::parse_from_str(&value, "%Y.%m.%d") {
                Ok(date) => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring date that does not exist");
                    false
                }
            },
        }
    }
}

impl std::fmt::Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Point { domain, target } => write!(f, "{domain} point({target})"),
            Self::Span {
                domain,
                from,
                to,
                direction,
            } => write!(f, "{domain} span({from}..={to}, {direction:?})"),
            Self::Weekend { direction, .. } => write!(f, "weekend({direction:?})"),
        }
    }
}
