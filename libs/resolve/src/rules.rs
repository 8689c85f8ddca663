//! Rule sets.

use crate::{Domain, Matcher, YearWindow};

/// Preference and exclusion rules for one axis of a target.
///
/// A strict rule set only accepts candidates hit by a `prefer` matcher; a
/// lenient one falls back to the first candidate that is not ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub strict: bool,
    pub prefer: Vec<Matcher>,
    pub ignore: Vec<Matcher>,
}

impl RuleSet {
    /// Accept anything that is not ignored.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Accept only what `prefer` matches.
    pub fn strict(prefer: Vec<Matcher>) -> Self {
        Self {
            strict: true,
            prefer,
            ignore: Vec::new(),
        }
    }

    #[must_use]
    pub fn prefer(mut self, matcher: Matcher) -> Self {
        self.prefer.push(matcher);
        self
    }

    #[must_use]
    pub fn ignore(mut self, matcher: Matcher) -> Self {
        self.ignore.push(matcher);
        self
    }

    /// Strict with nothing preferred: can never select a candidate.
    pub fn is_unsatisfiable(&self) -> bool {
        self.strict && self.prefer.is_empty()
    }
}

/// One of the three axes a target is resolved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Employee,
    Day,
    Time,
}

impl Axis {
    /// Canonicalization domain of values on this axis.
    pub fn domain(&self, window: YearWindow) -> Domain {
        match self {
            Self::Employee => Domain::Name,
            Self::Day => Domain::Date(window),
            Self::Time => Domain::Time,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Day => "day",
            Self::Time => "time",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsatisfiable() {
        assert!(RuleSet::strict(Vec::new()).is_unsatisfiable());
        assert!(!RuleSet::lenient().is_unsatisfiable());

        let m = Matcher::point(Domain::Time, "10:00").unwrap();
        assert!(!RuleSet::strict(vec![m]).is_unsatisfiable());
    }

    #[test]
    fn test_builders_append_in_order() {
        let a = Matcher::point(Domain::Time, "10:00").unwrap();
        let b = Matcher::point(Domain::Time, "11:00").unwrap();
        let rules = RuleSet::lenient().prefer(a.clone()).prefer(b.clone());
        assert_eq!(rules.prefer, vec![a, b]);
        assert!(rules.ignore.is_empty());
    }

    #[test]
    fn test_axis_domains() {
        let window = YearWindow::around(2023);
        assert_eq!(Axis::Employee.domain(window), Domain::Name);
        assert_eq!(Axis::Day.domain(window), Domain::Date(window));
        assert_eq!(Axis::Time.domain(window), Domain::Time);
    }
}
