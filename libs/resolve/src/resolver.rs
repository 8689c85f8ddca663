//! Rule-based candidate selection.

use tracing::trace;

use crate::{Direction, RuleSet};

/// Picks at most one candidate from a list according to a [`RuleSet`].
///
/// The resolver is generic over the candidate type: callers supply an accessor
/// for the raw value the matchers compare, and an extra predicate for
/// exclusions that do not depend on that value.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    rules: &'r RuleSet,
    skip_list: &'r [String],
}

struct Candidate<'a, T> {
    item: &'a T,
    value: &'a str,
    ignored: bool,
}

impl<'r> Resolver<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            skip_list: &[],
        }
    }

    /// Raw values already tried in this attempt. Always excluded.
    #[must_use]
    pub fn with_skip_list(mut self, skip_list: &'r [String]) -> Self {
        self.skip_list = skip_list;
        self
    }

    /// Selects the best candidate, if any.
    ///
    /// Each `prefer` matcher is tried in declared order, scanning candidates
    /// in the matcher's direction; the first hit wins. Without a hit, a
    /// lenient rule set falls back to the first candidate not ignored.
    pub fn pick<'a, T, V, I>(&self, items: &'a [T], value_of: V, ignore_when: I) -> Option<&'a T>
    where
        V: Fn(&'a T) -> &'a str,
        I: Fn(&T) -> bool,
    {
        if self.rules.is_unsatisfiable() {
            return None;
        }

        let candidates: Vec<Candidate<'a, T>> = items
            .iter()
            .map(|item| {
                let value = value_of(item);
                let ignored = self.skip_list.iter().any(|s| s == value)
                    || ignore_when(item)
                    || self.rules.ignore.iter().any(|m| m.matches(value));
                Candidate {
                    item,
                    value,
                    ignored,
                }
            })
            .collect();

        for matcher in &self.rules.prefer {
            let is_hit = |c: &&Candidate<'a, T>| !c.ignored && matcher.matches(c.value);
            let hit = match matcher.direction() {
                Direction::Asc => candidates.iter().find(is_hit),
                Direction::Desc => candidates.iter().rev().find(is_hit),
            };
            if let Some(hit) = hit {
                trace!(value = hit.value, matcher = %matcher, "Preferred candidate selected");
                return Some(hit.item);
            }
        }

        if self.rules.strict {
            return None;
        }

        candidates.iter().find(|c| !c.ignored).map(|c| c.item)
    }

    /// [`pick`](Self::pick) without an extra exclusion predicate.
    pub fn pick_by<'a, T, V>(&self, items: &'a [T], value_of: V) -> Option<&'a T>
    where
        V: Fn(&'a T) -> &'a str,
    {
        self.pick(items, value_of, |_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Matcher, YearWindow};
    use proptest::prelude::*;

    const WINDOW: YearWindow = YearWindow::around(2023);

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn time_span(from: &str, to: &str) -> Matcher {
        Matcher::span(Domain::Time, from, to).unwrap()
    }

    #[test]
    fn test_lenient_empty_prefer_returns_first() {
        let rules = RuleSet::lenient();
        let items = strings(&["10:00", "12:00"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("10:00"));
    }

    #[test]
    fn test_lenient_skips_ignored_on_fallback() {
        let day = Matcher::point(Domain::Date(WINDOW), "6.7.2023").unwrap();
        let rules = RuleSet::lenient().ignore(day);
        let items = strings(&["06.07.2023", "07.07.2023"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("07.07.2023"));
    }

    #[test]
    fn test_strict_without_hit_returns_none() {
        let rules = RuleSet::strict(vec![time_span("9:00", "11:00")]);
        let items = strings(&["12:00", "18:00"]);
        assert!(Resolver::new(&rules).pick_by(&items, String::as_str).is_none());
    }

    #[test]
    fn test_desc_matcher_returns_last_match() {
        let rules = RuleSet::strict(vec![
            time_span("7:00", "8:00"),
            time_span("9:00", "20:00").desc(),
        ]);
        let items = strings(&["10:00", "12:00", "18:00"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("18:00"));
    }

    #[test]
    fn test_first_matcher_with_hit_wins() {
        let rules = RuleSet::lenient()
            .prefer(time_span("17:00", "19:00"))
            .prefer(time_span("9:00", "11:00"));
        let items = strings(&["10:00", "18:00"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("18:00"));
    }

    #[test]
    fn test_preferred_but_ignored_is_not_selected() {
        let rules = RuleSet::strict(vec![time_span("9:00", "11:00")])
            .ignore(Matcher::point(Domain::Time, "10:00").unwrap());
        let items = strings(&["10:00", "10:30"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("10:30"));
    }

    #[test]
    fn test_skip_list_excluded() {
        let rules = RuleSet::lenient();
        let skip = strings(&["Smith"]);
        let items = strings(&["Smith", "Jones"]);
        let picked = Resolver::new(&rules)
            .with_skip_list(&skip)
            .pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("Jones"));
    }

    #[test]
    fn test_ignore_when_predicate() {
        struct Day {
            value: &'static str,
            online: bool,
        }
        let rules = RuleSet::lenient();
        let days = [
            Day {
                value: "06.07.2023",
                online: false,
            },
            Day {
                value: "08.07.2023",
                online: true,
            },
        ];
        let picked = Resolver::new(&rules).pick(&days, |d| d.value, |d| !d.online);
        assert_eq!(picked.map(|d| d.value), Some("08.07.2023"));
    }

    #[test]
    fn test_malformed_value_never_preferred() {
        let rules = RuleSet::strict(vec![time_span("9:00", "11:00")]);
        let items = strings(&["later", "10:00"]);
        let picked = Resolver::new(&rules).pick_by(&items, String::as_str);
        assert_eq!(picked.map(String::as_str), Some("10:00"));
    }

    proptest! {
        #[test]
        fn prop_strict_empty_prefer_never_picks(values in prop::collection::vec("[0-9]{1,2}:[0-9]{2}", 1..10)) {
            let rules = RuleSet::strict(Vec::new());
            prop_assert!(Resolver::new(&rules).pick_by(&values, String::as_str).is_none());
        }

        #[test]
        fn prop_lenient_returns_first_not_skipped(
            values in prop::collection::vec("[a-z]{1,3}", 1..10),
            skip_first in any::<bool>(),
        ) {
            let rules = RuleSet::lenient();
            let skip = if skip_first { vec![values[0].clone()] } else { Vec::new() };
            let expected = values.iter().find(|v| !skip.contains(*v));
            let picked = Resolver::new(&rules).with_skip_list(&skip).pick_by(&values, String::as_str);
            prop_assert_eq!(picked, expected);
        }

        #[test]
        fn prop_skip_list_never_returned(values in prop::collection::vec("[a-c]", 1..8)) {
            let rules = RuleSet::lenient().prefer(Matcher::point(Domain::Name, "a").unwrap());
            let skip = vec!["a".to_string()];
            let picked = Resolver::new(&rules).with_skip_list(&skip).pick_by(&values, String::as_str);
            prop_assert!(picked.map_or(true, |v| v != "a"));
        }
    }
}
