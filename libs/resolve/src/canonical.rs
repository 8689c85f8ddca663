//! Canonical forms for the values rules compare.
//!
//! Canonical dates (`YYYY.MM.DD`) and times (`HH:MM`) sort lexicographically
//! in chronological order, so spans compare plain strings.

use chrono::Datelike;

use crate::ResolveError;

/// Years accepted in date literals and upstream dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    min: i32,
    max: i32,
}

impl YearWindow {
    /// Window of one year either side of `reference`.
    pub const fn around(reference: i32) -> Self {
        Self {
            min: reference - 1,
            max: reference + 1,
        }
    }

    /// Window around the current local year.
    pub fn current() -> Self {
        Self::around(chrono::Local::now().year())
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::current()
    }
}

/// Canonicalization family of a matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Name,
    Date(YearWindow),
    Time,
}

impl Domain {
    /// Date domain around the current local year.
    pub fn date() -> Self {
        Self::Date(YearWindow::current())
    }

    pub fn canonicalize(&self, raw: &str) -> Result<String, ResolveError> {
        match self {
            Self::Name => Ok(canonical_name(raw)),
            Self::Date(window) => canonical_date(raw, *window),
            Self::Time => canonical_time(raw),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Date(_) => "date",
            Self::Time => "time",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalize `D.M.YYYY` or `YYYY.M.D` into `YYYY.MM.DD`.
pub fn canonical_date(raw: &str, window: YearWindow) -> Result<String, ResolveError> {
    let invalid = || ResolveError::InvalidSyntax {
        kind: "date",
        value: raw.to_string(),
    };

    let parts: Vec<&str> = raw.trim().split('.').collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(invalid());
    };

    let (year, month, day) = if a.len() == 4 && is_short(b) && is_short(c) {
        (*a, *b, *c)
    } else if is_short(a) && is_short(b) && c.len() == 4 {
        (*c, *b, *a)
    } else {
        return Err(invalid());
    };

    if !all_digits(year) {
        return Err(invalid());
    }

    let year = number(year);
    if !window.contains(year) {
        return Err(ResolveError::OutOfRange {
            field: "year",
            actual: year,
            min: window.min(),
            max: window.max(),
            value: raw.to_string(),
        });
    }
    let month = in_range("month", number(month), 1, 12, raw)?;
    let day = in_range("day", number(day), 1, 31, raw)?;

    Ok(format!("{year:04}.{month:02}.{day:02}"))
}

/// Canonicalize `H:M` into `HH:MM`.
pub fn canonical_time(raw: &str) -> Result<String, ResolveError> {
    let Some((hour, minute)) = raw.trim().split_once(':') else {
        return Err(ResolveError::InvalidSyntax {
            kind: "time",
            value: raw.to_string(),
        });
    };
    if !is_short(hour) || !is_short(minute) {
        return Err(ResolveError::InvalidSyntax {
            kind: "time",
            value: raw.to_string(),
        });
    }

    let hour = in_range("hour", number(hour), 0, 23, raw)?;
    let minute = in_range("minute", number(minute), 0, 59, raw)?;

    Ok(format!("{hour:02}:{minute:02}"))
}

/// Keep letters only, lowercase, fold `ё` into `е`. Never fails.
pub fn canonical_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

/// One or two ASCII digits.
fn is_short(s: &str) -> bool {
    (1..=2).contains(&s.len()) && all_digits(s)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Callers only pass strings of at most four ASCII digits.
fn number(s: &str) -> i32 {
    s.bytes().fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
}

fn in_range(
    field: &'static str,
    actual: i32,
    min: i32,
    max: i32,
    raw: &str,
) -> Result<i32, ResolveError> {
    if (min..=max).contains(&actual) {
        Ok(actual)
    } else {
        Err(ResolveError::OutOfRange {
            field,
            actual,
            min,
            max,
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const WINDOW: YearWindow = YearWindow::around(2023);

    #[rstest]
    #[case("7.7.2023", "2023.07.07")]
    #[case("07.07.2023", "2023.07.07")]
    #[case("2023.7.8", "2023.07.08")]
    #[case("2023.07.08", "2023.07.08")]
    #[case("31.12.2022", "2022.12.31")]
    #[case("1.1.2024", "2024.01.01")]
    #[case(" 8.7.2023 ", "2023.07.08")]
    fn test_canonical_date(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_date(raw, WINDOW).unwrap(), expected);
    }

    #[rstest]
    #[case("7-7-2023")]
    #[case("7.7.23")]
    #[case("123.7.2023")]
    #[case("7.7")]
    #[case("a.7.2023")]
    #[case("2023.7.8.1")]
    #[case("")]
    fn test_canonical_date_syntax_errors(#[case] raw: &str) {
        let err = canonical_date(raw, WINDOW).unwrap_err();
        assert_eq!(err.reason_code(), "invalid_syntax");
    }

    #[rstest]
    #[case("7.7.2021", "year")]
    #[case("7.7.2025", "year")]
    #[case("7.13.2023", "month")]
    #[case("7.0.2023", "month")]
    #[case("32.7.2023", "day")]
    #[case("0.7.2023", "day")]
    fn test_canonical_date_out_of_range(#[case] raw: &str, #[case] expected_field: &str) {
        match canonical_date(raw, WINDOW).unwrap_err() {
            ResolveError::OutOfRange { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[rstest]
    #[case("9:00", "09:00")]
    #[case("9:5", "09:05")]
    #[case("23:59", "23:59")]
    #[case("0:0", "00:00")]
    fn test_canonical_time(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_time(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("12")]
    #[case("123:00")]
    #[case("9.00")]
    fn test_canonical_time_rejects(#[case] raw: &str) {
        assert!(canonical_time(raw).is_err());
    }

    #[test]
    fn test_canonical_name_folds() {
        assert_eq!(canonical_name("Фёдоров Пётр-Иван 2"), "федоровпетриван");
        assert_eq!(canonical_name("Doe, John"), "doejohn");
    }

    #[test]
    fn test_year_window() {
        assert!(WINDOW.contains(2022));
        assert!(WINDOW.contains(2024));
        assert!(!WINDOW.contains(2025));
    }

    proptest! {
        #[test]
        fn prop_date_canonical_is_stable(day in 1u32..=31, month in 1u32..=12, year in 2022i32..=2024) {
            let canonical = canonical_date(&format!("{day}.{month}.{year}"), WINDOW).unwrap();
            prop_assert_eq!(&canonical, &format!("{year:04}.{month:02}.{day:02}"));
            prop_assert_eq!(canonical_date(&canonical, WINDOW).unwrap(), canonical);
        }

        #[test]
        fn prop_time_canonical_is_stable(hour in 0u32..=23, minute in 0u32..=59) {
            let canonical = canonical_time(&format!("{hour}:{minute}")).unwrap();
            prop_assert_eq!(canonical_time(&canonical).unwrap(), canonical);
        }
    }
}
