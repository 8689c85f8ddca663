//! Display-name fingerprints.

use serde::{Deserialize, Serialize};

/// 32-bit hash of a normalized display string.
///
/// Used to compare names that differ only in punctuation, case or `ё`/`е`
/// spelling. Not collision resistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(i32);

impl Fingerprint {
    /// Fingerprint of a display string.
    pub fn of(display: &str) -> Self {
        let hash = normalize_display(display)
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
        Self(hash)
    }

    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keep alphanumerics, lowercase, fold `ё` into `е`.
pub fn normalize_display(display: &str) -> String {
    display
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}
