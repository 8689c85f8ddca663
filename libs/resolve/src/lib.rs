//! Candidate resolution primitives.
//!
//! This library decides which of a list of upstream values (employees, open
//! days, open times) best satisfies a declarative rule set. Key concepts:
//!
//! - **Canonical value**: the normalized form a raw value is compared in
//!   (`YYYY.MM.DD`, `HH:MM`, or a folded lowercase name).
//! - **Matcher**: a predicate over one canonical value, optionally carrying
//!   the direction in which candidates are scanned.
//! - **Rule set**: strict flag plus ordered `prefer` and `ignore` matchers.
//! - **Resolver**: applies a rule set and a skip list to a candidate list.
//!
//! # Invariants
//!
//! - Invalid literals are rejected when a matcher is built, never when matching
//! - Matching never fails; malformed upstream values simply do not match
//! - Resolution is deterministic given the same inputs and performs no I/O

mod canonical;
mod error;
mod fingerprint;
mod matcher;
mod resolver;
mod rules;

pub use canonical::{canonical_date, canonical_name, canonical_time, Domain, YearWindow};
pub use error::ResolveError;
pub use fingerprint::{normalize_display, Fingerprint};
pub use matcher::{Direction, Matcher};
pub use resolver::Resolver;
pub use rules::{Axis, RuleSet};
