//! Shared regular expression construction.

use regex::Regex;

/// Compile a pattern that is fixed at build time.
///
/// # Panics
///
/// Panics with `context` if the pattern is invalid, which only happens when
/// the pattern literal itself is wrong.
pub(crate) fn compile_regex(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("{context}: {error}"))
}
