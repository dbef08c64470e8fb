//! Scope parsing and comparison.
//!
//! Scopes travel as a single space-delimited string and are handled as an
//! ordered list of tokens. Order is kept so error messages list offending
//! scopes the way the caller sent them.

/// Splits a scope string on whitespace, dropping empty tokens.
#[must_use]
pub fn parse_scope(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(String::from).collect()
}

/// Returns the required scopes missing from `granted`, in required order.
#[must_use]
pub fn missing_scopes<'a>(required: &'a [String], granted: &[String]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|scope| !granted.contains(*scope))
        .map(String::as_str)
        .collect()
}

/// Describes missing scopes for an `invalid_request` error.
///
/// Uses "is" for a single scope and "are" for several.
#[must_use]
pub fn describe_missing(missing: &[&str]) -> String {
    let verb = if missing.len() > 1 { "are" } else { "is" };
    format!(
        "Required scope for this operation {} \"{}\"",
        verb,
        missing.join(",")
    )
}
