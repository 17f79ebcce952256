//! Small string helpers.

/// Removes backslashes and double-quotes from strings (label selectors
/// arrive shell-escaped from some callers).
#[must_use]
pub fn unescape(s: &str) -> String {
    s.replace(['\\', '"'], "")
}
