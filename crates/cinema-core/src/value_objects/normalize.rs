//! Identity channel normalization
//!
//! Every identity channel value passes through here before it is compared
//! or persisted. Blank values collapse to `None` so "absent" has exactly one
//! representation.

/// Trim a free-text identity value; blank becomes `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Trim and lower-case an email; blank becomes `None`.
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    normalize_text(value).map(|v| v.to_lowercase())
}
