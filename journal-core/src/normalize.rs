//! Numeric input normalization for user-supplied form fields.
//!
//! Form inputs arrive as strings. `normalize` turns them into `Some(f64)` or
//! `None`; `None` means "value absent", never "invalid input". Callers that
//! need a value for a transition report `MissingRequiredField` themselves.

/// Parse a raw numeric field.
///
/// Trims surrounding whitespace. Returns `None` for empty input, unparseable
/// input, and anything that parses to a non-finite value (`inf`, `NaN`).
pub fn normalize(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize an optional raw field (absent input stays absent).
pub fn normalize_opt(raw: Option<&str>) -> Option<f64> {
    raw.and_then(normalize)
}
