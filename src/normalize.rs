//! Label normalization and numeric coercion.
//!
//! Operation labels, skill-matrix headers and machine types arrive as free
//! text typed into spreadsheets. Everything is compared in a canonical form:
//! upper case, control whitespace replaced by spaces, runs of spaces
//! collapsed, ends trimmed.

/// Canonicalizes a free-text label.
///
/// `\n`, `\r` and `\t` become spaces, repeated spaces collapse to one,
/// leading/trailing whitespace is trimmed and the result is upper-cased.
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text
        .split(|c: char| c == ' ' || c == '\n' || c == '\r' || c == '\t')
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    // Upper-casing can expand characters (e.g. 'ß' → "SS") but never
    // introduces whitespace, so trimming once more keeps idempotence.
    out.to_uppercase().trim().to_string()
}

/// Normalizes an optional label; `None` maps to the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Parses a numeric value leniently.
///
/// Accepts surrounding whitespace and a trailing `%`. Returns `None` for
/// blank or non-numeric text and for non-finite results.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
