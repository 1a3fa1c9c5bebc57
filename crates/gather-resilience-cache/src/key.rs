//! Cache key normalization.

/// Normalizes a raw name into a cache key slug.
///
/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single hyphen, with no leading or trailing hyphen.
/// Normalization is idempotent, so case, whitespace, and punctuation
/// variants of the same name ("Acme, Inc." / "acme inc") land on the same
/// key.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut gap = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !key.is_empty() {
                key.push('-');
            }
            gap = false;
            key.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    key
}
