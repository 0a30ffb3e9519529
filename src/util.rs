//! Shared utility helpers.

/// Case-insensitive substring search without allocating an uppercase copy.
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle_bytes = needle.as_bytes();
    let haystack_bytes = haystack.as_bytes();
    if needle_bytes.len() > haystack_bytes.len() {
        return false;
    }
    haystack_bytes
        .windows(needle_bytes.len())
        .any(|window| window.eq_ignore_ascii_case(needle_bytes))
}

/// Canonical spelling of a catalog keyword: trimmed, uppercase, `_` and runs of
/// whitespace folded to a single space (`no_action` and `NO  ACTION` both become
/// `NO ACTION`).
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}
