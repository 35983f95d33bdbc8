//! Text normalization for name-like lookup keys.
//!
//! Two styles exist. Body fields (JSON payloads) are trimmed and lower-cased.
//! Path parameters and query filters are "slug style": hyphens stand in for
//! spaces, so `new-york` and `New York` resolve to the same key.

/// Normalizes a name taken from a request body: trim and lower-case.
pub fn normalize_name(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Normalizes a slug-style identifier: hyphens become spaces, then trim and
/// lower-case.
pub fn normalize_slug(input: &str) -> String {
    input.replace('-', " ").trim().to_lowercase()
}

/// Returns the lookup keys to try, in order, for a path identifier.
///
/// The slug form comes first. When the identifier contains hyphens the body
/// form is tried next, so stored names that really contain a hyphen
/// (`blink-182`) stay addressable.
pub fn slug_candidates(input: &str) -> Vec<String> {
    let slug = normalize_slug(input);
    let plain = normalize_name(input);

    if slug == plain || plain.is_empty() {
        vec![slug]
    } else {
        vec![slug, plain]
    }
}

/// Builds a `LIKE` pattern matching any value containing the slug-normalized
/// input. `%`, `_` and `\` are escaped with `\`.
pub fn like_pattern(input: &str) -> String {
    let needle = normalize_slug(input);
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match using the slug normalization of `needle`.
///
/// Mirrors [`like_pattern`] for stores that filter in memory.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&normalize_slug(needle))
}
