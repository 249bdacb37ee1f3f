//! Case-insensitive substring search terms for `ILIKE`.

/// Build an `ILIKE` pattern matching `term` as a literal substring.
///
/// `%` and `_` in the term are escaped so they match themselves, using
/// PostgreSQL's default `\` escape character.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
