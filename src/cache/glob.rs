//! Glob Matching Module
//!
//! Minimal wildcard matcher for pattern invalidation. Only `*` has
//! special meaning (any run of characters, including empty); everything
//! else is literal. Matching is case-sensitive and anchored to the full
//! key: a pattern must cover the entire key, not a substring.

// == Glob Match ==
/// Matches `key` against `pattern`, `*` matching any run of characters.
///
/// Supports any number of wildcards. `?` and character classes carry no
/// special meaning and match themselves literally.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p = pattern.as_bytes();
    let k = key.as_bytes();

    // Two-pointer scan with backtracking to the most recent `*`.
    let mut pi = 0;
    let mut ki = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ki < k.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = ki;
            pi += 1;
        } else if pi < p.len() && p[pi] == k[ki] {
            pi += 1;
            ki += 1;
        } else if let Some(s) = star {
            // Widen the last `*` by one character and retry
            pi = s + 1;
            mark += 1;
            ki = mark;
        } else {
            return false;
        }
    }

    // Only trailing wildcards may remain
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
