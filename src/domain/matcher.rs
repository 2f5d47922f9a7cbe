// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildcard matching of parameter names.
//!
//! Patterns are literal parameter names in which `*` matches any (possibly
//! empty) run of characters, including `.` and brackets. A pattern without a
//! wildcard matches only the identical name.

/// Returns `true` if `name` matches the wildcard `pattern`.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::matcher::matches_pattern;
///
/// assert!(matches_pattern("file*", "file1"));
/// assert!(matches_pattern("*.path", "storage.cache.path"));
/// assert!(matches_pattern("lst*", "lst[2]"));
/// assert!(!matches_pattern("file*", "profile"));
/// ```
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` and the name position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            n = tried + 1;
            backtrack = Some((star, tried + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Returns `true` if `name` matches any of `patterns`.
pub fn matches_any<S: AsRef<str>>(patterns: &[S], name: &str) -> bool {
    patterns.iter().any(|p| matches_pattern(p.as_ref(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern() {
        assert!(matches_pattern("a.b", "a.b"));
        assert!(!matches_pattern("a.b", "a.bc"));
        assert!(!matches_pattern("a.b", "a"));
    }

    #[test]
    fn test_star_matches_empty_and_dots() {
        assert!(matches_pattern("*", ""));
        assert!(matches_pattern("*", "a.b[0].c"));
        assert!(matches_pattern("a*b", "ab"));
        assert!(matches_pattern("a*b", "a.x.y.b"));
    }

    #[test]
    fn test_multiple_stars_backtrack() {
        assert!(matches_pattern("*path*", "dirs.pathways.x"));
        assert!(matches_pattern("*.file*", "a.b.file_1"));
        assert!(!matches_pattern("*.file*", "a.b.profile"));
        assert!(matches_pattern("a*a*a", "aaa"));
        assert!(!matches_pattern("a*a*a", "aa"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["file*", "*.dir"];
        assert!(matches_any(&patterns, "file2"));
        assert!(matches_any(&patterns, "out.dir"));
        assert!(!matches_any(&patterns, "other"));
        assert!(!matches_any::<&str>(&[], "file"));
    }
}
