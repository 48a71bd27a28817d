//! Heuristic anchor search inside unminified client scripts.
//!
//! Minified class names change between Steam builds, but well-known public
//! method names tied to user-facing behavior tend to survive. So instead of
//! anchoring on a class name, line number, or byte offset, we find a known
//! method signature and walk backward to the nearest enclosing constructor.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A method on the class we want to expose. Structural landmark assumed
    /// to be more stable across Steam updates than the minified class name.
    static ref METHOD_RE: Regex = Regex::new(r"OpenQuickAccessMenu\(.*\) \{").unwrap();

    /// Generic class constructor opening.
    static ref CONSTRUCTOR_RE: Regex = Regex::new(r"constructor\(.*\) \{").unwrap();
}

/// Find the zero-based line index of the constructor of the class containing
/// the known method signature.
///
/// Two phases: scan forward for the first method match, then scan backward
/// from it for the nearest constructor line. `None` (either phase failing)
/// is a valid, non-fatal outcome — the caller degrades to a bootstrap-only
/// patch.
pub(crate) fn find_constructor(lines: &[String]) -> Option<usize> {
    let method_idx = lines.iter().position(|line| METHOD_RE.is_match(line))?;

    (0..=method_idx)
        .rev()
        .find(|&i| CONSTRUCTOR_RE.is_match(&lines[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_constructor_above_method() {
        let lines = buf(&[
            "class Foo {",
            "  constructor(a) {",
            "    this.a = a;",
            "  }",
            "  OpenQuickAccessMenu(e) {",
            "    return e;",
            "  }",
            "}",
        ]);
        assert_eq!(find_constructor(&lines), Some(1));
    }

    #[test]
    fn returns_nearest_preceding_constructor_not_the_first() {
        let lines = buf(&[
            "constructor(x) {",
            "}",
            "class Bar {",
            "  constructor(a, b) {",
            "  }",
            "  OpenQuickAccessMenu(e) {",
            "}",
        ]);
        assert_eq!(find_constructor(&lines), Some(3));
    }

    #[test]
    fn no_method_match_is_none() {
        let lines = buf(&["class Foo {", "  constructor(a) {", "  }", "}"]);
        assert_eq!(find_constructor(&lines), None);
    }

    #[test]
    fn constructor_only_below_method_is_none() {
        let lines = buf(&[
            "  OpenQuickAccessMenu(e) {",
            "  }",
            "  constructor(a) {",
            "  }",
        ]);
        assert_eq!(find_constructor(&lines), None);
    }

    #[test]
    fn empty_buffer_is_none() {
        assert_eq!(find_constructor(&[]), None);
    }

    #[test]
    fn method_with_multiple_args_matches() {
        let lines = buf(&[
            "  constructor(e, t, n) {",
            "  OpenQuickAccessMenu(e, t) {",
        ]);
        assert_eq!(find_constructor(&lines), Some(0));
    }
}
