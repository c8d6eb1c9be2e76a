//! Normalized search key for game titles
//!
//! Two titles differing only by case, punctuation, or spacing collide to
//! the same key, which is what deduplicates games at `add` time.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("static pattern is valid"));

/// Normalize a display title into its search key: lowercase, with every
/// run of non-word characters collapsed to a single underscore.
pub fn normalize_title(title: &str) -> String {
    NON_WORD.replace_all(&title.to_lowercase(), "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_underscores() {
        assert_eq!(normalize_title("Portal 2"), "portal_2");
        assert_eq!(normalize_title("HALF-LIFE: Alyx"), "half_life_alyx");
    }

    #[test]
    fn test_punctuation_collides() {
        assert_eq!(
            normalize_title("S.T.A.L.K.E.R. 2"),
            normalize_title("s t a l k e r 2"),
        );
        assert_eq!(normalize_title("Dishonored(R)"), "dishonored_r_");
    }

    #[test]
    fn test_runs_collapse_to_one_underscore() {
        assert_eq!(normalize_title("a -- b"), "a_b");
    }

    #[test]
    fn test_idempotent() {
        for title in ["Portal 2", "  spaced  out  ", "already_normal", "Ökonomie!"] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once);
        }
    }
}
