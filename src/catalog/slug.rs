//! URL-safe slug derivation
//!
//! Tutorials and categories are addressed by slugs derived from their title or name.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Derive a slug from free text.
///
/// Lowercases, strips diacritics (NFD then drop combining marks), removes anything
/// outside `[a-z0-9]`, whitespace and `-`, turns whitespace runs into a single hyphen,
/// collapses repeated hyphens and trims hyphens at both ends.
///
/// Empty input yields an empty slug; callers that persist slugs must reject that.
pub fn slugify(text: &str) -> String {
    let folded: String = text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect();

    let cleaned = DISALLOWED_RE.replace_all(&folded, "");
    let hyphenated = WHITESPACE_RE.replace_all(&cleaned, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_accents_and_punctuation() {
        assert_eq!(slugify("Développement Web!"), "developpement-web");
        assert_eq!(slugify("Base de données"), "base-de-donnees");
        assert_eq!(slugify("Design UI/UX"), "design-uiux");
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("  a   b--c "), "a-b-c");
        assert_eq!(slugify("--leading and trailing--"), "leading-and-trailing");
        assert_eq!(slugify("tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn empty_and_symbol_only_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!! ??? ***"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Node.js 20 en 10 minutes"), "nodejs-20-en-10-minutes");
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(text in "\\PC*") {
            let once = slugify(&text);
            prop_assert_eq!(slugify(&once), once);
        }

        #[test]
        fn slug_uses_restricted_alphabet(text in "\\PC*") {
            let slug = slugify(&text);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
