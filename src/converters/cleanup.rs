//! Post-hoc text repairs for assembled documents.
//!
//! Line-wrapped PDFs leave hyphenation and bullet artifacts behind that are
//! easiest to fix on the final text with a literal replacement table.

use crate::config::Replacement;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters with meaning in Markdown body text
    static ref RE_MARKDOWN_SPECIAL: Regex = Regex::new(r"[#*]").unwrap();
}

/// Apply each replacement once, in table order.
///
/// # Examples
///
/// ```
/// use docpile::config::Replacement;
/// use docpile::converters::cleanup::apply_repairs;
///
/// let table = vec![Replacement::new("regis-\nter", "register\n")];
/// assert_eq!(apply_repairs("the regis-\nter file", &table), "the register\n file");
/// ```
pub fn apply_repairs(text: &str, repairs: &[Replacement]) -> String {
    repairs
        .iter()
        .filter(|r| !r.find.is_empty())
        .fold(text.to_string(), |acc, r| acc.replace(&r.find, &r.replace))
}

/// Backslash-escape `#` and `*`.
///
/// # Examples
///
/// ```
/// use docpile::converters::cleanup::escape_markdown;
///
/// assert_eq!(escape_markdown("#GP(0) if *p"), r"\#GP(0) if \*p");
/// ```
pub fn escape_markdown(text: &str) -> String {
    RE_MARKDOWN_SPECIAL.replace_all(text, r"\$0").to_string()
}
