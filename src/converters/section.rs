//! Document sections and heading lookup.

use crate::config::HeadingRule;
use serde::{Deserialize, Serialize};

/// Section of an instruction page; selects how body text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Lines right after the instruction heading
    Title,
    /// Prose
    Description,
    /// Operand encoding (rendered as a table; loose text is dropped)
    Encoding,
    /// Pseudo-code
    Operation,
    /// C intrinsic prototypes
    Intrinsics,
    /// Affected flags
    Flags,
    /// Exception lists
    Exceptions,
}

impl SectionKind {
    /// Whether entering this section closes an open code block.
    pub fn closes_code(self) -> bool {
        matches!(
            self,
            SectionKind::Flags | SectionKind::Exceptions | SectionKind::Intrinsics
        )
    }
}

/// Section entered by a heading, if `content` is one.
pub fn lookup_heading(headings: &[HeadingRule], content: &str) -> Option<SectionKind> {
    headings
        .iter()
        .find(|rule| rule.literal == content)
        .map(|rule| rule.section)
}
