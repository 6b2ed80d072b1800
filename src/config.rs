//! Configuration for layout analysis and Markdown rendering.
//!
//! Every knob has a default tuned for the Intel instruction-set reference
//! family. Other document families can be supported by loading a different
//! heading lexicon and repair table from JSON rather than editing code.

use crate::converters::section::SectionKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How table clusters grow from a seed vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// One forward scan over the verticals. Order dependent; this is the
    /// compatible behavior.
    #[default]
    SinglePass,
    /// Rescan until no vertical is added. Order independent.
    FixedPoint,
}

/// What the renderer does with image regions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePolicy {
    /// Emit nothing.
    #[default]
    Skip,
    /// Emit a fixed line of text.
    Placeholder(String),
    /// Fail with `UnsupportedRegionKind`.
    Reject,
}

/// Geometric tolerances, in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Merge distance for verticals and slack on vertical coverage checks
    pub vertical: f64,
    /// Merge distance for horizontals and slack on horizontal coverage checks
    pub horizontal: f64,
    /// Slack on both edges when testing vertical span overlap while clustering
    pub overlap: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            vertical: 1.0,
            horizontal: 8.0,
            overlap: 0.7,
        }
    }
}

/// Height thresholds used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Runs taller than this may be instruction headings
    pub heading_height: f64,
    /// Baseline gap that starts a new paragraph
    pub paragraph_break: f64,
    /// Runs shorter than this are footer candidates
    pub footer_height: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heading_height: 14.5,
            paragraph_break: 15.0,
            footer_height: 10.0,
        }
    }
}

/// Indentation of pseudo-code lines, derived from their left edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// x0 below which a line is not indented
    pub offset: f64,
    /// Width of one indentation level
    pub step: f64,
    /// Deepest indentation level
    pub levels: usize,
    /// Text emitted per level
    pub unit: String,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            offset: 47.0,
            step: 18.0,
            levels: 7,
            unit: "    ".to_string(),
        }
    }
}

impl IndentConfig {
    /// Indentation prefix for a line starting at `x0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::config::IndentConfig;
    ///
    /// let indent = IndentConfig::default();
    /// assert_eq!(indent.indent_for(40.0), "");
    /// assert_eq!(indent.indent_for(50.0), "    ");
    /// assert_eq!(indent.indent_for(500.0).len(), 4 * 7);
    /// ```
    pub fn indent_for(&self, x0: f64) -> String {
        let level = (0..self.levels)
            .find(|&k| x0 < self.offset + k as f64 * self.step)
            .unwrap_or(self.levels);
        self.unit.repeat(level)
    }
}

/// One entry of the heading lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRule {
    /// Exact heading text
    pub literal: String,
    /// Section entered after the heading
    pub section: SectionKind,
}

impl HeadingRule {
    /// Create a heading rule.
    pub fn new(literal: impl Into<String>, section: SectionKind) -> Self {
        Self {
            literal: literal.into(),
            section,
        }
    }
}

/// A literal find/replace pair applied to assembled documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Text to find
    pub find: String,
    /// Replacement text
    pub replace: String,
}

impl Replacement {
    /// Create a replacement.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Running headers and footers to drop from paragraph regions.
///
/// Patterns are regular expressions matched anywhere in the raw run text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnitureConfig {
    /// Skipped while no run of the region has been rendered yet
    pub leading: Vec<String>,
    /// Skipped when the run is shorter than the footer height
    pub footer: Vec<String>,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            leading: vec![
                "INSTRUCTION SET REFERENCE, ".to_string(),
                "SAFER MODE EXTENSIONS REFERENCE".to_string(),
            ],
            footer: vec![r"Vol\. 2".to_string(), r"Ref\. ".to_string(), "^5-".to_string()],
        }
    }
}

/// Complete conversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Geometric tolerances
    pub tolerances: Tolerances,
    /// Renderer height thresholds
    pub thresholds: Thresholds,
    /// Pseudo-code indentation
    pub indent: IndentConfig,
    /// Ordered heading lexicon
    pub headings: Vec<HeadingRule>,
    /// Ordered repair table applied to each assembled document
    pub repairs: Vec<Replacement>,
    /// Page furniture patterns
    pub furniture: FurnitureConfig,
    /// Font name suffix of the typeface used for headings
    pub heading_font_suffix: String,
    /// Characters that split an instruction heading into key and description
    pub title_dashes: Vec<char>,
    /// First-cell text that marks an opcode table
    pub opcode_table_token: String,
    /// Code block language for the Operation section
    pub operation_language: String,
    /// Code block language for the intrinsics section
    pub intrinsics_language: String,
    /// Symbol-font glyph rewritten to `←` in pseudo-code
    pub arrow_glyph: char,
    /// Source label in the provenance footer
    pub source_label: String,
    /// Output file extension
    pub file_extension: String,
    /// File stem used for a document with no instruction key
    pub untitled_name: String,
    /// Table clustering mode
    pub cluster_mode: ClusterMode,
    /// Image region handling
    pub image_policy: ImagePolicy,
    /// Rule segments with a shorter cross-axis length are dropped as noise
    pub min_rule_length: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionConfig {
    /// Create a configuration with defaults for the Intel reference manuals.
    pub fn new() -> Self {
        Self {
            tolerances: Tolerances::default(),
            thresholds: Thresholds::default(),
            indent: IndentConfig::default(),
            headings: default_headings(),
            repairs: default_repairs(),
            furniture: FurnitureConfig::default(),
            heading_font_suffix: "NeoSansIntelMedium".to_string(),
            title_dashes: vec!['\u{2014}', '\u{2013}'],
            opcode_table_token: "Opcode".to_string(),
            operation_language: "java".to_string(),
            intrinsics_language: "c".to_string(),
            arrow_glyph: '\u{F0AC}',
            source_label: "Intel® Architecture Instruction Set Extensions and Future Features \
                           Programming Reference (December 2020)"
                .to_string(),
            file_extension: "md".to_string(),
            untitled_name: "untitled".to_string(),
            cluster_mode: ClusterMode::SinglePass,
            image_policy: ImagePolicy::Skip,
            min_rule_length: 0.0,
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.tolerances;
        if t.vertical < 0.0 || t.horizontal < 0.0 || t.overlap < 0.0 {
            return Err(Error::InvalidConfig("tolerances must be non-negative".to_string()));
        }
        if self.indent.step <= 0.0 {
            return Err(Error::InvalidConfig("indent step must be positive".to_string()));
        }
        if self.title_dashes.is_empty() {
            return Err(Error::InvalidConfig("at least one title dash is required".to_string()));
        }
        if self.file_extension.is_empty() {
            return Err(Error::InvalidConfig("file extension must not be empty".to_string()));
        }
        Ok(())
    }

    /// Set the table clustering mode.
    pub fn with_cluster_mode(mut self, mode: ClusterMode) -> Self {
        self.cluster_mode = mode;
        self
    }

    /// Set the image policy.
    pub fn with_image_policy(mut self, policy: ImagePolicy) -> Self {
        self.image_policy = policy;
        self
    }

    /// Set the provenance source label.
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    /// Replace the heading lexicon.
    pub fn with_headings(mut self, headings: Vec<HeadingRule>) -> Self {
        self.headings = headings;
        self
    }

    /// Replace the repair table.
    pub fn with_repairs(mut self, repairs: Vec<Replacement>) -> Self {
        self.repairs = repairs;
        self
    }

    /// Replace the page furniture patterns.
    pub fn with_furniture(mut self, furniture: FurnitureConfig) -> Self {
        self.furniture = furniture;
        self
    }

    /// Set the minimum rule length.
    pub fn with_min_rule_length(mut self, length: f64) -> Self {
        self.min_rule_length = length;
        self
    }
}

/// Heading lexicon of the Intel instruction-set reference.
pub fn default_headings() -> Vec<HeadingRule> {
    use SectionKind::*;

    let mut rules = vec![
        HeadingRule::new("Description", Description),
        HeadingRule::new("IA-32 Architecture Compatibility", Description),
        HeadingRule::new("Instruction Operand Encoding", Encoding),
        HeadingRule::new("Operation", Operation),
        HeadingRule::new("Flags Affected", Flags),
        HeadingRule::new("FPU Flags Affected", Flags),
        HeadingRule::new("Intel C/C++ Compiler Intrinsic Equivalent", Intrinsics),
        HeadingRule::new("C/C++ Compiler Intrinsic Equivalent", Intrinsics),
    ];
    rules.extend(
        [
            "Other Exceptions",
            "Compatibility Mode Exceptions",
            "64-Bit Mode Exceptions",
            "Exceptions (All Operating Modes)",
            "Floating-Point Exceptions",
            "Other Mode Exceptions",
            "Virtual-8086 Mode Exceptions",
            "SIMD Floating-Point Exceptions",
            "SIMD Floating Point Exceptions",
            "Protected Mode Exceptions",
            "Exceptions",
            "Numeric Exceptions",
            "Virtual 8086 Mode Exceptions",
            "Real-Address Mode Exceptions",
        ]
        .into_iter()
        .map(|literal| HeadingRule::new(literal, Exceptions)),
    );
    rules
}

/// Bullet and line-wrap repairs for the Intel reference manuals.
pub fn default_repairs() -> Vec<Replacement> {
    [
        ("•\n\n", "\n * "),
        ("•\n", "\n * "),
        ("•", "\n * "),
        ("addi-\ntional", "additional\n"),
        ("combina-\ntion ", "combination\n"),
        ("compar-\nison)", "comparison)\n"),
        ("compar-\nisons", "comparisons\n"),
        ("corre-\nsponding", "corresponding\n"),
        ("documenta-\ntion", "documentation\n"),
        ("destina-\ntion", "destination\n"),
        ("desti-\nnation", "destination\n"),
        ("infor-\nmation", "information\n"),
        ("instruc-\ntions", "instructions\n"),
        ("instruc-\ntion", "instruction\n"),
        ("regis-\nters", "registers\n"),
        ("regis-\nter", "register\n"),
        ("oper-\nands", "operands\n"),
        ("oper-\nations", "operations\n"),
        ("preci-\nsion", "precision\n"),
        ("loca-\ntions", "locations\n"),
        ("loca-\ntion", "location\n"),
        ("speci-\nfied", "specified\n"),
        ("64-\nbit", "64-bit\n"),
        ("unpre-\ndictable", "\nunpredictable"),
        ("single-\nprecision", "\nsingle-precision"),
        ("priv-\nilege", "\nprivilege"),
        ("single- precision", "single-precision"),
        ("no- operand", "no-operand"),
        ("REP/REPE/REPZ /REPNE/REPNZ", "REP/REPE/REPZ/REPNE/REPNZ"),
        ("general- purpose", "general-purpose"),
        ("general- protection", "general-protection"),
        ("excep- tion", "exception"),
    ]
    .into_iter()
    .map(|(find, replace)| Replacement::new(find, replace))
    .collect()
}
