//! Section-state Markdown rendering of regions.
//!
//! Paragraph regions run through a small state machine driven by the heading
//! lexicon: a heading switches the section, and every other line is rendered
//! the way its section wants it (prose, pseudo-code, intrinsics, exception
//! lists). Table regions bypass the state machine and render as HTML tables
//! so that spans survive the trip into Markdown.

use crate::config::{ConversionConfig, ImagePolicy};
use crate::converters::cleanup::escape_markdown;
use crate::converters::section::{lookup_heading, SectionKind};
use crate::error::{Error, Result};
use crate::layout::primitives::TextRun;
use crate::layout::region::{Region, TableRegion};
use crate::layout::table_grid::{Cell, TableGrid};
use regex::Regex;

/// Continuation flags of the table being rendered.
///
/// A long opcode table broken across a page boundary arrives as several table
/// regions. When neighbours are continuations of the same logical table the
/// wrapper tags and the repeated header row are suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableAdjacency {
    /// The nearest earlier table of this document is an opcode table
    pub prev_is_continuation: bool,
    /// The current region is an opcode table
    pub curr_is_continuation: bool,
    /// The nearest later table of this document is an opcode table
    pub next_is_continuation: bool,
}

impl TableAdjacency {
    /// Whether this table continues the previous one.
    pub fn joins_previous(&self) -> bool {
        self.curr_is_continuation && self.prev_is_continuation
    }

    /// Whether the next table continues this one.
    pub fn joins_next(&self) -> bool {
        self.curr_is_continuation && self.next_is_continuation
    }
}

/// Rendering state carried across the regions of one logical document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    /// Section the current line is rendered in
    pub section: Option<SectionKind>,
    /// Section entered after the current line
    pub next_section: Option<SectionKind>,
    /// Whether a fenced code block is open
    pub code_mode: bool,
    /// Baseline (`y1`) of the last prose line of the current region
    pub prev_baseline: f64,
    /// Continuation flags for the next table region
    pub table_adjacency: TableAdjacency,
}

impl RenderState {
    /// Fresh state for a new document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fenced code block unless one is already open.
    pub fn open_code(&mut self, language: &str) -> String {
        if self.code_mode {
            return String::new();
        }
        self.code_mode = true;
        format!("```{}\n", language)
    }

    /// Close the open code block, if any.
    pub fn close_code(&mut self) -> &'static str {
        if !self.code_mode {
            return "";
        }
        self.code_mode = false;
        "```"
    }

    /// Close whatever is still open at the end of a document.
    pub fn finish(&mut self) -> &'static str {
        if !self.code_mode {
            return "";
        }
        self.code_mode = false;
        "```\n"
    }

    fn advance(&mut self) {
        self.section = self.next_section;
    }

    /// Paragraph separator for a line whose top is at `y1`.
    fn paragraph_break(&mut self, y1: f64, threshold: f64) -> &'static str {
        let gap = self.prev_baseline - y1;
        self.prev_baseline = y1;
        if gap > threshold {
            "\n"
        } else {
            ""
        }
    }
}

/// An instruction heading split at its dash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTitle {
    /// Instruction key, e.g. `ADD` or `CMPS/CMPSB/CMPSW`
    pub key: String,
    /// Description after the dash
    pub description: String,
}

impl InstructionTitle {
    /// Styled header line.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::converters::renderer::InstructionTitle;
    ///
    /// let title = InstructionTitle {
    ///     key: "MOVS/MOVSB".to_string(),
    ///     description: "Move Data".to_string(),
    /// };
    /// assert_eq!(title.to_markdown(), "<b>MOVS / MOVSB</b> \u{2014} Move Data\n");
    /// ```
    pub fn to_markdown(&self) -> String {
        format!("<b>{}</b> \u{2014} {}\n", self.key.replace('/', " / "), self.description)
    }
}

/// Renders regions to Markdown fragments.
#[derive(Debug)]
pub struct SectionRenderer<'c> {
    config: &'c ConversionConfig,
    leading_furniture: Vec<Regex>,
    footer_furniture: Vec<Regex>,
}

impl<'c> SectionRenderer<'c> {
    /// Create a renderer, compiling the furniture patterns of `config`.
    pub fn new(config: &'c ConversionConfig) -> Result<Self> {
        Ok(Self {
            config,
            leading_furniture: compile_patterns(&config.furniture.leading)?,
            footer_furniture: compile_patterns(&config.furniture.footer)?,
        })
    }

    /// The configuration this renderer was built with.
    pub fn config(&self) -> &'c ConversionConfig {
        self.config
    }

    /// Split `run` into an instruction title if it is a distinguished heading.
    pub fn split_title(&self, run: &TextRun) -> Option<InstructionTitle> {
        if run.height <= self.config.thresholds.heading_height
            || !run.font_id.ends_with(&self.config.heading_font_suffix)
        {
            return None;
        }
        let content = run.trimmed();
        let dash = self.config.title_dashes.iter().find(|&&d| content.contains(d))?;
        let (key, description) = content.split_once(*dash)?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(InstructionTitle {
            key: key.to_string(),
            description: description.trim().to_string(),
        })
    }

    /// Instruction title of a region: its first run that splits as one.
    pub fn instruction_key(&self, region: &Region) -> Option<InstructionTitle> {
        region.texts().iter().find_map(|t| self.split_title(t))
    }

    /// Whether `region` is a table whose first cell reads as the opcode token.
    pub fn is_opcode_table(&self, region: &Region) -> bool {
        match region {
            Region::Table(table) => {
                let grid = TableGrid::reconstruct(table, &self.config.tolerances);
                grid.first_cell()
                    .is_some_and(|cell| cell.content() == self.config.opcode_table_token)
            },
            _ => false,
        }
    }

    /// Render one region, updating `state`.
    pub fn render_region(&self, region: &Region, state: &mut RenderState) -> Result<String> {
        match region {
            Region::Paragraph(paragraph) => Ok(self.render_texts(&paragraph.texts, state)),
            Region::Table(table) => Ok(self.render_table(table, state)),
            Region::Image(image) => match &self.config.image_policy {
                ImagePolicy::Skip => {
                    log::debug!("Skipping image region at {:?}", image.image.bbox);
                    Ok(String::new())
                },
                ImagePolicy::Placeholder(text) => Ok(format!("{}\n", text)),
                ImagePolicy::Reject => Err(Error::UnsupportedRegionKind(region.kind())),
            },
        }
    }

    /// Run the section state machine over paragraph text.
    fn render_texts(&self, texts: &[TextRun], state: &mut RenderState) -> String {
        let mut ordered: Vec<&TextRun> = texts.iter().collect();
        ordered.sort_by(|a, b| {
            b.bbox
                .y1
                .total_cmp(&a.bbox.y1)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let thresholds = &self.config.thresholds;
        let mut markdown = String::new();
        let mut processed = 0usize;
        state.prev_baseline = 0.0;

        for run in ordered {
            let raw = run.content.as_str();

            if processed == 0 && self.leading_furniture.iter().any(|re| re.is_match(raw)) {
                log::debug!("Skipping running header {:?}", run.trimmed());
                continue;
            }
            if run.height < thresholds.footer_height
                && self.footer_furniture.iter().any(|re| re.is_match(raw))
            {
                log::debug!("Skipping footer {:?}", run.trimmed());
                continue;
            }

            let content = escape_markdown(raw.trim());

            if self.config.title_dashes.iter().any(|&d| content.contains(d)) {
                if run.height < thresholds.footer_height {
                    continue;
                }
                if let Some(title) = self.split_title(run) {
                    state.next_section = Some(SectionKind::Title);
                    markdown.push_str(&title.to_markdown());
                    state.advance();
                    processed += 1;
                    continue;
                }
            }

            if let Some(section) = lookup_heading(&self.config.headings, &content) {
                state.next_section = Some(section);
                if section.closes_code() {
                    markdown.push_str(state.close_code());
                }
                markdown.push_str(&format!("\n### {}\n", content));
                match section {
                    SectionKind::Operation => markdown.push('\n'),
                    SectionKind::Intrinsics => {
                        markdown.push_str(&state.open_code(&self.config.intrinsics_language))
                    },
                    _ => {},
                }
            } else {
                self.render_body(run, raw, &content, state, &mut markdown);
            }

            state.advance();
            processed += 1;
        }

        markdown
    }

    /// Render a non-heading line in the current section.
    fn render_body(
        &self,
        run: &TextRun,
        raw: &str,
        content: &str,
        state: &mut RenderState,
        out: &mut String,
    ) {
        let break_threshold = self.config.thresholds.paragraph_break;
        match state.section {
            None => log::debug!("Dropping text before any heading: {:?}", content),
            Some(SectionKind::Title) => {
                out.push_str(content);
                out.push('\n');
            },
            Some(SectionKind::Description) | Some(SectionKind::Flags) => {
                out.push_str(state.paragraph_break(run.bbox.y1, break_threshold));
                out.push_str(content);
                out.push('\n');
            },
            Some(SectionKind::Encoding) => {},
            Some(SectionKind::Operation) => {
                let language = &self.config.operation_language;
                if run.font_id.ends_with(&self.config.heading_font_suffix) {
                    out.push_str(state.close_code());
                    out.push_str(&format!("\n#### {}\n", content));
                    out.push_str(&state.open_code(language));
                } else {
                    out.push_str(&state.open_code(language));
                    out.push_str(&self.config.indent.indent_for(run.bbox.x0));
                    let line = raw.replace(self.config.arrow_glyph, "\u{2190}");
                    push_line(out, &line);
                }
            },
            Some(SectionKind::Intrinsics) => push_line(out, raw),
            Some(SectionKind::Exceptions) => {
                let content = if content.contains("(\\#") {
                    content.to_string()
                } else {
                    content.replace("\\#", "<p>#")
                };
                out.push_str(state.paragraph_break(run.bbox.y1, break_threshold));
                out.push_str(&content);
                out.push('\n');
            },
        }
    }

    /// Render a table grid as HTML, honouring the continuation flags.
    fn render_table(&self, table: &TableRegion, state: &RenderState) -> String {
        let grid = TableGrid::reconstruct(table, &self.config.tolerances);
        let adjacency = state.table_adjacency;
        let mut markdown = String::new();

        let mut rows = grid.rows.iter();
        let mut header = true;
        if adjacency.joins_previous() {
            rows.next();
            header = false;
        } else {
            markdown.push_str("<table>\n");
        }

        for row in rows {
            markdown.push_str("\t<tr>\n");
            for cell in row {
                markdown.push_str(&render_cell(cell, header));
            }
            markdown.push_str("\t</tr>\n");
            header = false;
        }

        if !adjacency.joins_next() {
            markdown.push_str("</table>\n\n");
        }
        markdown
    }
}

fn render_cell(cell: &Cell<'_>, bold: bool) -> String {
    let mut attrs = String::new();
    if cell.colspan > 1 {
        attrs.push_str(&format!(" colspan={}", cell.colspan));
    }
    if cell.rowspan > 1 {
        attrs.push_str(&format!(" rowspan={}", cell.rowspan));
    }
    let content = cell.content();
    if bold {
        format!("\t\t<td{}><b>{}</b></td>\n", attrs, content)
    } else {
        format!("\t\t<td{}>{}</td>\n", attrs, content)
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    if !line.ends_with('\n') {
        out.push('\n');
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                Error::InvalidConfig(format!("invalid furniture pattern {:?}: {}", p, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FurnitureConfig;
    use crate::geometry::Rect;
    use crate::layout::primitives::{ImageMarker, RuleSegment};
    use crate::layout::region::{ImageRegion, ParagraphRegion};

    const BODY: &str = "NeoSansIntel";
    const HEADING: &str = "ABCDEF+NeoSansIntelMedium";

    fn line(text: &str, x0: f64, y1: f64) -> TextRun {
        TextRun::new(Rect::new(x0, y1 - 9.0, x0 + 200.0, y1), text, BODY, 9.0)
    }

    fn styled(text: &str, x0: f64, y1: f64, height: f64) -> TextRun {
        TextRun::new(Rect::new(x0, y1 - height, x0 + 200.0, y1), text, HEADING, height)
    }

    fn paragraph(texts: Vec<TextRun>) -> Region {
        Region::Paragraph(ParagraphRegion { texts })
    }

    fn render(config: &ConversionConfig, region: &Region, state: &mut RenderState) -> String {
        SectionRenderer::new(config)
            .unwrap()
            .render_region(region, state)
            .unwrap()
    }

    #[test]
    fn test_heading_split() {
        let config = ConversionConfig::default();
        let renderer = SectionRenderer::new(&config).unwrap();
        let title = renderer.split_title(&styled("ADD \u{2014} Add", 40.0, 700.0, 16.0));
        assert_eq!(
            title,
            Some(InstructionTitle {
                key: "ADD".to_string(),
                description: "Add".to_string()
            })
        );

        let mut state = RenderState::new();
        let out = render(&config, &paragraph(vec![styled("ADD \u{2014} Add", 40.0, 700.0, 16.0)]), &mut state);
        assert_eq!(out, "<b>ADD</b> \u{2014} Add\n");
        assert_eq!(state.section, Some(SectionKind::Title));
    }

    #[test]
    fn test_split_title_requires_height_and_typeface() {
        let config = ConversionConfig::default();
        let renderer = SectionRenderer::new(&config).unwrap();
        assert!(renderer.split_title(&styled("ADD \u{2014} Add", 40.0, 700.0, 12.0)).is_none());
        let plain = TextRun::new(Rect::new(40.0, 684.0, 240.0, 700.0), "ADD \u{2014} Add", BODY, 16.0);
        assert!(renderer.split_title(&plain).is_none());
        // En dash works too
        let en = renderer.split_title(&styled("CLAC \u{2013} Clear AC Flag", 40.0, 700.0, 16.0));
        assert_eq!(en.map(|t| t.key).as_deref(), Some("CLAC"));
    }

    #[test]
    fn test_short_dash_run_is_footer() {
        let config = ConversionConfig::default();
        let mut state = RenderState {
            section: Some(SectionKind::Description),
            next_section: Some(SectionKind::Description),
            ..RenderState::default()
        };
        let footer = TextRun::new(Rect::new(40.0, 30.0, 240.0, 38.0), "Intel \u{2014} footer", BODY, 8.0);
        let out = render(&config, &paragraph(vec![footer]), &mut state);
        assert_eq!(out, "");
    }

    #[test]
    fn test_furniture() {
        let config = ConversionConfig::default();
        let mut state = RenderState {
            section: Some(SectionKind::Description),
            next_section: Some(SectionKind::Description),
            ..RenderState::default()
        };
        let region = paragraph(vec![
            line("INSTRUCTION SET REFERENCE, A-L", 40.0, 760.0),
            line("Adds the operands.", 40.0, 700.0),
            line("INSTRUCTION SET REFERENCE, A-L", 40.0, 690.0),
            TextRun::new(Rect::new(40.0, 30.0, 240.0, 38.0), "Vol. 2A 3-31", BODY, 8.0),
        ]);
        let out = render(&config, &region, &mut state);
        // Only the first header is furniture; later matches are body text.
        assert_eq!(out, "Adds the operands.\nINSTRUCTION SET REFERENCE, A-L\n");
    }

    #[test]
    fn test_section_coverage() {
        let config = ConversionConfig::default();
        for rule in &config.headings {
            let mut state = RenderState::new();
            render(&config, &paragraph(vec![line(&rule.literal, 40.0, 700.0)]), &mut state);
            assert_eq!(state.section, Some(rule.section), "heading {:?}", rule.literal);
        }
    }

    #[test]
    fn test_text_before_heading_is_dropped() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let out = render(
            &config,
            &paragraph(vec![line("stray", 40.0, 720.0), line("Description", 40.0, 700.0)]),
            &mut state,
        );
        assert_eq!(out, "\n### Description\n");
    }

    #[test]
    fn test_description_paragraph_breaks() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let region = paragraph(vec![
            line("Description", 40.0, 700.0),
            line("first line", 40.0, 680.0),
            line("same paragraph", 40.0, 670.0),
            line("new paragraph", 40.0, 640.0),
        ]);
        let out = render(&config, &region, &mut state);
        assert_eq!(
            out,
            "\n### Description\nfirst line\nsame paragraph\n\nnew paragraph\n"
        );
    }

    #[test]
    fn test_operation_code_block() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let region = paragraph(vec![
            line("Operation", 40.0, 700.0),
            line("DEST \u{F0AC} DEST + SRC;", 40.0, 690.0),
            line("IF carry", 50.0, 680.0),
            line("Flags Affected", 40.0, 660.0),
            line("The OF flag is set.", 40.0, 650.0),
        ]);
        let out = render(&config, &region, &mut state);
        assert_eq!(
            out,
            "\n### Operation\n\n```java\nDEST \u{2190} DEST + SRC;\n    IF carry\n```\n### Flags Affected\nThe OF flag is set.\n"
        );
        assert!(!state.code_mode);
    }

    #[test]
    fn test_operation_subheading_reopens_code() {
        let config = ConversionConfig::default();
        let mut state = RenderState {
            section: Some(SectionKind::Operation),
            next_section: Some(SectionKind::Operation),
            code_mode: true,
            ..RenderState::default()
        };
        let region = paragraph(vec![styled("64-bit Mode", 40.0, 700.0, 9.0)]);
        let out = render(&config, &region, &mut state);
        assert_eq!(out, "```\n#### 64-bit Mode\n```java\n");
        assert!(state.code_mode);
    }

    #[test]
    fn test_intrinsics() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let region = paragraph(vec![
            line("Intel C/C++ Compiler Intrinsic Equivalent", 40.0, 700.0),
            line("__m128i _mm_add_epi32(__m128i a, __m128i b)", 40.0, 690.0),
        ]);
        let out = render(&config, &region, &mut state);
        assert_eq!(
            out,
            "\n### Intel C/C++ Compiler Intrinsic Equivalent\n```c\n__m128i _mm_add_epi32(__m128i a, __m128i b)\n"
        );
        assert_eq!(state.finish(), "```\n");
        assert_eq!(state.finish(), "");
    }

    #[test]
    fn test_exceptions_notation() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let region = paragraph(vec![
            line("Protected Mode Exceptions", 40.0, 700.0),
            line("#GP(0) If the destination is read-only.", 40.0, 690.0),
            line("Same as above (#UD).", 40.0, 680.0),
        ]);
        let out = render(&config, &region, &mut state);
        assert_eq!(
            out,
            "\n### Protected Mode Exceptions\n<p>#GP(0) If the destination is read-only.\nSame as above (\\#UD).\n"
        );
    }

    #[test]
    fn test_reading_order() {
        let config = ConversionConfig::default();
        let mut state = RenderState {
            section: Some(SectionKind::Title),
            next_section: Some(SectionKind::Title),
            ..RenderState::default()
        };
        let region = paragraph(vec![
            line("low", 40.0, 600.0),
            line("right", 300.0, 700.0),
            line("left", 40.0, 700.0),
        ]);
        let out = render(&config, &region, &mut state);
        assert_eq!(out, "left\nright\nlow\n");
    }

    fn opcode_table() -> TableRegion {
        let v = |x: f64| RuleSegment::vertical(Rect::new(x, 0.0, x + 0.5, 40.0));
        let h = |y: f64| RuleSegment::horizontal(Rect::new(0.0, y, 100.0, y + 0.5));
        TableRegion {
            verticals: vec![v(0.0), v(50.0), v(100.0)],
            horizontals: vec![h(40.0), h(20.0), h(0.0)],
            texts: vec![
                line("Opcode", 5.0, 35.0),
                line("Instruction", 55.0, 35.0),
                line("04 ib", 5.0, 15.0),
                line("ADD AL, imm8", 55.0, 15.0),
            ]
            .into_iter()
            .map(|mut t| {
                t.bbox.x1 = t.bbox.x0 + 30.0;
                t
            })
            .collect(),
        }
    }

    #[test]
    fn test_table_rendering() {
        let config = ConversionConfig::default();
        let mut state = RenderState::new();
        let region = Region::Table(opcode_table());
        let out = render(&config, &region, &mut state);
        assert_eq!(
            out,
            "<table>\n\t<tr>\n\t\t<td><b>Opcode</b></td>\n\t\t<td><b>Instruction</b></td>\n\t</tr>\n\t<tr>\n\t\t<td>04 ib</td>\n\t\t<td>ADD AL, imm8</td>\n\t</tr>\n</table>\n\n"
        );
        assert!(SectionRenderer::new(&config).unwrap().is_opcode_table(&region));
    }

    #[test]
    fn test_table_continuation_flags() {
        let config = ConversionConfig::default();
        let region = Region::Table(opcode_table());

        let mut state = RenderState::new();
        state.table_adjacency = TableAdjacency {
            prev_is_continuation: true,
            curr_is_continuation: true,
            next_is_continuation: true,
        };
        let out = render(&config, &region, &mut state);
        assert_eq!(out, "\t<tr>\n\t\t<td>04 ib</td>\n\t\t<td>ADD AL, imm8</td>\n\t</tr>\n");
    }

    #[test]
    fn test_image_policy() {
        let image = Region::Image(ImageRegion {
            image: ImageMarker::new(Rect::new(0.0, 0.0, 10.0, 10.0)),
        });
        let mut state = RenderState::new();

        let config = ConversionConfig::default();
        assert_eq!(render(&config, &image, &mut state), "");

        let config = ConversionConfig::default()
            .with_image_policy(ImagePolicy::Placeholder("[figure]".to_string()));
        assert_eq!(render(&config, &image, &mut state), "[figure]\n");

        let config = ConversionConfig::default().with_image_policy(ImagePolicy::Reject);
        let renderer = SectionRenderer::new(&config).unwrap();
        assert!(matches!(
            renderer.render_region(&image, &mut state),
            Err(Error::UnsupportedRegionKind(_))
        ));
    }

    #[test]
    fn test_bad_furniture_pattern() {
        let config = ConversionConfig::default().with_furniture(FurnitureConfig {
            leading: vec!["(".to_string()],
            footer: Vec::new(),
        });
        assert!(matches!(SectionRenderer::new(&config), Err(Error::InvalidConfig(_))));
    }
}
