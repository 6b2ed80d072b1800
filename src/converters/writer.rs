//! Splitting ordered regions into per-instruction documents and writing them.
//!
//! Regions arrive in final reading order across all pages. A region carrying
//! an instruction heading whose key differs from the current one starts a new
//! document; everything in between belongs to the current document.

use crate::config::ConversionConfig;
use crate::converters::cleanup::apply_repairs;
use crate::converters::renderer::{RenderState, SectionRenderer, TableAdjacency};
use crate::error::Result;
use crate::layout::region::Region;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// What the continuation scan needs to know about a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSummary {
    /// Instruction key, if the region carries a heading
    pub key: Option<String>,
    /// The region is a table
    pub is_table: bool,
    /// The region is a table starting with the opcode token
    pub is_opcode_table: bool,
}

/// Continuation flags for the region at `index`.
///
/// Non-opcode regions get all-false flags. For an opcode table, each
/// direction is scanned until either a region of a different document
/// (`false`) or the nearest table, whose opcode-ness is the answer.
///
/// # Examples
///
/// ```
/// use docpile::converters::writer::{table_continuation, RegionSummary};
///
/// let opcode = RegionSummary { key: None, is_table: true, is_opcode_table: true };
/// let regions = vec![opcode.clone(), RegionSummary::default(), opcode];
/// let flags = table_continuation(&regions, 2, None);
/// assert!(flags.prev_is_continuation && flags.curr_is_continuation);
/// assert!(!flags.next_is_continuation);
/// ```
pub fn table_continuation(
    regions: &[RegionSummary],
    index: usize,
    current_key: Option<&str>,
) -> TableAdjacency {
    let Some(current) = regions.get(index) else {
        return TableAdjacency::default();
    };
    if !current.is_opcode_table {
        return TableAdjacency::default();
    }
    TableAdjacency {
        prev_is_continuation: scan(regions[..index].iter().rev(), current_key),
        curr_is_continuation: true,
        next_is_continuation: scan(regions[index + 1..].iter(), current_key),
    }
}

fn scan<'a>(mut regions: impl Iterator<Item = &'a RegionSummary>, current_key: Option<&str>) -> bool {
    regions
        .find_map(|r| {
            if r.key.as_deref().is_some_and(|k| Some(k) != current_key) {
                Some(false)
            } else if r.is_table {
                Some(r.is_opcode_table)
            } else {
                None
            }
        })
        .unwrap_or(false)
}

/// Source attribution appended to every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Human-readable name of the source manual
    pub source: String,
    /// Generation date
    pub generated: NaiveDate,
}

impl Provenance {
    /// Attribution with an explicit date.
    pub fn new(source: impl Into<String>, generated: NaiveDate) -> Self {
        Self {
            source: source.into(),
            generated,
        }
    }

    /// Attribution dated today (local time).
    pub fn today(source: impl Into<String>) -> Self {
        Self::new(source, chrono::Local::now().date_naive())
    }

    /// Footer block.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use docpile::converters::writer::Provenance;
    ///
    /// let date = NaiveDate::from_ymd_opt(2020, 12, 3).unwrap();
    /// let footer = Provenance::new("SDM", date).footer();
    /// assert!(footer.ends_with("<i>Source: SDM<br>Generated: 3-12-2020</i></p>\n"));
    /// ```
    pub fn footer(&self) -> String {
        format!(
            "\n --- \n<p align=\"right\"><i>Source: {}<br>Generated: {}</i></p>\n",
            self.source,
            self.generated.format("%-d-%-m-%Y")
        )
    }
}

/// One finished Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Instruction key, `None` for text before the first heading
    pub key: Option<String>,
    /// Final Markdown including the footer
    pub markdown: String,
}

impl RenderedDocument {
    /// Output file name for this document.
    pub fn file_name(&self, config: &ConversionConfig) -> String {
        file_name(self.key.as_deref(), config)
    }
}

/// File name for an instruction key: `/` and spaces become `_`.
///
/// # Examples
///
/// ```
/// use docpile::config::ConversionConfig;
/// use docpile::converters::writer::file_name;
///
/// let config = ConversionConfig::default();
/// assert_eq!(file_name(Some("CMPS/CMPSB/CMPSW"), &config), "CMPS_CMPSB_CMPSW.md");
/// assert_eq!(file_name(None, &config), "untitled.md");
/// ```
pub fn file_name(key: Option<&str>, config: &ConversionConfig) -> String {
    let stem = match key {
        Some(key) => key.replace(['/', ' '], "_"),
        None => config.untitled_name.clone(),
    };
    format!("{}.{}", stem, config.file_extension)
}

/// Renders a region sequence into per-instruction documents.
#[derive(Debug)]
pub struct DocumentSegmenter<'c> {
    renderer: SectionRenderer<'c>,
    provenance: Provenance,
}

impl<'c> DocumentSegmenter<'c> {
    /// Create a segmenter dated today.
    pub fn new(config: &'c ConversionConfig) -> Result<Self> {
        Ok(Self {
            renderer: SectionRenderer::new(config)?,
            provenance: Provenance::today(config.source_label.clone()),
        })
    }

    /// Use a fixed provenance (reproducible output).
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Summaries used by the continuation scan.
    pub fn summarize(&self, regions: &[Region]) -> Vec<RegionSummary> {
        regions
            .iter()
            .map(|r| RegionSummary {
                key: self.renderer.instruction_key(r).map(|t| t.key),
                is_table: r.is_table(),
                is_opcode_table: self.renderer.is_opcode_table(r),
            })
            .collect()
    }

    /// Render `regions` (in final order) into documents.
    pub fn segment(&self, regions: &[Region]) -> Result<Vec<RenderedDocument>> {
        let summaries = self.summarize(regions);
        let mut documents = Vec::new();
        let mut current_key = summaries.first().and_then(|s| s.key.clone());
        let mut state = RenderState::new();
        let mut markdown = String::new();
        // Index of the first region of the open document
        let mut start = 0;

        for (i, region) in regions.iter().enumerate() {
            if let Some(key) = &summaries[i].key {
                if current_key.as_ref() != Some(key) {
                    markdown.push_str(state.finish());
                    let previous = std::mem::replace(&mut current_key, Some(key.clone()));
                    self.push_document(&mut documents, previous, std::mem::take(&mut markdown));
                    state = RenderState::new();
                    start = i;
                }
            }

            // Tables of an earlier document never continue into this one.
            state.table_adjacency =
                table_continuation(&summaries[start..], i - start, current_key.as_deref());

            markdown.push_str(&self.renderer.render_region(region, &mut state)?);
        }

        markdown.push_str(state.finish());
        self.push_document(&mut documents, current_key, markdown);
        Ok(documents)
    }

    fn push_document(&self, documents: &mut Vec<RenderedDocument>, key: Option<String>, body: String) {
        if key.is_none() && body.trim().is_empty() {
            return;
        }
        let mut markdown = apply_repairs(&body, &self.renderer.config().repairs);
        markdown.push_str(&self.provenance.footer());
        log::debug!("Assembled document {:?} ({} bytes)", key, markdown.len());
        documents.push(RenderedDocument { key, markdown });
    }
}

/// Writes rendered documents into a directory.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    output_dir: PathBuf,
}

impl DocumentWriter {
    /// Writer targeting `output_dir`; the directory is created on first write.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Write one document and return its path.
    pub fn write(&self, document: &RenderedDocument, config: &ConversionConfig) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(document.file_name(config));
        if path.exists() {
            log::warn!("Overwriting {}", path.display());
        }
        fs::write(&path, &document.markdown)?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write every document, stopping at the first I/O failure.
    pub fn write_all(
        &self,
        documents: &[RenderedDocument],
        config: &ConversionConfig,
    ) -> Result<Vec<PathBuf>> {
        documents.iter().map(|d| self.write(d, config)).collect()
    }
}
