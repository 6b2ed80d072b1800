//! Export decoded reference-manual pages to per-instruction Markdown files
//!
//! Reads the primitive trees of a run of pages (JSON, as produced by the
//! layout decoder) and writes one `.md` file per instruction.
//!
//! Usage:
//!   cargo run --release --bin export_to_markdown -- pages.json
//!   cargo run --release --bin export_to_markdown -- pages.json --output-dir out --pages 120-180

use docpile::config::ConversionConfig;
use docpile::converters::DocumentWriter;
use docpile::layout::Page;
use docpile::pipeline::DocPipeline;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

struct ExportConfig {
    input: PathBuf,
    output_dir: PathBuf,
    config_file: Option<PathBuf>,
    page_range: Option<(usize, usize)>,
    source: Option<String>,
    verbose: bool,
}

impl ExportConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut output_dir = PathBuf::from("markdown_exports");
        let mut config_file = None;
        let mut page_range = None;
        let mut source = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output-dir" => {
                    i += 1;
                    output_dir = PathBuf::from(value(&args, i, "--output-dir")?);
                },
                "--config" => {
                    i += 1;
                    config_file = Some(PathBuf::from(value(&args, i, "--config")?));
                },
                "--pages" => {
                    i += 1;
                    page_range = Some(parse_range(value(&args, i, "--pages")?)?);
                },
                "--source" => {
                    i += 1;
                    source = Some(value(&args, i, "--source")?.to_string());
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                arg if arg.starts_with("--") => {
                    return Err(format!("unknown option {}", arg));
                },
                arg => {
                    if input.is_some() {
                        return Err(format!("unexpected argument {}", arg));
                    }
                    input = Some(PathBuf::from(arg));
                },
            }
            i += 1;
        }

        Ok(Self {
            input: input.ok_or_else(|| "missing <pages.json>".to_string())?,
            output_dir,
            config_file,
            page_range,
            source,
            verbose,
        })
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_range(spec: &str) -> Result<(usize, usize), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid page range {:?}", spec))
    };
    let (start, end) = match spec.split_once('-') {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let page = parse(spec)?;
            (page, page)
        },
    };
    if start > end {
        return Err(format!("invalid page range {:?}", spec));
    }
    Ok((start, end))
}

fn usage() {
    eprintln!(
        "Usage: export_to_markdown <pages.json> [--output-dir DIR] [--config FILE] \
         [--pages START-END] [--source LABEL] [--verbose]"
    );
}

fn run(export: &ExportConfig) -> docpile::Result<usize> {
    let mut config = match &export.config_file {
        Some(path) => ConversionConfig::from_json_file(path)?,
        None => ConversionConfig::default(),
    };
    if let Some(source) = &export.source {
        config = config.with_source_label(source.clone());
    }

    let json = fs::read_to_string(&export.input)?;
    let mut pages: Vec<Page> = serde_json::from_str(&json)?;
    if let Some((start, end)) = export.page_range {
        pages.retain(|p| (start..=end).contains(&p.number));
    }
    println!("Pages:            {}", pages.len());

    let pipeline = DocPipeline::with_config(config);
    let conversion = pipeline.convert(pages)?;
    for failure in &conversion.failed_pages {
        eprintln!("✗ page {}: {}", failure.page, failure.error);
    }
    if export.verbose {
        println!("Dropped:          {} primitives", conversion.dropped_total);
    }

    let writer = DocumentWriter::new(&export.output_dir);
    let written = writer.write_all(&conversion.documents, pipeline.config())?;
    if export.verbose {
        for path in &written {
            println!("  {}", path.display());
        }
    }
    Ok(written.len())
}

fn main() {
    let export = match ExportConfig::from_args() {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage();
            std::process::exit(2);
        },
    };

    let default_level = if export.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    println!("Reference manual to Markdown exporter");
    println!("Input:            {}", export.input.display());
    println!("Output directory: {}", export.output_dir.display());

    let start_time = Instant::now();
    match run(&export) {
        Ok(count) => {
            println!("\n{}", "=".repeat(60));
            println!("✓ Wrote {} documents in {:.2}s", count, start_time.elapsed().as_secs_f64());
            println!("{}", "=".repeat(60));
        },
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            std::process::exit(1);
        },
    }
}
