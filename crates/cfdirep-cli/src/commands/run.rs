//! Run command - batch-convert a directory of CFDI XML files into a report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use cfdirep_core::{build_report, write_csv, RecordExtractor, ReportConfig, SchemaVariant};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the CFDI XML files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output spreadsheet path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum invoice total kept in the report
    #[arg(long)]
    min_total: Option<Decimal>,

    /// Pin the CFDI version instead of detecting it per document
    #[arg(long)]
    variant: Option<SchemaVariant>,

    /// Abort the whole batch on the first unparseable issuance date
    #[arg(long)]
    strict_dates: bool,

    /// Leave processed 4.0 files in the input directory
    #[arg(long)]
    keep_files: bool,
}

pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = if let Some(path) = config_path {
        ReportConfig::from_file(Path::new(path))?
    } else {
        ReportConfig::default()
    };

    // CLI flags override file values
    if let Some(input_dir) = args.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(min_total) = args.min_total {
        config.min_total = min_total;
    }
    if let Some(variant) = args.variant {
        config.variant = Some(variant);
    }
    if args.strict_dates {
        config.strict_dates = true;
    }
    if args.keep_files {
        config.move_processed = false;
    }

    if !config.input_dir.exists() {
        fs::create_dir_all(&config.input_dir)?;
        println!(
            "{} Created input directory {}. Place CFDI XML files there and rerun.",
            style("ℹ").blue(),
            config.input_dir.display()
        );
        return Ok(());
    }

    let files = scan_input_files(&config.input_dir)?;

    println!(
        "{} Found {} XML files to process",
        style("ℹ").blue(),
        files.len()
    );

    let mut extractor =
        RecordExtractor::new().with_default_currency(config.default_currency.clone());
    if let Some(variant) = config.variant {
        extractor = extractor.with_variant(variant);
    }

    // Set up progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut records = Vec::with_capacity(files.len());
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    for path in &files {
        match extractor.extract_path(path) {
            Ok(record) => {
                pb.println(format!(
                    "{} Processed {}",
                    style("✓").green(),
                    record.source_file
                ));
                // Marking a file processed is a post-extraction step, so a
                // failed move never loses the extracted record.
                if config.move_processed && record.variant.moves_processed() {
                    if let Err(e) = move_to_processed(path, &config.processed_path()) {
                        warn!("Could not move {} to processed directory: {}", path.display(), e);
                    }
                }
                records.push(record);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                failures.push((path.clone(), e.to_string()));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let total_seen = files.len();
    let extracted = records.len();

    let report = build_report(records, &config)?;

    // Print summary
    println!();
    println!(
        "{} Processed {} of {} XML files in {:?}",
        style("✓").green(),
        extracted,
        total_seen,
        start.elapsed()
    );
    println!(
        "   {} rows kept, {} at or below the {} total threshold, {} with unparseable dates",
        style(report.len()).green(),
        report.below_threshold,
        config.min_total,
        report.skipped_dates
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Skipped files:").red());
        for (path, error) in &failures {
            println!("  - {}: {}", path.display(), error);
        }
    }

    if report.is_empty() {
        if extracted == 0 {
            println!("{} No valid invoices found to process", style("ℹ").blue());
        }
        println!("{} No data to export", style("ℹ").blue());
        return Ok(());
    }

    // Export failure is the last reportable event of the run; it is logged
    // and the process still exits cleanly.
    match write_csv(&report, &config.output_path) {
        Ok(()) => {
            println!(
                "{} Report written to {}",
                style("✓").green(),
                config.output_path.display()
            );
        }
        Err(e) => {
            error!("Export failed: {}", e);
            eprintln!("{} Export failed: {}", style("✗").red(), e);
        }
    }

    Ok(())
}

/// Flat listing of the input directory: `.xml` files only, no recursion.
fn scan_input_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext.eq_ignore_ascii_case("xml") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Move a processed source file into the processed subdirectory, creating the
/// directory on first use.
fn move_to_processed(path: &Path, processed_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(processed_dir)?;
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "source path has no file name")
    })?;
    fs::rename(path, processed_dir.join(file_name))?;
    debug!("Moved {} to {}", path.display(), processed_dir.display());
    Ok(())
}
