//! Inspect command - extract a single CFDI file and print the record.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use cfdirep_core::{InvoiceRecord, RecordExtractor, ReportConfig};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input CFDI XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        ReportConfig::from_file(Path::new(path))?
    } else {
        ReportConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Inspecting file: {}", args.input.display());

    let mut extractor =
        RecordExtractor::new().with_default_currency(config.default_currency.clone());
    if let Some(variant) = config.variant {
        extractor = extractor.with_variant(variant);
    }

    // Inspection never moves the source file and applies no filtering.
    let record = extractor.extract_path(&args.input)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_text(&record),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.invoice_number()));
    output.push_str(&format!("File: {}\n", record.source_file));
    output.push_str(&format!("CFDI version: {}\n", record.variant));
    output.push_str(&format!("Date: {}\n", record.fecha));
    output.push_str("\n");

    output.push_str("Issuer:\n");
    output.push_str(&format!("  {}\n", record.emisor_nombre));
    output.push_str(&format!("  RFC: {}\n", record.emisor_rfc));
    output.push_str("\n");

    output.push_str("Receiver:\n");
    output.push_str(&format!("  {}\n", record.receptor_nombre));
    output.push_str(&format!("  RFC: {}\n", record.receptor_rfc));
    if let Some(uso) = &record.uso_cfdi {
        output.push_str(&format!("  UsoCFDI: {}\n", uso));
    }
    if let Some(regimen) = &record.receptor_regimen_fiscal {
        output.push_str(&format!("  Regimen: {}\n", regimen));
    }
    output.push_str("\n");

    if let Some(descripcion) = &record.descripcion_concepto {
        output.push_str(&format!("Concept: {}\n", descripcion));
        output.push_str("\n");
    }

    output.push_str("Amounts:\n");
    output.push_str(&format!("  Subtotal: {} {}\n", record.subtotal, record.moneda));
    output.push_str(&format!("  Taxes:    {} {}\n", record.total_impuestos, record.moneda));
    output.push_str(&format!("  Total:    {} {}\n", record.total, record.moneda));

    if !record.uuid.is_empty() {
        output.push_str(&format!("\nUUID: {}\n", record.uuid));
    }

    output
}
