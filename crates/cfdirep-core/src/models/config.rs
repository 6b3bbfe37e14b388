//! Configuration for a report run.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cfdi::SchemaVariant;

/// Configuration for one batch run of the report pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory holding the CFDI XML files to process.
    pub input_dir: PathBuf,

    /// Destination path for the report spreadsheet.
    pub output_path: PathBuf,

    /// Minimum invoice total. Records with total at or below this value are
    /// dropped from the report (the boundary itself is excluded).
    pub min_total: Decimal,

    /// Currency assumed when a document carries no Moneda attribute.
    pub default_currency: String,

    /// Subdirectory of `input_dir` that processed 4.0 files are moved into.
    pub processed_dir: String,

    /// Move successfully processed 4.0 files into `processed_dir`.
    pub move_processed: bool,

    /// Abort the whole batch on the first unparseable issuance date instead
    /// of skipping that record.
    pub strict_dates: bool,

    /// Pin the schema variant. `None` detects it per document from the root
    /// namespace, and the report projection follows the widest variant seen.
    pub variant: Option<SchemaVariant>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("facturas_xml"),
            output_path: PathBuf::from("reporte_facturas.csv"),
            min_total: Decimal::ONE,
            default_currency: "MXN".to_string(),
            processed_dir: "procesados_xml".to_string(),
            move_processed: true,
            strict_dates: false,
            variant: None,
        }
    }
}

impl ReportConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Full path of the processed-files directory under the input directory.
    pub fn processed_path(&self) -> PathBuf {
        self.input_dir.join(&self.processed_dir)
    }
}
