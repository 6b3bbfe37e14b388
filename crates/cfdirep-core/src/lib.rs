//! Core library for CFDI invoice report generation.
//!
//! This crate provides:
//! - Schema variant descriptors for CFDI 3.3 and 4.0
//! - Namespace-aware XML extraction into flat invoice records
//! - Report building (date coercion, threshold filter, stable sort)
//! - Column projection and CSV export

pub mod cfdi;
pub mod error;
pub mod models;
pub mod report;

pub use cfdi::{Column, RecordExtractor, SchemaVariant, CFDI_NS_33, CFDI_NS_40, TFD_NS};
pub use error::{CfdiError, DateParseError, ExportError, ExtractionError, ParseError, Result};
pub use models::config::ReportConfig;
pub use models::invoice::InvoiceRecord;
pub use report::{build_report, write_csv, Report, ReportRow};
