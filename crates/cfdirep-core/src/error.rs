//! Error types for the cfdirep-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the cfdirep library.
#[derive(Error, Debug)]
pub enum CfdiError {
    /// XML parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Date coercion error during report building.
    #[error("date error: {0}")]
    DateParse(#[from] DateParseError),

    /// Report export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading the XML document itself.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file is not well-formed XML.
    #[error("malformed XML in {file}: {source}")]
    Xml {
        file: String,
        #[source]
        source: quick_xml::Error,
    },
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A numeric attribute is present but not a number.
    #[error("failed to parse {field}: {value:?}")]
    Parse { field: &'static str, value: String },

    /// The root element is not in a known CFDI namespace.
    #[error("unrecognized document namespace: {0:?}")]
    UnknownNamespace(String),

    /// The document conforms to a different schema version than requested.
    #[error("expected CFDI {expected} document, found {found}")]
    VariantMismatch {
        expected: crate::cfdi::SchemaVariant,
        found: crate::cfdi::SchemaVariant,
    },

    /// The document has no root element.
    #[error("no comprobante root element found")]
    MissingRoot,
}

/// A record's issuance date could not be coerced to a timestamp.
#[derive(Error, Debug)]
#[error("unparseable date {value:?} in {file}")]
pub struct DateParseError {
    pub file: String,
    pub value: String,
}

/// Errors writing the report file.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Could not create the output file.
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed while writing rows or flushing.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for the cfdirep library.
pub type Result<T> = std::result::Result<T, CfdiError>;
