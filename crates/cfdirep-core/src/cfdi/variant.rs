//! Schema variant descriptors for the two supported CFDI versions.
//!
//! The two versions share most of their shape; a variant descriptor carries
//! the differences (namespace URI, projected column set, 4.0-only fields,
//! post-extraction file handling) so a single pipeline serves both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root namespace of CFDI 3.3 documents.
pub const CFDI_NS_33: &str = "http://www.sat.gob.mx/cfd/3";

/// Root namespace of CFDI 4.0 documents.
pub const CFDI_NS_40: &str = "http://www.sat.gob.mx/cfd/4";

/// Namespace of the fiscal stamp complement (shared by both versions).
pub const TFD_NS: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

/// A supported CFDI schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaVariant {
    /// CFDI 3.3.
    #[serde(rename = "3.3")]
    V33,

    /// CFDI 4.0.
    #[serde(rename = "4.0")]
    V40,
}

impl SchemaVariant {
    /// Select the variant matching a document's root namespace URI.
    pub fn from_namespace(uri: &str) -> Option<Self> {
        match uri {
            CFDI_NS_33 => Some(Self::V33),
            CFDI_NS_40 => Some(Self::V40),
            _ => None,
        }
    }

    /// The root namespace URI of this variant.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::V33 => CFDI_NS_33,
            Self::V40 => CFDI_NS_40,
        }
    }

    /// Ordered column set projected into the report for this variant.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::V33 => &[
                Column::Fecha,
                Column::EmisorNombre,
                Column::Total,
                Column::Uuid,
                Column::NumeroFactura,
                Column::UsoCfdi,
                Column::MetodoPago,
                Column::FormaPago,
            ],
            Self::V40 => &[
                Column::Fecha,
                Column::EmisorNombre,
                Column::EmisorRfc,
                Column::Total,
                Column::Moneda,
                Column::Uuid,
                Column::NumeroFactura,
                Column::DescripcionConcepto,
                Column::UsoCfdi,
                Column::MetodoPago,
                Column::FormaPago,
                Column::ReceptorNombre,
                Column::ReceptorRfc,
                Column::ReceptorRegimenFiscal,
            ],
        }
    }

    /// Whether successfully processed source files are moved into the
    /// processed subdirectory. Only 4.0 files are moved; 3.3 files stay
    /// where they are.
    pub fn moves_processed(&self) -> bool {
        matches!(self, Self::V40)
    }

    /// Whether the first line-item description is extracted.
    pub fn extracts_concepto(&self) -> bool {
        matches!(self, Self::V40)
    }

    /// Whether the recipient fiscal regime code is extracted.
    pub fn extracts_regimen(&self) -> bool {
        matches!(self, Self::V40)
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V33 => write!(f, "3.3"),
            Self::V40 => write!(f, "4.0"),
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3.3" | "33" | "3" => Ok(Self::V33),
            "4.0" | "40" | "4" => Ok(Self::V40),
            other => Err(format!("unknown CFDI version: {other:?} (expected 3.3 or 4.0)")),
        }
    }
}

/// A projectable report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Fecha,
    EmisorNombre,
    EmisorRfc,
    Total,
    Moneda,
    Uuid,
    NumeroFactura,
    DescripcionConcepto,
    UsoCfdi,
    MetodoPago,
    FormaPago,
    ReceptorNombre,
    ReceptorRfc,
    ReceptorRegimenFiscal,
}

impl Column {
    /// Spreadsheet header name for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Fecha => "Fecha",
            Self::EmisorNombre => "EmisorNombre",
            Self::EmisorRfc => "EmisorRFC",
            Self::Total => "Total",
            Self::Moneda => "Moneda",
            Self::Uuid => "UUID",
            Self::NumeroFactura => "NumeroFactura",
            Self::DescripcionConcepto => "DescripcionConcepto",
            Self::UsoCfdi => "UsoCFDI",
            Self::MetodoPago => "MetodoPago",
            Self::FormaPago => "FormaPago",
            Self::ReceptorNombre => "ReceptorNombre",
            Self::ReceptorRfc => "ReceptorRFC",
            Self::ReceptorRegimenFiscal => "ReceptorRegimenFiscal",
        }
    }
}
