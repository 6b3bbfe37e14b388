//! Flat invoice record extracted from one CFDI document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cfdi::SchemaVariant;

/// One invoice, flattened from a CFDI XML file.
///
/// Records are immutable once constructed; the report stage only filters,
/// projects and sorts the collection as a whole. Optional sub-elements of the
/// source document (issuer, recipient, fiscal stamp, tax totals) default to
/// empty strings or zero, so absence never shows up as an error here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Source filename the record was extracted from.
    pub source_file: String,

    /// Invoice series (Serie attribute, may be empty).
    pub serie: String,

    /// Invoice folio (Folio attribute, may be empty).
    pub folio: String,

    /// Raw issuance timestamp attribute. Coerced to a comparable
    /// timestamp at report-building time, not here.
    pub fecha: String,

    /// Invoice total amount.
    pub total: Decimal,

    /// Invoice subtotal amount.
    pub subtotal: Decimal,

    /// Total transferred taxes (TotalImpuestosTrasladados).
    pub total_impuestos: Decimal,

    /// Currency code (default: MXN).
    pub moneda: String,

    /// Comprobante type catalog code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_comprobante: Option<String>,

    /// CFDI usage catalog code (from the Receptor element).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uso_cfdi: Option<String>,

    /// Payment method catalog code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metodo_pago: Option<String>,

    /// Payment form catalog code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forma_pago: Option<String>,

    /// Issuer tax id (RFC), empty when the Emisor element is absent.
    pub emisor_rfc: String,

    /// Issuer legal name, empty when the Emisor element is absent.
    pub emisor_nombre: String,

    /// Recipient tax id (RFC), empty when the Receptor element is absent.
    pub receptor_rfc: String,

    /// Recipient legal name, empty when the Receptor element is absent.
    pub receptor_nombre: String,

    /// Recipient fiscal regime code (CFDI 4.0 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receptor_regimen_fiscal: Option<String>,

    /// Fiscal stamp UUID, empty when the TimbreFiscalDigital element is absent.
    pub uuid: String,

    /// Description of the first line item (CFDI 4.0 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion_concepto: Option<String>,

    /// Schema variant the source document conformed to.
    pub variant: SchemaVariant,
}

impl InvoiceRecord {
    /// Create an empty record for the given source file and variant.
    pub fn new(source_file: impl Into<String>, variant: SchemaVariant) -> Self {
        Self {
            source_file: source_file.into(),
            serie: String::new(),
            folio: String::new(),
            fecha: String::new(),
            total: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            total_impuestos: Decimal::ZERO,
            moneda: default_currency(),
            tipo_comprobante: None,
            uso_cfdi: None,
            metodo_pago: None,
            forma_pago: None,
            emisor_rfc: String::new(),
            emisor_nombre: String::new(),
            receptor_rfc: String::new(),
            receptor_nombre: String::new(),
            receptor_regimen_fiscal: None,
            uuid: String::new(),
            descripcion_concepto: None,
            variant,
        }
    }

    /// Invoice number: concatenation of series and folio. May be empty when
    /// the source document carries neither attribute.
    pub fn invoice_number(&self) -> String {
        format!("{}{}", self.serie, self.folio)
    }
}

pub(crate) fn default_currency() -> String {
    "MXN".to_string()
}
