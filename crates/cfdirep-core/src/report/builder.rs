//! Report building: date coercion, threshold filtering and sorting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::cfdi::{Column, SchemaVariant};
use crate::error::{DateParseError, Result};
use crate::models::config::ReportConfig;
use crate::models::invoice::InvoiceRecord;

/// One report row: an invoice record with its coerced issuance timestamp.
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Issuance timestamp, coerced from the record's raw Fecha attribute.
    pub fecha: NaiveDateTime,

    /// The underlying invoice record.
    pub record: InvoiceRecord,
}

impl ReportRow {
    /// Project one column of this row to its spreadsheet cell value.
    pub fn value(&self, column: Column) -> String {
        match column {
            Column::Fecha => self.fecha.format("%Y-%m-%d %H:%M:%S").to_string(),
            Column::EmisorNombre => self.record.emisor_nombre.clone(),
            Column::EmisorRfc => self.record.emisor_rfc.clone(),
            Column::Total => self.record.total.to_string(),
            Column::Moneda => self.record.moneda.clone(),
            Column::Uuid => self.record.uuid.clone(),
            Column::NumeroFactura => self.record.invoice_number(),
            Column::DescripcionConcepto => {
                self.record.descripcion_concepto.clone().unwrap_or_default()
            }
            Column::UsoCfdi => self.record.uso_cfdi.clone().unwrap_or_default(),
            Column::MetodoPago => self.record.metodo_pago.clone().unwrap_or_default(),
            Column::FormaPago => self.record.forma_pago.clone().unwrap_or_default(),
            Column::ReceptorNombre => self.record.receptor_nombre.clone(),
            Column::ReceptorRfc => self.record.receptor_rfc.clone(),
            Column::ReceptorRegimenFiscal => {
                self.record.receptor_regimen_fiscal.clone().unwrap_or_default()
            }
        }
    }
}

/// The filtered, sorted report plus the counters shown to the operator.
#[derive(Debug, Clone)]
pub struct Report {
    /// Variant whose column set the rows are projected with.
    pub variant: SchemaVariant,

    /// Surviving rows, ascending by issuance date.
    pub rows: Vec<ReportRow>,

    /// Records handed to the builder before any filtering.
    pub records_in: usize,

    /// Records dropped because their date did not parse.
    pub skipped_dates: usize,

    /// Records dropped by the minimum-total filter.
    pub below_threshold: usize,
}

impl Report {
    /// Whether the report has no rows to export.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in the report.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Coerce a CFDI Fecha attribute into a timestamp.
///
/// Accepts the canonical `YYYY-MM-DDThh:mm:ss` form, the same with a trailing
/// timezone offset, and a bare date (taken as midnight).
pub fn parse_fecha(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Build the final report from the extracted records.
///
/// Coerces every record's date, drops rows at or below the minimum total,
/// sorts ascending by date (ties keep input order) and picks the projection
/// variant. An empty input produces an empty report, not an error.
///
/// A record whose date does not parse is skipped and counted, unless
/// `strict_dates` is set, in which case the first bad date fails the whole
/// batch with a [`DateParseError`].
pub fn build_report(records: Vec<InvoiceRecord>, config: &ReportConfig) -> Result<Report> {
    let records_in = records.len();
    let variant = config.variant.unwrap_or_else(|| {
        // Widest variant seen in the batch; 3.3 records leave the
        // 4.0-only columns empty.
        records
            .iter()
            .map(|r| r.variant)
            .max()
            .unwrap_or(SchemaVariant::V40)
    });

    let mut rows = Vec::with_capacity(records.len());
    let mut skipped_dates = 0;
    for record in records {
        match parse_fecha(&record.fecha) {
            Some(fecha) => rows.push(ReportRow { fecha, record }),
            None => {
                let err = DateParseError {
                    file: record.source_file.clone(),
                    value: record.fecha.clone(),
                };
                if config.strict_dates {
                    return Err(err.into());
                }
                warn!("{err}, record skipped");
                skipped_dates += 1;
            }
        }
    }

    let dated = rows.len();
    rows.retain(|row| row.record.total > config.min_total);
    let below_threshold = dated - rows.len();
    rows.sort_by_key(|row| row.fecha);

    debug!(
        records_in,
        skipped_dates,
        below_threshold,
        rows = rows.len(),
        version = %variant,
        "report built"
    );

    Ok(Report {
        variant,
        rows,
        records_in,
        skipped_dates,
        below_threshold,
    })
}
