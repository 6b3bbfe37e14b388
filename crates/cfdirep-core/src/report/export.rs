//! CSV export of the final report.

use std::path::Path;

use tracing::info;

use super::builder::Report;
use crate::error::ExportError;

/// Write the report to a CSV file at `path`.
///
/// One header row with the variant's column names, one row per report row in
/// order. An existing file at `path` is overwritten. Callers are expected to
/// skip the call for an empty report; this function writes whatever it is
/// given, header included.
pub fn write_csv(report: &Report, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source: csv::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let columns = report.variant.columns();
    writer
        .write_record(columns.iter().map(|c| c.header()))
        .map_err(write_err)?;

    for row in &report.rows {
        writer
            .write_record(columns.iter().map(|c| row.value(*c)))
            .map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;

    info!(rows = report.len(), path = %path.display(), "report exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::cfdi::SchemaVariant;
    use crate::models::config::ReportConfig;
    use crate::models::invoice::InvoiceRecord;
    use crate::report::builder::build_report;

    fn sample_report(variant: SchemaVariant) -> Report {
        let mut rec = InvoiceRecord::new("factura.xml", variant);
        rec.serie = "A".to_string();
        rec.folio = "123".to_string();
        rec.fecha = "2024-01-15T10:30:00".to_string();
        rec.total = Decimal::from_str("500.50").unwrap();
        rec.moneda = "MXN".to_string();
        rec.uuid = "ABC-123".to_string();
        rec.emisor_nombre = "Proveedora del Centro".to_string();
        rec.emisor_rfc = "AAA010101AAA".to_string();
        rec.uso_cfdi = Some("G03".to_string());

        build_report(vec![rec], &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_single_row_v40_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reporte.csv");

        write_csv(&sample_report(SchemaVariant::V40), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Fecha,EmisorNombre,EmisorRFC,Total,Moneda,UUID,NumeroFactura,\
             DescripcionConcepto,UsoCFDI,MetodoPago,FormaPago,ReceptorNombre,\
             ReceptorRFC,ReceptorRegimenFiscal"
        );

        let cells: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(cells[0], "2024-01-15 10:30:00");
        assert_eq!(cells[1], "Proveedora del Centro");
        assert_eq!(cells[3], "500.50");
        assert_eq!(cells[5], "ABC-123");
        assert_eq!(cells[6], "A123");
        assert_eq!(cells[8], "G03");
    }

    #[test]
    fn test_v33_header_has_no_v40_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reporte.csv");

        write_csv(&sample_report(SchemaVariant::V33), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "Fecha,EmisorNombre,Total,UUID,NumeroFactura,UsoCFDI,MetodoPago,FormaPago"
        );
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reporte.csv");
        std::fs::write(&path, "stale contents").unwrap();

        write_csv(&sample_report(SchemaVariant::V40), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Fecha,"));
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_unwritable_path_is_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("reporte.csv");

        let err = write_csv(&sample_report(SchemaVariant::V40), &path).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
    }
}
