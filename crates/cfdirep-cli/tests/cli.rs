//! End-to-end tests for the cfdirep binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cfdirep() -> Command {
    Command::cargo_bin("cfdirep").unwrap()
}

fn v40_invoice(fecha: &str, total: &str, uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Version="4.0"
    Serie="A" Folio="123" Fecha="{fecha}"
    SubTotal="431.47" Total="{total}" Moneda="MXN"
    TipoDeComprobante="I" MetodoPago="PUE" FormaPago="03">
  <cfdi:Emisor Rfc="AAA010101AAA" Nombre="Proveedora del Centro"/>
  <cfdi:Receptor Rfc="BBB020202BBB" Nombre="Comercial del Norte" UsoCFDI="G03"
      RegimenFiscalReceptor="603"/>
  <cfdi:Conceptos>
    <cfdi:Concepto Descripcion="Licencia anual de software" ValorUnitario="431.47" Importe="431.47"/>
  </cfdi:Conceptos>
  <cfdi:Impuestos TotalImpuestosTrasladados="69.03"/>
  <cfdi:Complemento>
    <tfd:TimbreFiscalDigital xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital"
        Version="1.1" UUID="{uuid}"/>
  </cfdi:Complemento>
</cfdi:Comprobante>"#
    )
}

fn v33_invoice(fecha: &str, total: &str, uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/3" Version="3.3"
    Serie="B" Folio="77" Fecha="{fecha}"
    SubTotal="100.00" Total="{total}" Moneda="MXN"
    TipoDeComprobante="I" MetodoPago="PPD" FormaPago="99">
  <cfdi:Emisor Rfc="CCC030303CCC" Nombre="Servicios del Sur"/>
  <cfdi:Receptor Rfc="DDD040404DDD" Nombre="Cliente Occidente" UsoCFDI="P01"/>
  <cfdi:Complemento>
    <tfd:TimbreFiscalDigital xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital"
        Version="1.1" UUID="{uuid}"/>
  </cfdi:Complemento>
</cfdi:Comprobante>"#
    )
}

fn run_in(input: &Path, output: &Path) -> Command {
    let mut cmd = cfdirep();
    cmd.args([
        "run",
        "--input-dir",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    cmd
}

#[test]
fn creates_missing_input_dir_and_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created input directory"));

    assert!(input.is_dir());
    assert!(!output.exists());
}

#[test]
fn empty_input_dir_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("No valid invoices found"))
        .stdout(predicate::str::contains("No data to export"));

    assert!(!output.exists());
}

#[test]
fn v40_invoice_is_reported_and_moved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    let source = input.join("factura.xml");
    fs::write(&source, v40_invoice("2024-01-15T10:30:00", "500.50", "ABC-123")).unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed factura.xml"))
        .stdout(predicate::str::contains("Report written to"));

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Fecha,EmisorNombre,EmisorRFC,Total,Moneda,UUID"));
    assert!(lines[1].contains("500.50"));
    assert!(lines[1].contains("ABC-123"));
    assert!(lines[1].contains("Proveedora del Centro"));

    // 4.0 sources are moved out of the input directory after extraction.
    assert!(!source.exists());
    assert!(input.join("procesados_xml").join("factura.xml").exists());
}

#[test]
fn v33_invoice_stays_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    let source = input.join("vieja.xml");
    fs::write(&source, v33_invoice("2023-06-01T09:00:00", "116.00", "DEF-456")).unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output).assert().success();

    assert!(source.exists());
    assert!(!input.join("procesados_xml").exists());

    let content = fs::read_to_string(&output).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(
        header,
        "Fecha,EmisorNombre,Total,UUID,NumeroFactura,UsoCFDI,MetodoPago,FormaPago"
    );
}

#[test]
fn keep_files_suppresses_the_move() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    let source = input.join("factura.xml");
    fs::write(&source, v40_invoice("2024-01-15T10:30:00", "500.50", "ABC-123")).unwrap();
    let output = dir.path().join("reporte.csv");

    let mut cmd = run_in(&input, &output);
    cmd.arg("--keep-files").assert().success();

    assert!(source.exists());
    assert!(!input.join("procesados_xml").exists());
}

#[test]
fn malformed_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("rota.xml"), "<cfdi:Comprobante").unwrap();
    fs::write(
        input.join("buena.xml"),
        v40_invoice("2024-01-15T10:30:00", "500.50", "ABC-123"),
    )
    .unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped files:"))
        .stdout(predicate::str::contains("rota.xml"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("ABC-123"));
}

#[test]
fn totals_at_or_below_threshold_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("boundary.xml"),
        v40_invoice("2024-01-15T10:30:00", "1.00", "AAA-111"),
    )
    .unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("No data to export"));

    assert!(!output.exists());
}

#[test]
fn rows_are_sorted_by_date() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("segunda.xml"),
        v40_invoice("2024-01-02T00:00:00", "200.00", "LATER-UUID"),
    )
    .unwrap();
    fs::write(
        input.join("primera.xml"),
        v40_invoice("2024-01-01T00:00:00", "100.00", "EARLIER-UUID"),
    )
    .unwrap();
    let output = dir.path().join("reporte.csv");

    run_in(&input, &output).assert().success();

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("EARLIER-UUID"));
    assert!(lines[2].contains("LATER-UUID"));
}

#[test]
fn strict_dates_abort_on_bad_date() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("facturas_xml");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("factura.xml"),
        v40_invoice("mañana", "500.50", "ABC-123"),
    )
    .unwrap();
    let output = dir.path().join("reporte.csv");

    let mut cmd = run_in(&input, &output);
    cmd.arg("--strict-dates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unparseable date"));

    assert!(!output.exists());
}

#[test]
fn inspect_prints_record_json() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("factura.xml");
    fs::write(&source, v40_invoice("2024-01-15T10:30:00", "500.50", "ABC-123")).unwrap();

    cfdirep()
        .args(["inspect", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"uuid\": \"ABC-123\""))
        .stdout(predicate::str::contains("\"total\": \"500.50\""));

    // Inspection never moves the source file.
    assert!(source.exists());
}
