//! Extraction of flat invoice records from CFDI XML documents.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use rust_decimal::Decimal;
use tracing::debug;

use super::variant::{SchemaVariant, TFD_NS};
use crate::error::{CfdiError, ExtractionError, ParseError, Result};
use crate::models::invoice::InvoiceRecord;

/// Extracts one [`InvoiceRecord`] per CFDI document.
///
/// Extraction is a pure function from document to record-or-error: moving a
/// processed file out of the input directory is the orchestrator's job, not
/// this type's. Optional sub-elements (issuer, recipient, fiscal stamp, tax
/// totals) may legitimately be absent; the corresponding fields stay at their
/// defaults. Only a malformed document, a non-numeric amount, or an
/// unrecognized namespace is an error.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    /// Currency assumed when the document carries no Moneda attribute.
    default_currency: String,
    /// When set, only documents of this variant are accepted.
    variant: Option<SchemaVariant>,
}

impl RecordExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            default_currency: "MXN".to_string(),
            variant: None,
        }
    }

    /// Set the fallback currency code.
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Pin the accepted schema variant instead of detecting it per document.
    pub fn with_variant(mut self, variant: SchemaVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Extract a record from an XML file on disk.
    pub fn extract_path(&self, path: &Path) -> Result<InvoiceRecord> {
        let source_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let file = File::open(path)?;
        self.read_document(NsReader::from_reader(BufReader::new(file)), &source_file)
    }

    /// Extract a record from an in-memory XML document.
    pub fn extract_str(&self, xml: &str, source_file: &str) -> Result<InvoiceRecord> {
        self.read_document(NsReader::from_reader(xml.as_bytes()), source_file)
    }

    fn read_document<R: BufRead>(
        &self,
        mut reader: NsReader<R>,
        source_file: &str,
    ) -> Result<InvoiceRecord> {
        let mut buf = Vec::new();
        let mut record: Option<InvoiceRecord> = None;
        let mut depth = 0usize;
        let mut in_conceptos = false;
        let mut concepto_seen = false;

        loop {
            match reader.read_resolved_event_into(&mut buf) {
                Err(e) => return Err(xml_error(source_file, e)),
                Ok((ns, Event::Start(e))) => {
                    self.handle_element(
                        &ns,
                        &e,
                        depth,
                        source_file,
                        &mut record,
                        &mut in_conceptos,
                        &mut concepto_seen,
                    )?;
                    depth += 1;
                }
                Ok((ns, Event::Empty(e))) => {
                    self.handle_element(
                        &ns,
                        &e,
                        depth,
                        source_file,
                        &mut record,
                        &mut in_conceptos,
                        &mut concepto_seen,
                    )?;
                }
                Ok((_, Event::End(e))) => {
                    depth = depth.saturating_sub(1);
                    if e.local_name().as_ref() == b"Conceptos" {
                        in_conceptos = false;
                    }
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
            }
            buf.clear();
        }

        record.ok_or_else(|| ExtractionError::MissingRoot.into())
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_element(
        &self,
        ns: &ResolveResult<'_>,
        e: &BytesStart<'_>,
        depth: usize,
        source_file: &str,
        record: &mut Option<InvoiceRecord>,
        in_conceptos: &mut bool,
        concepto_seen: &mut bool,
    ) -> Result<()> {
        if depth == 0 {
            *record = Some(self.read_root(ns, e, source_file)?);
            return Ok(());
        }

        let Some(rec) = record.as_mut() else {
            return Ok(());
        };
        let local = e.local_name();

        if element_ns(ns) == Some(rec.variant.namespace().as_bytes()) {
            match (depth, local.as_ref()) {
                (1, b"Emisor") => {
                    for_each_attr(e, source_file, |key, value| {
                        match key {
                            b"Rfc" => rec.emisor_rfc = value,
                            b"Nombre" => rec.emisor_nombre = value,
                            _ => {}
                        }
                        Ok(())
                    })?;
                }
                (1, b"Receptor") => {
                    let extracts_regimen = rec.variant.extracts_regimen();
                    for_each_attr(e, source_file, |key, value| {
                        match key {
                            b"Rfc" => rec.receptor_rfc = value,
                            b"Nombre" => rec.receptor_nombre = value,
                            b"UsoCFDI" => rec.uso_cfdi = Some(value),
                            b"RegimenFiscalReceptor" if extracts_regimen => {
                                rec.receptor_regimen_fiscal = Some(value);
                            }
                            _ => {}
                        }
                        Ok(())
                    })?;
                }
                // Only the document-level tax summary counts; line items
                // carry their own nested Impuestos nodes.
                (1, b"Impuestos") => {
                    for_each_attr(e, source_file, |key, value| {
                        if key == b"TotalImpuestosTrasladados" {
                            rec.total_impuestos = parse_amount("TotalImpuestosTrasladados", &value)?;
                        }
                        Ok(())
                    })?;
                }
                (1, b"Conceptos") => *in_conceptos = true,
                (2, b"Concepto")
                    if *in_conceptos && !*concepto_seen && rec.variant.extracts_concepto() =>
                {
                    *concepto_seen = true;
                    for_each_attr(e, source_file, |key, value| {
                        if key == b"Descripcion" {
                            rec.descripcion_concepto = Some(value);
                        }
                        Ok(())
                    })?;
                }
                _ => {}
            }
        } else if element_ns(ns) == Some(TFD_NS.as_bytes())
            && local.as_ref() == b"TimbreFiscalDigital"
        {
            for_each_attr(e, source_file, |key, value| {
                if key == b"UUID" {
                    rec.uuid = value;
                }
                Ok(())
            })?;
        }

        Ok(())
    }

    fn read_root(
        &self,
        ns: &ResolveResult<'_>,
        e: &BytesStart<'_>,
        source_file: &str,
    ) -> Result<InvoiceRecord> {
        let detected = match element_ns(ns).and_then(|uri| {
            SchemaVariant::from_namespace(&String::from_utf8_lossy(uri))
        }) {
            Some(variant) => variant,
            None => {
                let uri = element_ns(ns)
                    .map(|u| String::from_utf8_lossy(u).into_owned())
                    .unwrap_or_default();
                return Err(ExtractionError::UnknownNamespace(uri).into());
            }
        };

        if let Some(expected) = self.variant {
            if expected != detected {
                return Err(ExtractionError::VariantMismatch {
                    expected,
                    found: detected,
                }
                .into());
            }
        }
        debug!(file = source_file, version = %detected, "detected CFDI variant");

        let mut rec = InvoiceRecord::new(source_file, detected);
        rec.moneda = self.default_currency.clone();

        for_each_attr(e, source_file, |key, value| {
            match key {
                b"Serie" => rec.serie = value,
                b"Folio" => rec.folio = value,
                b"Fecha" => rec.fecha = value,
                b"Total" => rec.total = parse_amount("Total", &value)?,
                b"SubTotal" => rec.subtotal = parse_amount("SubTotal", &value)?,
                b"Moneda" => rec.moneda = value,
                b"TipoDeComprobante" => rec.tipo_comprobante = Some(value),
                b"MetodoPago" => rec.metodo_pago = Some(value),
                b"FormaPago" => rec.forma_pago = Some(value),
                _ => {}
            }
            Ok(())
        })?;

        Ok(rec)
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn element_ns<'a>(resolve: &ResolveResult<'a>) -> Option<&'a [u8]> {
    match resolve {
        ResolveResult::Bound(Namespace(ns)) => Some(*ns),
        _ => None,
    }
}

fn xml_error(file: &str, source: impl Into<quick_xml::Error>) -> CfdiError {
    CfdiError::Parse(ParseError::Xml {
        file: file.to_string(),
        source: source.into(),
    })
}

fn parse_amount(field: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| {
        ExtractionError::Parse {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

fn for_each_attr(
    e: &BytesStart<'_>,
    source_file: &str,
    mut f: impl FnMut(&[u8], String) -> Result<()>,
) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(source_file, err))?;
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(source_file, err))?
            .into_owned();
        f(attr.key.local_name().as_ref(), value)?;
    }
    Ok(())
}
