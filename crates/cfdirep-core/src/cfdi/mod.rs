//! CFDI document handling: schema variants and field extraction.

mod extractor;
mod variant;

pub use extractor::RecordExtractor;
pub use variant::{Column, SchemaVariant, CFDI_NS_33, CFDI_NS_40, TFD_NS};
