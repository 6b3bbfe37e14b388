//! Report pipeline: aggregation, filtering, sorting and export.

mod builder;
mod export;

pub use builder::{build_report, parse_fecha, Report, ReportRow};
pub use export::write_csv;
