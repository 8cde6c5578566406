//! Data models for source sheets, the canonical layout and configuration.

pub mod canonical;
pub mod config;
pub mod output;
pub mod source;

pub use canonical::{CanonicalField, CanonicalRecord, CanonicalTable, TaxOption};
pub use config::RecontConfig;
pub use output::OutputSheet;
pub use source::{CellValue, SourceRow, SourceTable};
