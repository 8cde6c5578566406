//! Core library for reshaping Romanian retail invoice spreadsheets.
//!
//! This crate provides:
//! - Spreadsheet loading and writing (calamine, rust_xlsxwriter)
//! - Document-type classification from file names
//! - Row-style probing with per-row fallback into the 43-column import layout
//! - Tax-derivation rules (foreign-exempt, deposit-return, taxable, fallback)
//! - Column transforms: negated values, SGR split, VAT-rate markup summary

pub mod error;
pub mod extract;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod transforms;

pub use error::{LoadError, RecontError, Result, StyleError, TransformError, WriteError};
pub use extract::{
    classify, derive_tax, DocumentType, ExtractionResult, RowContext, RowStyle, SheetExtractor,
    StyleChain, TaxDerivation, TaxRule,
};
pub use io::{SheetReader, SheetWriter, XlsxReader, XlsxWriter};
pub use models::{
    CanonicalField, CanonicalRecord, CanonicalTable, CellValue, OutputSheet, RecontConfig,
    SourceRow, SourceTable, TaxOption,
};
pub use pipeline::{Pipeline, ProcessReport};
pub use transforms::{ProcessKind, SheetTransform, Transformed};
