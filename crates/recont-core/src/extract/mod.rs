//! Canonical extraction: document-type classification, row-style probing,
//! tax derivation and normalization.

mod extractor;
pub mod normalizer;
pub mod rules;
pub mod styles;

pub use extractor::{ExtractionResult, SheetExtractor};
pub use normalizer::{default_value, normalize};
pub use rules::{classify, derive_tax, DocumentType, TaxDerivation, TaxRule};
pub use styles::{RowContext, RowStyle, StyleChain, StyleMatch};
