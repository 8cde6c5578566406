//! Rule-based field helpers for retail invoice sheets.

pub mod dates;
pub mod document_type;
pub mod fiscal;
pub mod patterns;
pub mod tax;

pub use dates::{format_date, format_date_with, normalize_date, parse_date};
pub use document_type::{classify, DocumentType};
pub use fiscal::{is_vat_registered, strip_vat_prefix};
pub use tax::{derive_tax, parse_rate, tax_rule, TaxDerivation, TaxRule};
