//! Row styles: the historical column-naming conventions of source exports.
//!
//! Each style names the source fields it reads. Rows are probed against the
//! styles of a [`StyleChain`] in order and the first style that reads the row
//! without error wins, so files mixing conventions are still handled.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StyleError;
use crate::models::canonical::{CanonicalField, CanonicalRecord};
use crate::models::source::{CellValue, SourceRow};

use super::rules::dates::normalize_date;
use super::rules::fiscal::strip_vat_prefix;
use super::rules::tax::derive_tax;

/// Source field names read by one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleFields {
    pub document_number: &'static str,
    pub date: &'static str,
    pub price: &'static str,
    pub partner: &'static str,
    pub fiscal_code: &'static str,
    pub tax_field: &'static str,
}

const STYLE1_FIELDS: StyleFields = StyleFields {
    document_number: "Numar Factura",
    date: "Data Document",
    price: "Valoare Achizitie",
    partner: "Nume",
    fiscal_code: "CUI/CNP",
    tax_field: "TVA Achizitie",
};

const STYLE2_FIELDS: StyleFields = StyleFields {
    document_number: "Numar Factura",
    date: "Data Factura",
    price: "ValoareAchizitie Fara TVA",
    partner: "Partener",
    fiscal_code: "Cod Fiscal Partener",
    tax_field: "Cota TVA B",
};

const NIR_FIELDS: StyleFields = StyleFields {
    document_number: "NIR",
    date: "Data NIR",
    price: "Valoare",
    partner: "Furnizor",
    fiscal_code: "CUI",
    tax_field: "% TVA Ach",
};

/// A historical export convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStyle {
    /// Purchase journal export ("Data Document", "CUI/CNP").
    Style1,
    /// Partner invoice export ("Data Factura", "Cod Fiscal Partener").
    Style2,
    /// Goods-receipt note export ("NIR", "Furnizor").
    Nir,
}

impl RowStyle {
    /// Default probing order.
    pub const DEFAULT_ORDER: [RowStyle; 3] = [Self::Style1, Self::Style2, Self::Nir];

    pub fn name(self) -> &'static str {
        match self {
            Self::Style1 => "Style 1",
            Self::Style2 => "Style 2",
            Self::Nir => "Style 3",
        }
    }

    pub fn fields(self) -> &'static StyleFields {
        match self {
            Self::Style1 => &STYLE1_FIELDS,
            Self::Style2 => &STYLE2_FIELDS,
            Self::Nir => &NIR_FIELDS,
        }
    }
}

impl std::fmt::Display for RowStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-file values every row extraction needs.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Merchandise label derived from the document type.
    pub merchandise_label: &'a str,
    /// Name of the file being processed.
    pub source_file_name: &'a str,
    /// Currency written to every row.
    pub currency: &'a str,
}

/// Successful style match for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMatch {
    pub style: RowStyle,
    pub record: CanonicalRecord,
}

/// Ordered list of styles probed for every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleChain {
    styles: Vec<RowStyle>,
    strict: bool,
}

impl Default for StyleChain {
    fn default() -> Self {
        Self::new(RowStyle::DEFAULT_ORDER.to_vec())
    }
}

impl StyleChain {
    pub fn new(styles: Vec<RowStyle>) -> Self {
        Self {
            styles,
            strict: false,
        }
    }

    /// Reject styles whose identifying fields are all missing.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn styles(&self) -> &[RowStyle] {
        &self.styles
    }

    /// Probe the styles in order and keep the first that reads the row.
    ///
    /// On failure every style's error is returned, in probing order.
    pub fn extract_row(
        &self,
        row: &SourceRow,
        ctx: &RowContext<'_>,
        row_index: usize,
    ) -> Result<StyleMatch, Vec<(RowStyle, StyleError)>> {
        let mut errors = Vec::with_capacity(self.styles.len());

        for &style in &self.styles {
            match apply_style(style, row, ctx, self.strict) {
                Ok(record) => return Ok(StyleMatch { style, record }),
                Err(e) => {
                    debug!("Row {} rejected by {}: {}", row_index, style, e);
                    errors.push((style, e));
                }
            }
        }

        Err(errors)
    }
}

/// Read one row with a single style.
///
/// Absent fields become empty strings (or `"0"` for the price); the style only
/// fails when the date cell holds a spreadsheet error, or in strict mode when
/// neither the document number nor the date is present.
pub fn apply_style(
    style: RowStyle,
    row: &SourceRow,
    ctx: &RowContext<'_>,
    strict: bool,
) -> Result<CanonicalRecord, StyleError> {
    let fields = style.fields();

    if strict && row.text(fields.document_number).is_none() && row.text(fields.date).is_none() {
        return Err(StyleError::NoFields(format!(
            "{:?}, {:?}",
            fields.document_number, fields.date
        )));
    }

    let raw_date = match row.get(fields.date) {
        Some(CellValue::Error(value)) => {
            return Err(StyleError::ErrorCell {
                field: fields.date.to_string(),
                value: value.clone(),
            });
        }
        Some(cell) => cell.to_text(),
        None => String::new(),
    };

    Ok(fill_basic_data(
        &row.text_or(fields.document_number, ""),
        &raw_date,
        &row.text_or(fields.price, "0"),
        &row.text_or(fields.partner, ""),
        &row.text_or(fields.fiscal_code, ""),
        row,
        ctx,
        fields.tax_field,
    ))
}

/// Shared filler used by every style once its fields are read.
#[allow(clippy::too_many_arguments)]
fn fill_basic_data(
    document_number: &str,
    raw_date: &str,
    price: &str,
    partner: &str,
    fiscal_code: &str,
    row: &SourceRow,
    ctx: &RowContext<'_>,
    tax_field: &str,
) -> CanonicalRecord {
    let date = normalize_date(raw_date);
    let mut record = CanonicalRecord::new();

    record.set(CanonicalField::DocumentNumber, document_number);
    record.set(CanonicalField::Date, date.clone());
    record.set(CanonicalField::DueDate, date);
    record.set(CanonicalField::ListPrice, price);
    record.set(CanonicalField::PartnerName, partner);
    record.set(CanonicalField::FiscalCode, strip_vat_prefix(fiscal_code));
    record.set(CanonicalField::VatRate, row.text_or(tax_field, "0"));
    record.set(CanonicalField::Currency, ctx.currency);
    record.set(CanonicalField::Quantity, "1");

    let tax = derive_tax(
        fiscal_code,
        row,
        ctx.merchandise_label,
        tax_field,
        ctx.source_file_name,
    );
    record.set(CanonicalField::ArticleName, tax.article);
    record.set(CanonicalField::VatOption, tax.option.as_str());

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx<'a>(label: &'a str, file: &'a str) -> RowContext<'a> {
        RowContext {
            merchandise_label: label,
            source_file_name: file,
            currency: "RON",
        }
    }

    #[test]
    fn test_style1_row() {
        let row = SourceRow::new()
            .with("Numar Factura", "F-100")
            .with("Data Document", "2024-03-14 00:00:00")
            .with("Valoare Achizitie", 250.5)
            .with("Nume", "ACME SRL")
            .with("CUI/CNP", "RO12345")
            .with("TVA Achizitie", "19");

        let record = apply_style(RowStyle::Style1, &row, &ctx("Marfa M1", "Intrari_M1.xlsx"), false)
            .unwrap();

        assert_eq!(record.get(CanonicalField::DocumentNumber), Some("F-100"));
        assert_eq!(record.get(CanonicalField::Date), Some("20240314"));
        assert_eq!(record.get(CanonicalField::DueDate), Some("20240314"));
        assert_eq!(record.get(CanonicalField::ListPrice), Some("250.5"));
        assert_eq!(record.get(CanonicalField::PartnerName), Some("ACME SRL"));
        assert_eq!(record.get(CanonicalField::FiscalCode), Some("12345"));
        assert_eq!(record.get(CanonicalField::VatRate), Some("19"));
        assert_eq!(record.get(CanonicalField::Currency), Some("RON"));
        assert_eq!(record.get(CanonicalField::Quantity), Some("1"));
        assert_eq!(record.get(CanonicalField::ArticleName), Some("Marfa M1 19%"));
        assert_eq!(record.get(CanonicalField::VatOption), Some("TAXABILE"));
    }

    #[test]
    fn test_nir_style_reads_its_own_fields() {
        let row = SourceRow::new()
            .with("NIR", "77")
            .with("Data NIR", "2024-01-05")
            .with("Valoare", 10i64)
            .with("Furnizor", "Furnizor SA")
            .with("CUI", "998877")
            .with("% TVA Ach", "0");

        let record = apply_style(RowStyle::Nir, &row, &ctx("depozit", "DEPOZIT.xlsx"), false).unwrap();

        assert_eq!(record.get(CanonicalField::DocumentNumber), Some("77"));
        assert_eq!(record.get(CanonicalField::Date), Some("20240105"));
        assert_eq!(record.get(CanonicalField::ArticleName), Some("depozit 0%"));
        assert_eq!(record.get(CanonicalField::VatOption), Some("SCUTITE"));
    }

    #[test]
    fn test_chain_accepts_empty_row_with_first_style() {
        let row = SourceRow::new().with("Ceva", "altceva");

        let matched = StyleChain::default()
            .extract_row(&row, &ctx("marfa", "export.xlsx"), 1)
            .unwrap();

        assert_eq!(matched.style, RowStyle::Style1);
        assert_eq!(matched.record.get(CanonicalField::DocumentNumber), Some(""));
        assert_eq!(matched.record.get(CanonicalField::Date), Some(""));
        assert_eq!(matched.record.get(CanonicalField::ListPrice), Some("0"));
        assert_eq!(matched.record.get(CanonicalField::VatRate), Some("0"));
        assert_eq!(matched.record.get(CanonicalField::ArticleName), Some("marfa 0%"));
        assert_eq!(matched.record.get(CanonicalField::VatOption), Some("SCUTITE"));
    }

    #[test]
    fn test_chain_falls_through_on_error_cell() {
        let row = SourceRow::new()
            .with("Data Document", CellValue::Error("#VALUE!".into()))
            .with("Numar Factura", "F-9")
            .with("Data Factura", "2024-02-01")
            .with("Cod Fiscal Partener", "RO555")
            .with("Cota TVA B", "9");

        let matched = StyleChain::default()
            .extract_row(&row, &ctx("Marfa M2", "M2.xlsx"), 3)
            .unwrap();

        assert_eq!(matched.style, RowStyle::Style2);
        assert_eq!(matched.record.get(CanonicalField::Date), Some("20240201"));
        assert_eq!(matched.record.get(CanonicalField::ArticleName), Some("Marfa M2 9%"));
    }

    #[test]
    fn test_chain_reports_every_failure() {
        let error = CellValue::Error("#REF!".into());
        let row = SourceRow::new()
            .with("Data Document", error.clone())
            .with("Data Factura", error.clone())
            .with("Data NIR", error);

        let errors = StyleChain::default()
            .extract_row(&row, &ctx("marfa", "x.xlsx"), 1)
            .unwrap_err();

        let styles: Vec<RowStyle> = errors.iter().map(|(s, _)| *s).collect();
        assert_eq!(styles, RowStyle::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn test_strict_chain_skips_absent_styles() {
        let row = SourceRow::new()
            .with("NIR", "12")
            .with("Data NIR", "2024-06-30");

        let chain = StyleChain::default().with_strict(true);
        let matched = chain.extract_row(&row, &ctx("marfa", "x.xlsx"), 1).unwrap();
        assert_eq!(matched.style, RowStyle::Nir);

        let empty = SourceRow::new();
        let errors = chain.extract_row(&empty, &ctx("marfa", "x.xlsx"), 2).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0].1, StyleError::NoFields(_)));
    }

    #[test]
    fn test_custom_order_is_respected() {
        let chain = StyleChain::new(vec![RowStyle::Nir, RowStyle::Style1]);
        let matched = chain
            .extract_row(&SourceRow::new(), &ctx("marfa", "x.xlsx"), 1)
            .unwrap();

        assert_eq!(chain.styles(), &[RowStyle::Nir, RowStyle::Style1]);
        assert_eq!(matched.style, RowStyle::Nir);
    }
}
