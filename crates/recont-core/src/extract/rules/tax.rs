//! VAT option and article description derivation.
//!
//! The rule is chosen from the row's own fields only; no rate or fiscal code is
//! checked against an external registry.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::canonical::TaxOption;
use crate::models::source::{CellValue, SourceRow};

use super::fiscal::is_vat_registered;

/// Fallback percentage field, read when the supplier is not VAT registered.
pub const FALLBACK_PERCENT_FIELD: &str = "Procent TVA";

/// Secondary fallback percentage field (goods-receipt exports).
pub const NIR_PERCENT_FIELD: &str = "% TVA Ach";

/// File name marker of the flat-rate retail channels (canteen, restaurant, warehouse).
pub const FLAT_CHANNEL_MARKER: &str = "AMT";

/// Article description reserved for deposit-return surcharge lines.
pub const DEPOSIT_RETURN_ARTICLE: &str = "SGR";

/// Branch of the tax decision taken for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxRule {
    /// Supplier without the `RO` prefix and a zero tax field.
    ForeignExempt { percentage: i64 },
    /// Registered supplier, zero tax field: deposit-return line.
    DepositReturn,
    /// Non-zero tax field.
    Taxable { rate: i64, flat_channel: bool },
    /// A numeric field could not be read.
    Fallback,
}

/// Derived article description and VAT option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxDerivation {
    pub article: String,
    pub option: TaxOption,
}

impl TaxDerivation {
    /// Placeholder used when a row cannot be read; easy to spot downstream.
    pub fn fallback(label: &str) -> Self {
        Self {
            article: format!("{label} 0%"),
            option: TaxOption::Taxabile,
        }
    }
}

impl TaxRule {
    /// Render the rule for a merchandise label.
    pub fn derive(self, label: &str) -> TaxDerivation {
        match self {
            Self::ForeignExempt { percentage } => TaxDerivation {
                article: format!("{label} {percentage}%"),
                option: TaxOption::Scutite,
            },
            Self::DepositReturn => TaxDerivation {
                article: DEPOSIT_RETURN_ARTICLE.to_string(),
                option: TaxOption::Scutite,
            },
            Self::Taxable { flat_channel: true, .. } => TaxDerivation {
                article: label.to_string(),
                option: TaxOption::Taxabile,
            },
            Self::Taxable { rate, flat_channel: false } => TaxDerivation {
                article: format!("{label} {rate}%"),
                option: TaxOption::Taxabile,
            },
            Self::Fallback => TaxDerivation::fallback(label),
        }
    }
}

/// Read an integer percentage from a cell.
///
/// Missing or blank cells count as zero. Commas are read as decimal points and
/// a value is accepted only when it is integral (`"19"`, `"19,00"`, `19.0`).
/// Anything else yields `None`.
pub fn parse_rate(cell: Option<&CellValue>) -> Option<i64> {
    let Some(cell) = cell else {
        return Some(0);
    };

    match cell {
        CellValue::Empty => Some(0),
        CellValue::Int(i) => Some(*i),
        CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        CellValue::Text(s) => {
            let text = s.trim().replace(',', ".");
            if text.is_empty() {
                return Some(0);
            }
            text.parse::<i64>().ok().or_else(|| {
                let value: Decimal = text.parse().ok()?;
                if value.fract().is_zero() { value.to_i64() } else { None }
            })
        }
        _ => None,
    }
}

/// Choose the tax rule for a row.
///
/// `fiscal_code` is the raw code, before the `RO` prefix is stripped, and
/// `source_file_name` decides whether the flat-rate channel format applies.
pub fn tax_rule(
    fiscal_code: &str,
    row: &SourceRow,
    tax_field: &str,
    source_file_name: &str,
) -> TaxRule {
    let Some(tax_value) = parse_rate(row.get(tax_field)) else {
        return TaxRule::Fallback;
    };

    if !is_vat_registered(fiscal_code) && tax_value == 0 {
        let percent_field = if row.contains(FALLBACK_PERCENT_FIELD) {
            FALLBACK_PERCENT_FIELD
        } else {
            NIR_PERCENT_FIELD
        };
        return match parse_rate(row.get(percent_field)) {
            Some(percentage) => TaxRule::ForeignExempt { percentage },
            None => TaxRule::Fallback,
        };
    }

    if tax_value == 0 {
        return TaxRule::DepositReturn;
    }

    TaxRule::Taxable {
        rate: tax_value,
        flat_channel: source_file_name.contains(FLAT_CHANNEL_MARKER),
    }
}

/// Derive the article description and VAT option for a row.
pub fn derive_tax(
    fiscal_code: &str,
    row: &SourceRow,
    label: &str,
    tax_field: &str,
    source_file_name: &str,
) -> TaxDerivation {
    tax_rule(fiscal_code, row, tax_field, source_file_name).derive(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_supplier_uses_fallback_percentage() {
        let row = SourceRow::new()
            .with("TVA Achizitie", "0")
            .with("Procent TVA", "9");

        let result = derive_tax("12345", &row, "Marfa M1", "TVA Achizitie", "Invoice_M1.xlsx");

        assert_eq!(result.article, "Marfa M1 9%");
        assert_eq!(result.option, TaxOption::Scutite);
    }

    #[test]
    fn test_foreign_supplier_reads_nir_percentage() {
        let row = SourceRow::new().with("% TVA Ach", 11i64);

        let result = derive_tax("12345", &row, "Marfa M2", "Cota TVA B", "x.xlsx");

        assert_eq!(result.article, "Marfa M2 11%");
        assert_eq!(result.option, TaxOption::Scutite);
    }

    #[test]
    fn test_registered_zero_rate_is_deposit_return() {
        let row = SourceRow::new().with("TVA Achizitie", 0i64);

        let result = derive_tax("RO12345", &row, "Marfa M1", "TVA Achizitie", "Invoice_M1.xlsx");

        assert_eq!(result.article, "SGR");
        assert_eq!(result.option, TaxOption::Scutite);
    }

    #[test]
    fn test_taxable_includes_rate() {
        let row = SourceRow::new().with("TVA Achizitie", "19");

        let result = derive_tax("RO12345", &row, "Marfa M2", "TVA Achizitie", "Invoice_M2_001.xlsx");

        assert_eq!(result.article, "Marfa M2 19%");
        assert_eq!(result.option, TaxOption::Taxabile);
    }

    #[test]
    fn test_flat_channel_uses_label_only() {
        let row = SourceRow::new().with("TVA Achizitie", "19");

        let result = derive_tax("RO12345", &row, "restaurant", "TVA Achizitie", "AMTR_report.xlsx");

        assert_eq!(result.article, "restaurant");
        assert_eq!(result.option, TaxOption::Taxabile);
    }

    #[test]
    fn test_malformed_rate_falls_back() {
        let row = SourceRow::new().with("TVA Achizitie", "nouasprezece");

        let rule = tax_rule("RO12345", &row, "TVA Achizitie", "Invoice_M1.xlsx");
        assert_eq!(rule, TaxRule::Fallback);

        let result = rule.derive("Marfa M1");
        assert_eq!(result.article, "Marfa M1 0%");
        assert_eq!(result.option, TaxOption::Taxabile);
    }

    #[test]
    fn test_fallback_branch_directly() {
        assert_eq!(
            TaxRule::Fallback.derive("depozit"),
            TaxDerivation::fallback("depozit")
        );
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate(None), Some(0));
        assert_eq!(parse_rate(Some(&CellValue::Empty)), Some(0));
        assert_eq!(parse_rate(Some(&"  ".into())), Some(0));
        assert_eq!(parse_rate(Some(&"19".into())), Some(19));
        assert_eq!(parse_rate(Some(&"19,00".into())), Some(19));
        assert_eq!(parse_rate(Some(&CellValue::Float(9.0))), Some(9));
        assert_eq!(parse_rate(Some(&CellValue::Float(9.5))), None);
        assert_eq!(parse_rate(Some(&"9,5".into())), None);
        assert_eq!(parse_rate(Some(&CellValue::Error("#VALUE!".into()))), None);
    }

    #[test]
    fn test_missing_tax_field_counts_as_zero() {
        let row = SourceRow::new();

        assert_eq!(
            tax_rule("RO1", &row, "TVA Achizitie", "a.xlsx"),
            TaxRule::DepositReturn
        );
        assert_eq!(
            tax_rule("1", &row, "TVA Achizitie", "a.xlsx"),
            TaxRule::ForeignExempt { percentage: 0 }
        );
    }
}
