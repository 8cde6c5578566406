//! Markup ("adaos") report grouped by sale VAT rate, with a totals block.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::extract::rules::dates::format_date_with;
use crate::extract::rules::patterns::VAT_PERCENT;
use crate::models::output::OutputSheet;
use crate::models::source::{CellValue, SourceRow, SourceTable};

use super::{SheetTransform, Transformed};

pub const RATE_COLUMN: &str = "% TVA VANZARE";
pub const PURCHASE_COLUMN: &str = "Valoare Achizitie";
pub const DIFFERENCE_COLUMN: &str = "TVVAaloare Diferenta";
pub const MARKUP_COLUMN: &str = "Adaos";
pub const SALE_VAT_COLUMN: &str = "Valoare TVA.1";

/// Unlabelled column the difference spills into on some exports.
const SPILL_COLUMN: &str = "Unnamed: 10";

const DATE_COLUMNS: &[&str] = &["Data NIR", "Data"];

const AMOUNT_COLUMNS: &[&str] = &[PURCHASE_COLUMN, DIFFERENCE_COLUMN, MARKUP_COLUMN, SALE_VAT_COLUMN];

const DROPPED_COLUMNS: &[&str] = &[
    "NIR",
    "Data NIR",
    "Adaos Proc",
    "Procent TVA",
    "Numar Aviz",
    "Data Aviz",
    "TVA Achizitie",
    "% TVA Ach",
    "TVAACH",
];

const SUMMARY_HEADERS: [&str; 6] = [
    RATE_COLUMN,
    "Total Valoare Achizitie",
    "Total Valoare Achizitie TVA",
    "Total Valoare Vanzare",
    "Total Valoare Vanzare TVA",
    "Total Adaos",
];

/// Blank rows between the data and the totals block.
const SPACER_ROWS: usize = 3;

/// Whole-number sale VAT percentage of a cell: `"%19"`, `19` and `0.19`
/// all give 19.
///
/// Fractions below one are read as ratios; the percentage is truncated.
pub fn sale_rate(cell: &CellValue) -> Option<u32> {
    let text = cell.to_text();
    let caps = VAT_PERCENT.captures(&text)?;
    let mut value: Decimal = caps[1].replace(',', ".").parse().ok()?;
    if value < Decimal::ONE {
        value *= Decimal::ONE_HUNDRED;
    }
    value.trunc().to_u32()
}

fn round2(value: Decimal) -> CellValue {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .to_f64()
        .map(CellValue::Float)
        .unwrap_or_default()
}

fn amount(row: &SourceRow, column: &str) -> Decimal {
    row.get(column)
        .and_then(CellValue::as_decimal)
        .unwrap_or_default()
}

/// Per-rate totals.
#[derive(Debug, Clone, Default, PartialEq)]
struct RateTotals {
    purchase: Decimal,
    sale_vat: Decimal,
    markup: Decimal,
}

impl RateTotals {
    fn add(&mut self, row: &SourceRow) {
        self.purchase += amount(row, PURCHASE_COLUMN);
        self.sale_vat += amount(row, SALE_VAT_COLUMN);
        self.markup += amount(row, MARKUP_COLUMN);
    }

    fn summary_row(&self, rate: u32) -> Vec<CellValue> {
        let ratio = Decimal::from(rate) / Decimal::ONE_HUNDRED;
        let sale = if ratio.is_zero() {
            CellValue::Empty
        } else {
            round2(self.sale_vat / ratio)
        };

        vec![
            CellValue::Text(format!("%{rate}")),
            round2(self.purchase),
            round2(self.purchase * ratio),
            sale,
            round2(self.sale_vat),
            round2(self.markup),
        ]
    }
}

/// Builds the markup report.
#[derive(Debug, Clone, Copy, Default)]
pub struct VatSummary;

impl VatSummary {
    fn format_columns(table: &mut SourceTable) {
        let fill = table.has_column(SPILL_COLUMN);
        let amounts: Vec<&str> = AMOUNT_COLUMNS
            .iter()
            .copied()
            .filter(|c| table.has_column(c) || (fill && *c == DIFFERENCE_COLUMN))
            .collect();

        for row in &mut table.rows {
            for column in DATE_COLUMNS {
                if let Some(date) = row.get(column).map(|c| format_date_with(c, "%d/%m/%Y")) {
                    row.insert(*column, date);
                }
            }

            if fill && row.get(DIFFERENCE_COLUMN).is_none_or(CellValue::is_empty) {
                let spill = row.get(SPILL_COLUMN).cloned().unwrap_or_default();
                row.insert(DIFFERENCE_COLUMN, spill);
            }

            for column in &amounts {
                let value = round2(amount(row, column));
                row.insert(*column, value);
            }
        }

        if fill && !table.has_column(DIFFERENCE_COLUMN) {
            let index = table.column_index(SPILL_COLUMN).unwrap_or(table.headers.len());
            table.headers.insert(index, DIFFERENCE_COLUMN.to_string());
        }
        table.drop_column(SPILL_COLUMN);

        for column in DROPPED_COLUMNS {
            table.drop_column(column);
        }
    }
}

impl SheetTransform for VatSummary {
    fn name(&self) -> &'static str {
        "adaos"
    }

    fn apply(&self, mut table: SourceTable, file_name: &str) -> Result<Transformed> {
        if !table.has_column(RATE_COLUMN) {
            return Err(TransformError::MissingColumn(RATE_COLUMN.to_string()).into());
        }

        Self::format_columns(&mut table);

        let mut groups: BTreeMap<u32, Vec<SourceRow>> = BTreeMap::new();
        let mut dropped = 0usize;
        for mut row in std::mem::take(&mut table.rows) {
            match row.get(RATE_COLUMN).and_then(sale_rate) {
                Some(rate) => {
                    row.insert(RATE_COLUMN, format!("%{rate}"));
                    groups.entry(rate).or_default().push(row);
                }
                None => dropped += 1,
            }
        }

        if groups.is_empty() {
            return Err(TransformError::NoData("VAT rate grouping").into());
        }

        let mut warnings = Vec::new();
        if dropped > 0 {
            warnings.push(format!("{dropped} rows without a sale VAT rate were dropped"));
        }

        let width = table.headers.len();
        let mut totals = Vec::with_capacity(groups.len());
        for (rate, rows) in &groups {
            let mut sum = RateTotals::default();
            rows.iter().for_each(|r| sum.add(r));
            totals.push(sum.summary_row(*rate));
            debug!("Rate %{}: {} rows", rate, rows.len());
        }

        let group_count = totals.len();
        table.rows = groups.into_values().flatten().collect();
        let mut sheet = OutputSheet::from(table);

        sheet
            .rows
            .extend(std::iter::repeat_n(vec![CellValue::Empty; width], SPACER_ROWS));
        sheet.rows.push(pad(
            SUMMARY_HEADERS.iter().map(|h| CellValue::from(*h)).collect(),
            width,
        ));
        sheet
            .rows
            .extend(totals.into_iter().map(|row| pad(row, width)));

        info!(
            "Built markup summary for {} ({} rate groups)",
            file_name, group_count
        );

        Ok(Transformed { sheet, warnings })
    }
}

/// Fit a summary row to the sheet width, truncating when the sheet is narrower.
fn pad(mut row: Vec<CellValue>, width: usize) -> Vec<CellValue> {
    row.resize(width, CellValue::Empty);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn headers() -> Vec<String> {
        [
            "NIR",
            "Data NIR",
            "Furnizor",
            PURCHASE_COLUMN,
            DIFFERENCE_COLUMN,
            SPILL_COLUMN,
            MARKUP_COLUMN,
            SALE_VAT_COLUMN,
            RATE_COLUMN,
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn row(
        supplier: &str,
        purchase: f64,
        diff: CellValue,
        spill: f64,
        markup: f64,
        vat: f64,
        rate: CellValue,
    ) -> Vec<CellValue> {
        vec![
            CellValue::Int(1),
            "2024-03-14".into(),
            supplier.into(),
            CellValue::Float(purchase),
            diff,
            CellValue::Float(spill),
            CellValue::Float(markup),
            CellValue::Float(vat),
            rate,
        ]
    }

    #[test]
    fn test_sale_rate() {
        assert_eq!(sale_rate(&CellValue::from("%19")), Some(19));
        assert_eq!(sale_rate(&CellValue::Float(0.09)), Some(9));
        assert_eq!(sale_rate(&CellValue::Float(0.29)), Some(29));
        assert_eq!(sale_rate(&CellValue::from("9,5")), Some(9));
        assert_eq!(sale_rate(&CellValue::Int(21)), Some(21));
        assert_eq!(sale_rate(&CellValue::from("n/a")), None);
        assert_eq!(sale_rate(&CellValue::Empty), None);
    }

    #[test]
    fn test_groups_rows_and_appends_summary() {
        let table = SourceTable::from_rows(
            headers(),
            vec![
                row("A", 100.0, CellValue::Float(1.0), 0.0, 20.0, 19.0, "%19".into()),
                row("B", 50.0, CellValue::Empty, 4.5, 5.0, 0.9, CellValue::Float(0.09)),
                row("C", 10.0, CellValue::Float(2.0), 0.0, 1.0, 1.9, CellValue::Int(19)),
                row("D", 1.0, CellValue::Empty, 0.0, 0.0, 0.0, "fara".into()),
            ],
        );

        let out = VatSummary.apply(table, "adaos.xlsx").unwrap();
        let sheet = out.sheet;

        assert_eq!(
            sheet.headers,
            vec!["Furnizor", PURCHASE_COLUMN, DIFFERENCE_COLUMN, MARKUP_COLUMN, SALE_VAT_COLUMN, RATE_COLUMN]
        );
        assert_eq!(out.warnings.len(), 1);

        // 3 data rows, 3 spacer rows, the totals header, 2 totals rows.
        assert_eq!(sheet.row_count(), 9);
        assert_eq!(sheet.rows[0][0], CellValue::from("B"));
        assert_eq!(sheet.rows[0][2], CellValue::Float(4.5));
        assert_eq!(sheet.rows[0][5], CellValue::from("%9"));
        assert_eq!(sheet.rows[1][0], CellValue::from("A"));
        assert_eq!(sheet.rows[2][0], CellValue::from("C"));
        assert_eq!(sheet.rows[2][5], CellValue::from("%19"));

        assert!(sheet.rows[3..6].iter().all(|r| r.iter().all(CellValue::is_empty)));
        assert_eq!(sheet.rows[6][0], CellValue::from(RATE_COLUMN));
        assert_eq!(sheet.rows[6][5], CellValue::from("Total Adaos"));

        assert_eq!(
            sheet.rows[7],
            vec![
                CellValue::from("%9"),
                CellValue::Float(50.0),
                CellValue::Float(4.5),
                CellValue::Float(10.0),
                CellValue::Float(0.9),
                CellValue::Float(5.0),
            ]
        );
        assert_eq!(
            sheet.rows[8],
            vec![
                CellValue::from("%19"),
                CellValue::Float(110.0),
                CellValue::Float(20.9),
                CellValue::Float(110.0),
                CellValue::Float(20.9),
                CellValue::Float(21.0),
            ]
        );
    }

    #[test]
    fn test_missing_rate_column_fails() {
        let mut table = SourceTable::from_rows(headers(), Vec::new());
        table.drop_column(RATE_COLUMN);

        assert!(VatSummary.apply(table, "adaos.xlsx").is_err());
    }

    #[test]
    fn test_no_rated_rows_fails() {
        let table = SourceTable::from_rows(
            headers(),
            vec![row("A", 1.0, CellValue::Empty, 0.0, 0.0, 0.0, CellValue::Empty)],
        );

        assert!(VatSummary.apply(table, "adaos.xlsx").is_err());
    }

    #[test]
    fn test_zero_rate_leaves_sale_total_blank() {
        let totals = RateTotals {
            purchase: Decimal::from(10),
            sale_vat: Decimal::ZERO,
            markup: Decimal::ONE,
        };

        let summary = totals.summary_row(0);
        assert_eq!(summary[0], CellValue::from("%0"));
        assert_eq!(summary[3], CellValue::Empty);
    }
}
