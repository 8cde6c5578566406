//! Credit-note style sheets: negated values, compact collection date.

use tracing::debug;

use crate::error::{Result, TransformError};
use crate::extract::rules::dates::format_date;
use crate::models::output::OutputSheet;
use crate::models::source::{CellValue, SourceTable};

use super::{SheetTransform, Transformed};

pub const DATE_COLUMN: &str = "Data Ultimei Incasari";
pub const VALUE_COLUMN: &str = "Valoare";

/// Reformats the last collection date to `YYYYMMDD` and negates every
/// numeric value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegateValues;

fn negate(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Int(i) => CellValue::Int(i.saturating_neg()),
        CellValue::Float(f) => CellValue::Float(-f),
        other => other.clone(),
    }
}

impl SheetTransform for NegateValues {
    fn name(&self) -> &'static str {
        "minus"
    }

    fn apply(&self, mut table: SourceTable, _file_name: &str) -> Result<Transformed> {
        for column in [DATE_COLUMN, VALUE_COLUMN] {
            if !table.has_column(column) {
                return Err(TransformError::MissingColumn(column.to_string()).into());
            }
        }

        for row in &mut table.rows {
            if let Some(date) = row.get(DATE_COLUMN).map(format_date) {
                row.insert(DATE_COLUMN, date);
            }
            if let Some(value) = row.get(VALUE_COLUMN).map(negate) {
                row.insert(VALUE_COLUMN, value);
            }
        }

        debug!("Negated {} rows", table.row_count());
        Ok(Transformed::new(OutputSheet::from(table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> SourceTable {
        SourceTable::from_rows(
            vec!["Client".into(), DATE_COLUMN.into(), VALUE_COLUMN.into()],
            vec![
                vec!["A".into(), "14/03/2024".into(), CellValue::Float(120.5)],
                vec!["B".into(), "n/a".into(), CellValue::Int(-7)],
                vec!["C".into(), CellValue::Empty, "text".into()],
            ],
        )
    }

    #[test]
    fn test_negate_and_format_date() {
        let out = NegateValues.apply(table(), "minus.xlsx").unwrap().sheet;

        assert_eq!(out.headers, vec!["Client", DATE_COLUMN, VALUE_COLUMN]);
        assert_eq!(
            out.rows,
            vec![
                vec!["A".into(), "20240314".into(), CellValue::Float(-120.5)],
                vec!["B".into(), "n/a".into(), CellValue::Int(7)],
                vec!["C".into(), CellValue::Empty, "text".into()],
            ]
        );
    }

    #[test]
    fn test_missing_value_column_fails() {
        let mut input = table();
        input.drop_column(VALUE_COLUMN);

        let err = NegateValues.apply(input, "minus.xlsx").unwrap_err();
        assert!(err.to_string().contains(VALUE_COLUMN));
    }
}
