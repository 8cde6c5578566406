//! Deposit-return (SGR) split: value without the deposit charge.

use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::output::OutputSheet;
use crate::models::source::{CellValue, SourceTable};

use super::{SheetTransform, Transformed};

/// Name of the inserted column.
pub const NET_COLUMN: &str = "Fara SGR";

/// Position of the gross value column in every layout. Columns are addressed
/// by their `Unnamed: <index>` headers.
const GROSS_INDEX: usize = 5;

/// Column layouts of deposit-return exports, matched against the file name
/// in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrLayout {
    M1,
    M2,
    M3,
    Amt,
}

impl SgrLayout {
    pub const ALL: [SgrLayout; 4] = [Self::M1, Self::M2, Self::M3, Self::Amt];

    pub fn marker(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::Amt => "AMT",
        }
    }

    /// Position of the deposit charge column.
    pub fn deposit_index(self) -> usize {
        match self {
            Self::M1 => 20,
            Self::M2 => 19,
            Self::M3 | Self::Amt => 18,
        }
    }

    /// First layout whose marker occurs in the file name (case-sensitive).
    pub fn detect(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| file_name.contains(l.marker()))
    }
}

/// Inserts [`NET_COLUMN`] after the gross value column.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrSplit;

impl SgrSplit {
    pub fn new() -> Self {
        Self
    }
}

fn difference(gross: Option<&CellValue>, deposit: Option<&CellValue>) -> CellValue {
    let (Some(gross), Some(deposit)) = (
        gross.and_then(CellValue::as_decimal),
        deposit.and_then(CellValue::as_decimal),
    ) else {
        return CellValue::Empty;
    };

    (gross - deposit)
        .to_f64()
        .map(CellValue::Float)
        .unwrap_or_default()
}

/// Header the loader gives an unlabelled column at `index`.
fn unnamed(index: usize) -> String {
    format!("Unnamed: {index}")
}

fn missing_message(file_name: &str, layout: SgrLayout, column: &str) -> String {
    format!(
        "{} has no column {:?} required by layout {}; sheet left unchanged",
        file_name,
        column,
        layout.marker()
    )
}

fn unchanged(table: SourceTable, message: String) -> Transformed {
    warn!("{}", message);
    Transformed {
        sheet: OutputSheet::from(table),
        warnings: vec![message],
    }
}

impl SheetTransform for SgrSplit {
    fn name(&self) -> &'static str {
        "sgr"
    }

    fn apply(&self, mut table: SourceTable, file_name: &str) -> Result<Transformed> {
        let Some(layout) = SgrLayout::detect(file_name) else {
            let message = format!("No SGR layout matches {file_name}; sheet left unchanged");
            return Ok(unchanged(table, message));
        };

        // The export leaves these columns unlabelled; a labelled sheet is a
        // different layout and is not rewritten.
        let gross = unnamed(GROSS_INDEX);
        let deposit = unnamed(layout.deposit_index());
        let Some(gross_index) = table.column_index(&gross) else {
            return Ok(unchanged(table, missing_message(file_name, layout, &gross)));
        };
        if !table.has_column(&deposit) {
            return Ok(unchanged(table, missing_message(file_name, layout, &deposit)));
        }

        debug!("SGR layout {}: {} minus {}", layout.marker(), gross, deposit);

        let values = table
            .rows
            .iter()
            .map(|row| difference(row.get(&gross), row.get(&deposit)))
            .collect();
        table.insert_column(gross_index + 1, NET_COLUMN, values);

        Ok(Transformed::new(OutputSheet::from(table)))
    }
}
