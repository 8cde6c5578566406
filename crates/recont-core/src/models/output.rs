//! Sheet handed to the output sink: headers plus positional rows.

use serde::{Deserialize, Serialize};

use super::canonical::{CanonicalField, CanonicalTable};
use super::source::{CellValue, SourceTable};

/// A rectangular sheet ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl OutputSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rendered width of each column: the longest of header and cell texts.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.to_text().chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

impl From<&CanonicalTable> for OutputSheet {
    fn from(table: &CanonicalTable) -> Self {
        let headers = CanonicalField::headers().into_iter().map(str::to_string).collect();
        let rows = (0..table.row_count())
            .map(|i| {
                CanonicalField::ALL
                    .iter()
                    .map(|&f| CellValue::Text(table.value(i, f).unwrap_or("").to_string()))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }
}

impl From<SourceTable> for OutputSheet {
    fn from(table: SourceTable) -> Self {
        let rows = table.to_rows();
        Self {
            headers: table.headers,
            rows,
        }
    }
}
