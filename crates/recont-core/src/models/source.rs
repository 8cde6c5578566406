//! Source-side data model: loosely structured rows read from an input sheet.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// A single cell of a source sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// Spreadsheet error value, e.g. `#VALUE!`.
    Error(String),
}

impl CellValue {
    /// Whether the cell carries no value (empty, or blank text).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Render the cell as text.
    ///
    /// Integral floats drop their fraction (`19.0` renders as `19`) and
    /// datetimes render as `YYYY-MM-DD HH:MM:SS`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Text(s) => s.clone(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Error(e) => e.clone(),
        }
    }

    /// Numeric value of the cell, if it has one.
    ///
    /// Text is parsed after trimming and stripping thousands separators.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(i) => Some(Decimal::from(*i)),
            Self::Float(f) => Decimal::from_f64(*f),
            Self::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != ' ').collect();
                cleaned.parse().ok()
            }
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<Decimal> for CellValue {
    fn from(d: Decimal) -> Self {
        Self::Text(d.normalize().to_string())
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// One record of a source sheet, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    cells: IndexMap<String, CellValue>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.cells.shift_remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.cells.contains_key(field)
    }

    /// Text of a field, `None` when the field is absent or empty.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).filter(|c| !c.is_empty()).map(CellValue::to_text)
    }

    /// Text of a field, or `default` when absent or empty.
    pub fn text_or(&self, field: &str, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.cells.iter()
    }
}

/// A source sheet: header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    /// Column names in sheet order.
    pub headers: Vec<String>,
    /// Data rows, keyed by the names in `headers`.
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from positional rows; cells beyond the header are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut row = SourceRow::new();
                for (header, cell) in headers.iter().zip(cells) {
                    row.insert(header.clone(), cell);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Insert a new column at `index` with one value per row.
    pub fn insert_column(&mut self, index: usize, name: &str, values: Vec<CellValue>) {
        let index = index.min(self.headers.len());
        self.headers.insert(index, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name, value);
        }
    }

    /// Remove a column by name; returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(index);
        for row in &mut self.rows {
            row.remove(name);
        }
        true
    }

    /// Rows in header order, missing cells as `Empty`.
    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(|h| row.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(CellValue::Float(19.0).to_text(), "19");
        assert_eq!(CellValue::Float(12.5).to_text(), "12.5");
        assert_eq!(CellValue::Int(-3).to_text(), "-3");
        assert_eq!(CellValue::Empty.to_text(), "");

        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_text(), "2024-03-14 00:00:00");
    }

    #[test]
    fn test_row_text_defaults() {
        let row = SourceRow::new().with("Nume", "ACME SRL").with("CUI", "");

        assert_eq!(row.text("Nume"), Some("ACME SRL".to_string()));
        assert_eq!(row.text("CUI"), None);
        assert_eq!(row.text_or("Lipsa", "0"), "0");
    }

    #[test]
    fn test_insert_and_drop_column() {
        let mut table = SourceTable::from_rows(
            vec!["A".into(), "B".into()],
            vec![vec![1i64.into(), 2i64.into()], vec![3i64.into(), 4i64.into()]],
        );

        table.insert_column(1, "X", vec!["x1".into(), "x2".into()]);
        assert_eq!(table.headers, vec!["A", "X", "B"]);
        assert_eq!(table.to_rows()[1][1], CellValue::from("x2"));

        assert!(table.drop_column("A"));
        assert!(!table.drop_column("A"));
        assert_eq!(table.headers, vec!["X", "B"]);
    }

    #[test]
    fn test_as_decimal() {
        assert_eq!(CellValue::from("1,234.50").as_decimal(), Some("1234.50".parse().unwrap()));
        assert_eq!(CellValue::Int(7).as_decimal(), Some(Decimal::from(7)));
        assert_eq!(CellValue::from("abc").as_decimal(), None);
    }
}
