//! Excel workbooks via calamine (read) and rust_xlsxwriter (write).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::{LoadError, WriteError};
use crate::extract::rules::dates::datetime_from_excel_serial;
use crate::models::config::OutputConfig;
use crate::models::output::OutputSheet;
use crate::models::source::{CellValue, SourceTable};

use super::{header_names, LoadResult, SheetReader, SheetWriter};

/// Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` workbooks.
#[derive(Debug, Clone, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }
}

/// Convert a calamine cell to a source cell.
fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match datetime_from_excel_serial(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

impl SheetReader for XlsxReader {
    fn read(&self, path: &Path) -> LoadResult<SourceTable> {
        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Open(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoadError::NoSheets)?
            .map_err(|e| LoadError::Open(e.to_string()))?;

        // The range starts at the first used cell; keep absolute column
        // positions so `Unnamed: <n>` names match the sheet.
        let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);
        let pad = || std::iter::repeat_n(CellValue::Empty, col_offset);

        let mut rows = range
            .rows()
            .map(|row| pad().chain(row.iter().map(to_cell_value)).collect::<Vec<_>>());

        let header = rows.next().ok_or(LoadError::MissingHeader)?;
        if header.iter().all(CellValue::is_empty) {
            return Err(LoadError::MissingHeader);
        }

        let headers = header_names(&header);
        let data: Vec<Vec<CellValue>> = rows
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .collect();

        debug!(
            "Read {} columns and {} rows from {}",
            headers.len(),
            data.len(),
            path.display()
        );

        Ok(SourceTable::from_rows(headers, data))
    }
}

/// Writes a single-worksheet `.xlsx` with sized columns.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    sheet_name: String,
    column_padding: usize,
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::from_config(&OutputConfig::default())
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            column_padding: config.column_padding,
        }
    }
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetWriter for XlsxWriter {
    fn write(&self, sheet: &OutputSheet, path: &Path) -> Result<(), WriteError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, to_col(col)?, header)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| WriteError::Overflow(format!("row {}", row_idx + 1)))?;

            for (col_idx, cell) in row.iter().enumerate() {
                let col = to_col(col_idx)?;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(s) if s.is_empty() => {}
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col, *b)?;
                    }
                    CellValue::Int(i) => {
                        worksheet.write_number(row_num, col, *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        worksheet.write_number(row_num, col, *f)?;
                    }
                    other => {
                        worksheet.write_string(row_num, col, other.to_text())?;
                    }
                }
            }
        }

        for (col, width) in sheet.column_widths().into_iter().enumerate() {
            worksheet.set_column_width(to_col(col)?, (width + self.column_padding) as f64)?;
        }

        workbook.save(path)?;
        debug!("Wrote {} rows to {}", sheet.row_count(), path.display());
        Ok(())
    }
}

fn to_col(index: usize) -> Result<u16, WriteError> {
    u16::try_from(index).map_err(|_| WriteError::Overflow(format!("column {index}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Intrari_M1.xlsx");

        let sheet = OutputSheet {
            headers: vec!["Numar Factura".into(), String::new(), "Valoare".into()],
            rows: vec![
                vec!["F1".into(), CellValue::Empty, CellValue::Float(12.5)],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec!["F2".into(), "x".into(), CellValue::Int(3)],
            ],
        };
        XlsxWriter::new().write(&sheet, &path).unwrap();

        let table = XlsxReader::new().read(&path).unwrap();

        assert_eq!(table.headers, vec!["Numar Factura", "Unnamed: 1", "Valoare"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].text("Numar Factura"), Some("F1".to_string()));
        assert_eq!(table.rows[0].text("Valoare"), Some("12.5".to_string()));
        assert_eq!(table.rows[1].text("Unnamed: 1"), Some("x".to_string()));
        assert_eq!(table.rows[1].text("Valoare"), Some("3".to_string()));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = XlsxReader::new()
            .read(Path::new("/nonexistent/dir/sheet.xlsx"))
            .unwrap_err();

        assert!(matches!(err, LoadError::Open(_)));
    }
}
