//! Spreadsheet I/O: the source table provider and the output sink.

mod xlsx;

pub use xlsx::{XlsxReader, XlsxWriter};

use std::path::Path;

use crate::error::{LoadError, WriteError};
use crate::models::output::OutputSheet;
use crate::models::source::{CellValue, SourceTable};

/// Result type for loading operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Trait for source table providers.
pub trait SheetReader {
    /// Read the first worksheet of a file; its first row is the header row.
    fn read(&self, path: &Path) -> LoadResult<SourceTable>;
}

/// Trait for output sinks.
pub trait SheetWriter {
    /// Persist a sheet, replacing any existing file.
    fn write(&self, sheet: &OutputSheet, path: &Path) -> std::result::Result<(), WriteError>;
}

/// Turn a raw header row into unique column names.
///
/// Blank headers become `Unnamed: <index>` and repeats get `.1`, `.2`, ...
/// suffixes, matching how legacy exports are addressed.
pub fn header_names(raw: &[CellValue]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());

    for (i, cell) in raw.iter().enumerate() {
        let base = if cell.is_empty() {
            format!("Unnamed: {i}")
        } else {
            cell.to_text()
        };

        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names() {
        let raw = vec![
            CellValue::from("NIR"),
            CellValue::Empty,
            CellValue::from("Valoare TVA"),
            CellValue::from("Valoare TVA"),
            CellValue::from("  "),
            CellValue::Int(2024),
        ];

        assert_eq!(
            header_names(&raw),
            vec!["NIR", "Unnamed: 1", "Valoare TVA", "Valoare TVA.1", "Unnamed: 4", "2024"]
        );
    }
}
