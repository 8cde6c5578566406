//! Date handling for source sheets.
//!
//! Two flavours exist: the strict normalizer used by row extraction, which
//! only strips separators from an already ISO-like value, and the permissive
//! formatter used by the column transforms.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::source::CellValue;

/// Text formats tried by [`parse_date`], in order.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Normalize a hyphenated date to `YYYYMMDD`.
///
/// Drops everything after the first space, then removes the hyphens:
/// `"2024-03-14 00:00:00"` becomes `"20240314"`. No format detection is done.
pub fn normalize_date(value: &str) -> String {
    let date_part = value.split(' ').next().unwrap_or("");
    date_part.split('-').collect()
}

/// Parse a cell into a calendar date, accepting the common text layouts,
/// datetime cells and Excel serial numbers.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Int(i) => from_excel_serial(*i as f64),
        CellValue::Float(f) => from_excel_serial(*f),
        CellValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    let parse = |s: &str| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    };

    // Retry without a trailing time of day ("14/03/2024 10:15").
    parse(text).or_else(|| text.split_once(' ').and_then(|(date, _)| parse(date)))
}

/// Convert an Excel serial day number (1900 date system) to a date.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Convert an Excel serial timestamp (days plus day fraction) to a datetime.
pub fn datetime_from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    let date = from_excel_serial(serial)?;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Format a cell as `YYYYMMDD`; cells that are not dates are returned as is.
pub fn format_date(cell: &CellValue) -> CellValue {
    format_date_with(cell, "%Y%m%d")
}

/// Format a cell with a chrono format string; non-dates are returned as is.
pub fn format_date_with(cell: &CellValue, fmt: &str) -> CellValue {
    match parse_date(cell) {
        Some(date) => CellValue::Text(date.format(fmt).to_string()),
        None => cell.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-14 00:00:00"), "20240314");
        assert_eq!(normalize_date("2024-03-14"), "20240314");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_normalize_date_does_not_detect_formats() {
        assert_eq!(normalize_date("14.03.2024"), "14.03.2024");
        assert_eq!(normalize_date("14-Mar-2024 10:00"), "14Mar2024");
    }

    #[test]
    fn test_parse_date_text_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 14);

        assert_eq!(parse_date(&"14/02/2024".into()), expected);
        assert_eq!(parse_date(&"14-02-2024".into()), expected);
        assert_eq!(parse_date(&"2024-02-14".into()), expected);
        assert_eq!(parse_date(&"14.02.2024".into()), expected);
        assert_eq!(parse_date(&"2024/02/14".into()), expected);
        assert_eq!(parse_date(&"14-Feb-2024".into()), expected);
        assert_eq!(parse_date(&"14 February 2024".into()), expected);
        assert_eq!(parse_date(&"2024-02-14 00:00:00".into()), expected);
    }

    #[test]
    fn test_parse_date_month_first_fallback() {
        // Day-first wins when both readings are valid.
        assert_eq!(parse_date(&"03/04/2024".into()), NaiveDate::from_ymd_opt(2024, 4, 3));
        // Only month-first is valid here.
        assert_eq!(parse_date(&"12/31/2024".into()), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(from_excel_serial(45365.0), NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(from_excel_serial(45365.75), NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(from_excel_serial(0.0), None);
        assert_eq!(from_excel_serial(f64::NAN), None);
    }

    #[test]
    fn test_datetime_from_excel_serial() {
        let dt = datetime_from_excel_serial(45365.5).unwrap();
        assert_eq!(dt.to_string(), "2024-03-14 12:00:00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&"14/03/2024".into()), CellValue::from("20240314"));
        assert_eq!(format_date(&CellValue::Float(45365.0)), CellValue::from("20240314"));
        assert_eq!(format_date(&"n/a".into()), CellValue::from("n/a"));
        assert_eq!(format_date(&CellValue::Empty), CellValue::Empty);
        assert_eq!(
            format_date_with(&"2024-03-14".into(), "%d/%m/%Y"),
            CellValue::from("14/03/2024")
        );
    }
}
