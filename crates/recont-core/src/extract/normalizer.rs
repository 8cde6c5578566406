//! Column defaults and length normalization for canonical tables.

use tracing::debug;

use crate::models::canonical::{CanonicalField, CanonicalTable};

/// Default value of a canonical column when a row has nothing for it.
pub fn default_value(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::Quantity => "1",
        CanonicalField::ListPrice => "0",
        CanonicalField::VatRate => "0",
        CanonicalField::Currency => "RON",
        CanonicalField::VatOption => "TAXABILE",
        _ => "",
    }
}

/// Default value by header label; unknown headers default to an empty string.
pub fn default_for_header(header: &str) -> &'static str {
    CanonicalField::from_header(header).map_or("", default_value)
}

/// Pad every column with its default up to the longest column's length.
///
/// Normalizing an already rectangular table changes nothing.
pub fn normalize(table: &mut CanonicalTable) {
    let rows = table.row_count();

    for &field in CanonicalField::ALL {
        let column = table.column_mut(field);
        let missing = rows - column.len();
        if missing > 0 {
            debug!("Padding column {:?} with {} default values", field.header(), missing);
            column.extend(std::iter::repeat_n(default_value(field).to_string(), missing));
        }
    }
}
