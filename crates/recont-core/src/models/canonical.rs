//! Canonical 43-column accounting import layout.
//!
//! Column order and header labels are a compatibility contract with the
//! downstream import: they are written verbatim, in declaration order.

use serde::{Deserialize, Serialize};

use crate::extract::normalizer::default_value;

macro_rules! canonical_fields {
    ($($variant:ident => $header:literal),+ $(,)?) => {
        /// One of the 43 canonical output columns.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum CanonicalField {
            $($variant),+
        }

        impl CanonicalField {
            /// All fields in output column order.
            pub const ALL: &'static [CanonicalField] = &[$(CanonicalField::$variant),+];

            /// Header label as written to the output sheet.
            pub fn header(self) -> &'static str {
                match self {
                    $(CanonicalField::$variant => $header),+
                }
            }
        }
    };
}

canonical_fields! {
    LineNumber => "NR.linie",
    Series => "Serie",
    DocumentNumber => "Numar document",
    Date => "Data",
    DueDate => "Data scadenta",
    InvoiceTypeCode => "Cod tip Factura",
    PartnerName => "Nume partener",
    FiscalAttribute => "Atribut fiscal",
    FiscalCode => "Cod fiscal",
    TradeRegisterNumber => "Nr.Reg.Com.",
    Residence => "Rezidenta",
    Country => "Tara",
    County => "Judet",
    Locality => "Localitate",
    Street => "Strada",
    StreetNumber => "Numar",
    Block => "Bloc",
    Staircase => "Scara",
    Floor => "Etaj",
    Apartment => "Apartament",
    PostalCode => "Cod postal",
    Currency => "Moneda",
    ExchangeRate => "Curs",
    VatOnCollection => "TVA la incasare",
    ReverseCharge => "Taxare inversa",
    TransportInvoice => "Factura de transport",
    AgentCode => "Cod agent",
    TotalNet => "Valoare neta totala",
    TotalVat => "Valoare TVA",
    DocumentTotal => "Total document",
    ArticleName => "Denumire articol",
    Quantity => "Cantitate",
    StockMovementType => "Tip miscare stoc",
    ServiceAccount => "Cont servicii",
    ListPrice => "Pret de lista",
    NetValue => "Valoare fara tva",
    VatValue => "Val TVA",
    GrossValue => "Valoare cu TVa",
    VatOption => "Optiune TVA",
    VatRate => "Cota TVA",
    SaftVatCode => "Cod TVA SAFT",
    Notes => "Observatie",
    CostCenters => "Centre de cost",
}

impl CanonicalField {
    /// Number of canonical columns.
    pub const COUNT: usize = 43;

    /// Position of the field in the output column order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look a field up by its header label.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.header() == header)
    }

    /// Header labels in output order.
    pub fn headers() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.header()).collect()
    }
}

/// VAT classification written to the "Optiune TVA" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxOption {
    #[default]
    Taxabile,
    Scutite,
}

impl TaxOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Taxabile => "TAXABILE",
            Self::Scutite => "SCUTITE",
        }
    }
}

impl std::fmt::Display for TaxOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row. Fields never set fall back to their column default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    values: Vec<Option<String>>,
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self {
            values: vec![None; CanonicalField::COUNT],
        }
    }
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values[field.index()] = Some(value.into());
    }

    /// Explicitly set value, if any.
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Set value, or the column default.
    pub fn value(&self, field: CanonicalField) -> String {
        self.get(field)
            .map(str::to_string)
            .unwrap_or_else(|| default_value(field).to_string())
    }

    /// Number of explicitly set fields.
    pub fn filled(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Column-oriented canonical table with a fixed, pre-declared schema.
///
/// Every canonical column always exists; `push_record` writes one value to
/// each of them so column lengths stay equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTable {
    columns: Vec<Vec<String>>,
}

impl Default for CanonicalTable {
    fn default() -> Self {
        Self {
            columns: vec![Vec::new(); CanonicalField::COUNT],
        }
    }
}

impl CanonicalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (the longest column).
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column(&self, field: CanonicalField) -> &[String] {
        &self.columns[field.index()]
    }

    pub(crate) fn column_mut(&mut self, field: CanonicalField) -> &mut Vec<String> {
        &mut self.columns[field.index()]
    }

    /// Append one value to a single column.
    ///
    /// This can leave columns with different lengths until the table is
    /// normalized.
    pub fn push_value(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.column_mut(field).push(value.into());
    }

    /// Append a full row, back-filling unset fields with column defaults.
    pub fn push_record(&mut self, record: &CanonicalRecord) {
        for &field in CanonicalField::ALL {
            let value = record.value(field);
            self.column_mut(field).push(value);
        }
    }

    /// Whether every column has the same length.
    pub fn is_rectangular(&self) -> bool {
        let rows = self.row_count();
        self.columns.iter().all(|c| c.len() == rows)
    }

    pub fn value(&self, row: usize, field: CanonicalField) -> Option<&str> {
        self.column(field).get(row).map(String::as_str)
    }

    /// Values of one row in output column order.
    pub fn row(&self, row: usize) -> Option<Vec<&str>> {
        if row >= self.row_count() {
            return None;
        }
        Some(
            CanonicalField::ALL
                .iter()
                .map(|&f| self.value(row, f).unwrap_or(""))
                .collect(),
        )
    }
}
