//! Romanian fiscal code (CUI/CIF/CNP) helpers.

/// VAT-registration prefix on Romanian fiscal codes.
pub const VAT_PREFIX: &str = "RO";

/// Whether the raw code carries the VAT-registration prefix.
pub fn is_vat_registered(code: &str) -> bool {
    code.starts_with(VAT_PREFIX)
}

/// Strip a leading `RO` / `RO ` prefix from a fiscal code.
pub fn strip_vat_prefix(code: &str) -> String {
    match code.strip_prefix(VAT_PREFIX) {
        Some(rest) => rest.trim_start().to_string(),
        None => code.to_string(),
    }
}
