//! Common regex patterns for source file names and cell values.

use lazy_static::lazy_static;
use regex::Regex;

/// Token boundary: start of string, whitespace, underscore, hyphen or dot
/// before the keyword; a separator after it. A keyword ending the name does
/// not match.
macro_rules! token {
    ($body:literal) => {
        concat!(r"(?:^|[\s_\-.])", $body, r"[\s_\-.]")
    };
}

lazy_static! {
    // Merchandise codes
    pub static ref DOC_M1: Regex = Regex::new(token!("M1")).unwrap();
    pub static ref DOC_M2: Regex = Regex::new(token!("M2")).unwrap();
    pub static ref DOC_M3: Regex = Regex::new(token!("M3")).unwrap();
    pub static ref DOC_M4: Regex = Regex::new(token!("M4")).unwrap();
    pub static ref DOC_M5: Regex = Regex::new(token!("M5")).unwrap();

    // Retail channel keywords
    pub static ref DOC_AUTOSERVIRE: Regex = Regex::new(token!("AUTOSERVIRE")).unwrap();
    pub static ref DOC_RESTAURANT: Regex = Regex::new(token!("RESTAURANT")).unwrap();
    pub static ref DOC_DEPOZIT: Regex = Regex::new(token!("DEPOZIT")).unwrap();
    pub static ref DOC_FAST_FOOD: Regex = Regex::new(token!(r"FAST[\s_\-.]FOOD")).unwrap();

    // VAT percentage as written in summary sheets ("%9", "19%", "0.09")
    pub static ref VAT_PERCENT: Regex = Regex::new(r"^\s*%?\s*(\d+(?:[.,]\d+)?)\s*%?\s*$").unwrap();
}
