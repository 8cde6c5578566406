//! Document-type classification from source file names.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::patterns::{
    DOC_AUTOSERVIRE, DOC_DEPOZIT, DOC_FAST_FOOD, DOC_M1, DOC_M2, DOC_M3, DOC_M4, DOC_M5,
    DOC_RESTAURANT,
};

/// Document class of a source file, derived once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentType {
    M1,
    M2,
    M3,
    M4,
    M5,
    /// Self-service canteen.
    Amta,
    /// Restaurant.
    Amtr,
    /// Warehouse.
    Amtd,
    /// Fast food.
    Ff,
    #[default]
    Unknown,
}

impl DocumentType {
    /// Candidate types in match priority order.
    pub const PRIORITY: [DocumentType; 9] = [
        Self::M1,
        Self::M2,
        Self::M3,
        Self::M4,
        Self::M5,
        Self::Amta,
        Self::Amtr,
        Self::Amtd,
        Self::Ff,
    ];

    /// Short code, as used in file names and logs.
    pub fn code(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
            Self::M5 => "M5",
            Self::Amta => "AMTA",
            Self::Amtr => "AMTR",
            Self::Amtd => "AMTD",
            Self::Ff => "FF",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Merchandise label seeded into every row of a file of this type.
    pub fn merchandise_label(self) -> &'static str {
        match self {
            Self::M1 => "Marfa M1",
            Self::M2 => "Marfa M2",
            Self::M3 => "Marfa M3",
            Self::M4 => "Materie prima M4",
            Self::M5 => "Marfa M5",
            Self::Amta => "autoservire",
            Self::Amtr => "restaurant",
            Self::Amtd => "depozit",
            Self::Ff => "fast-food",
            Self::Unknown => "marfa",
        }
    }

    fn pattern(self) -> Option<&'static Regex> {
        let re: &'static Regex = match self {
            Self::M1 => &*DOC_M1,
            Self::M2 => &*DOC_M2,
            Self::M3 => &*DOC_M3,
            Self::M4 => &*DOC_M4,
            Self::M5 => &*DOC_M5,
            Self::Amta => &*DOC_AUTOSERVIRE,
            Self::Amtr => &*DOC_RESTAURANT,
            Self::Amtd => &*DOC_DEPOZIT,
            Self::Ff => &*DOC_FAST_FOOD,
            Self::Unknown => return None,
        };
        Some(re)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify a file name. The first type in [`DocumentType::PRIORITY`] whose
/// keyword appears as a whole token wins.
pub fn classify(file_name: &str) -> DocumentType {
    let upper = file_name.to_uppercase();
    DocumentType::PRIORITY
        .into_iter()
        .find(|t| t.pattern().is_some_and(|re| re.is_match(&upper)))
        .unwrap_or(DocumentType::Unknown)
}
