//! Air quality index and its classification
//!
//! The pollution API reports an index from 1 (Good) to 5 (Very Poor). The
//! classifier maps that index to a category and a health advisory through a
//! fixed table; anything outside the table is `Unknown`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory used for unknown or missing readings
pub const NO_DATA_ADVICE: &str = "no data available";

/// Air quality index, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AirQualityIndex(u8);

impl AirQualityIndex {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` for values outside 1..=5; there is no clamping
    #[must_use]
    pub fn new(raw: i64) -> Option<Self> {
        u8::try_from(raw)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AirQualityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Air quality categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    /// Index 1
    Good,
    /// Index 2
    Fair,
    /// Index 3
    Moderate,
    /// Index 4
    Poor,
    /// Index 5
    VeryPoor,
    /// No reading, or an index outside the table
    Unknown,
}

impl AqiCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classified reading. Category and advice always come from the same table
/// row, so they can only be built through [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AqiClassification {
    index: Option<AirQualityIndex>,
    category: AqiCategory,
    advice: &'static str,
}

impl AqiClassification {
    #[must_use]
    pub fn index(&self) -> Option<AirQualityIndex> {
        self.index
    }

    #[must_use]
    pub fn category(&self) -> AqiCategory {
        self.category
    }

    #[must_use]
    pub fn advice(&self) -> &'static str {
        self.advice
    }

    /// `5 (Very Poor)`, or `None` without a valid index
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.index
            .map(|index| format!("{} ({})", index, self.category.label()))
    }
}

const TABLE: [(AqiCategory, &str); 5] = [
    (AqiCategory::Good, "Air quality is ideal. No health risk."),
    (
        AqiCategory::Fair,
        "Acceptable. Slight risk for unusually sensitive people.",
    ),
    (
        AqiCategory::Moderate,
        "Sensitive groups should reduce prolonged outdoor exertion.",
    ),
    (
        AqiCategory::Poor,
        "Unhealthy for sensitive groups. Limit outdoor exposure.",
    ),
    (
        AqiCategory::VeryPoor,
        "Health alert! Everyone may experience serious effects. Stay indoors.",
    ),
];

/// Map a raw AQI value to its category and advice. Total and pure.
#[must_use]
pub fn classify(raw: Option<i64>) -> AqiClassification {
    match raw.and_then(AirQualityIndex::new) {
        Some(index) => {
            let (category, advice) = TABLE[usize::from(index.value() - AirQualityIndex::MIN)];
            AqiClassification {
                index: Some(index),
                category,
                advice,
            }
        }
        None => AqiClassification {
            index: None,
            category: AqiCategory::Unknown,
            advice: NO_DATA_ADVICE,
        },
    }
}
