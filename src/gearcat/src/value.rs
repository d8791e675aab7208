//! Stat value parsing
//!
//! Source documents encode every stat as a string. Percentage stats carry a
//! trailing `%` (`"7.5%"`), flat stats are bare numbers (`"120"`).

use std::fmt;

use crate::{Error, Result};

/// Percent marker used by source documents
pub const PERCENT_MARKER: char = '%';

/// How a stat value is written in the source data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFormat {
    /// `"7.5%"`
    Percentage,
    /// `"120"`
    Flat,
}

impl StatFormat {
    pub fn name(&self) -> &'static str {
        match self {
            StatFormat::Percentage => "percentage",
            StatFormat::Flat => "flat",
        }
    }
}

impl fmt::Display for StatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed stat magnitude with its format tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatValue {
    pub magnitude: f64,
    pub format: StatFormat,
}

impl StatValue {
    pub fn new(magnitude: f64, format: StatFormat) -> Self {
        StatValue { magnitude, format }
    }

    pub fn flat(magnitude: f64) -> Self {
        StatValue::new(magnitude, StatFormat::Flat)
    }

    pub fn percentage(magnitude: f64) -> Self {
        StatValue::new(magnitude, StatFormat::Percentage)
    }

    /// Parse a source stat string.
    ///
    /// `"5.0%"` → 5.0 percentage, `"100"` → 100.0 flat. Surrounding
    /// whitespace is ignored. Non-finite results (`"inf"`, `"NaN"`) are
    /// rejected along with anything else that is not a real number.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (number, format) = match trimmed.strip_suffix(PERCENT_MARKER) {
            Some(rest) => (rest.trim_end(), StatFormat::Percentage),
            None => (trimmed, StatFormat::Flat),
        };

        let magnitude = number
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite())
            .ok_or_else(|| Error::MalformedValue {
                value: raw.to_string(),
            })?;

        Ok(StatValue { magnitude, format })
    }

    pub fn is_percentage(&self) -> bool {
        self.format == StatFormat::Percentage
    }
}
