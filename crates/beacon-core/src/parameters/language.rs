//! Accept-Language values (RFC 4647 language ranges with weights).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};

/// Weight given to a range without an explicit `q` parameter.
pub const MAX_WEIGHT: f64 = 1.0;

/// A single language range such as `de-de` with its quality weight.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    range: String,
    weight: f64,
}

impl LanguageRange {
    /// Creates a range with the maximum weight.
    pub fn new(range: impl AsRef<str>) -> Self {
        Self { range: range.as_ref().to_ascii_lowercase(), weight: MAX_WEIGHT }
    }

    /// Creates a range with an explicit weight.
    pub fn with_weight(range: impl AsRef<str>, weight: f64) -> Result<Self> {
        let range = range.as_ref();
        if !(0.0..=MAX_WEIGHT).contains(&weight) {
            return Err(ParameterError::invalid_language_range(format!("{range};q={weight}")));
        }
        Ok(Self { range: range.to_ascii_lowercase(), weight })
    }

    /// The lowercased range, e.g. `en-us`.
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Quality weight between 0.0 and 1.0.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Display for LanguageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weight == MAX_WEIGHT {
            write!(f, "{}", self.range)
        } else {
            write!(f, "{};q={}", self.range, self.weight)
        }
    }
}

/// Parses a comma separated list of ranges and orders it by descending
/// weight. Entries with equal weight keep their input order.
pub fn parse_language_ranges(header: &str) -> Result<Vec<LanguageRange>> {
    let mut ranges = Vec::new();

    for entry in header.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (range, weight) = match entry.split_once(';') {
            Some((range, parameter)) => {
                let weight = parameter
                    .trim()
                    .strip_prefix("q=")
                    .and_then(|value| value.trim().parse::<f64>().ok())
                    .ok_or_else(|| ParameterError::invalid_language_range(entry))?;
                (range.trim(), weight)
            },
            None => (entry, MAX_WEIGHT),
        };

        if !is_valid_range(range) {
            return Err(ParameterError::invalid_language_range(entry));
        }
        ranges.push(LanguageRange::with_weight(range, weight)?);
    }

    ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(ranges)
}

fn is_valid_range(range: &str) -> bool {
    range == "*"
        || (!range.is_empty()
            && range.split('-').all(|subtag| {
                (1..=8).contains(&subtag.len())
                    && subtag.chars().all(|c| c.is_ascii_alphanumeric() || c == '*')
            }))
}

/// Override for the visitor's Accept-Language header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcceptLanguage {
    ranges: Vec<LanguageRange>,
}

impl AcceptLanguage {
    /// Creates an empty value; add ranges with [`AcceptLanguage::range`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a range, keeping insertion order.
    pub fn range(mut self, range: LanguageRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Parses an Accept-Language header. Blank headers yield `None`.
    pub fn from_header(header: &str) -> Result<Option<Self>> {
        if header.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { ranges: parse_language_ranges(header)? }))
    }

    /// The contained ranges.
    pub fn ranges(&self) -> &[LanguageRange] {
        &self.ranges
    }
}

impl fmt::Display for AcceptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, range) in self.ranges.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for AcceptLanguage {
    type Error = ParameterError;

    fn try_from(header: String) -> Result<Self> {
        Ok(Self::from_header(&header)?.unwrap_or_default())
    }
}

impl From<AcceptLanguage> for String {
    fn from(language: AcceptLanguage) -> Self {
        language.to_string()
    }
}
