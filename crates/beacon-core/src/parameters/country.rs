use std::fmt;

use serde::{Deserialize, Serialize};

use super::language::parse_language_ranges;
use crate::error::{ParameterError, Result};

/// Two letter ISO 3166-1 alpha-2 country code, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Country(String);

impl Country {
    /// Creates a country from a code, ignoring case. Blank input yields
    /// `None`.
    pub fn from_code(code: &str) -> Result<Option<Self>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(Some(Self(code.to_ascii_lowercase())));
        }
        Err(ParameterError::invalid_country_code(code))
    }

    /// Extracts the country from an Accept-Language style list, using the
    /// region of the highest weighted range that has one.
    pub fn from_language_ranges(ranges: &str) -> Result<Option<Self>> {
        if ranges.trim().is_empty() {
            return Ok(None);
        }
        parse_language_ranges(ranges)?
            .iter()
            .find_map(|range| match range.range().split('-').collect::<Vec<_>>().as_slice() {
                [_, region] if region.len() == 2 => Some(Self(region.to_ascii_lowercase())),
                _ => None,
            })
            .map(Some)
            .ok_or_else(|| ParameterError::invalid_country_code(ranges))
    }

    /// The lowercase code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Country {
    type Error = ParameterError;

    fn try_from(code: String) -> Result<Self> {
        Self::from_code(&code)?.ok_or_else(|| ParameterError::invalid_country_code(code))
    }
}

impl From<Country> for String {
    fn from(country: Country) -> Self {
        country.0
    }
}
