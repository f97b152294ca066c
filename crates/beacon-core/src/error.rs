//! Error types for building and serializing tracking actions.
//!
//! Every error here is a caller input problem: a value that does not match
//! its declared pattern, or a formatter input that cannot be represented on
//! the wire. They are raised synchronously, before anything is queued.

use thiserror::Error;

/// Result type alias using `ParameterError`.
pub type Result<T> = std::result::Result<T, ParameterError>;

/// Errors raised while validating or formatting tracking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A string value does not fully match the pattern declared for its
    /// parameter.
    #[error("invalid value for {parameter}: must match regex {pattern}")]
    InvalidValue {
        /// Wire name of the offending parameter
        parameter: &'static str,
        /// Pattern the value was checked against
        pattern: String,
    },

    /// Country codes must consist of exactly two letters.
    #[error("invalid country code: {code:?}")]
    InvalidCountryCode {
        /// The rejected input
        code: String,
    },

    /// Visitor ids are exactly 16 hexadecimal characters.
    #[error("invalid visitor id: {value:?}")]
    InvalidVisitorId {
        /// The rejected input
        value: String,
    },

    /// An Accept-Language entry could not be parsed.
    #[error("invalid language range: {range:?}")]
    InvalidLanguageRange {
        /// The rejected range
        range: String,
    },
}

impl ParameterError {
    /// Creates a pattern mismatch error.
    pub fn invalid_value(parameter: &'static str, pattern: impl Into<String>) -> Self {
        Self::InvalidValue { parameter, pattern: pattern.into() }
    }

    /// Creates an invalid country code error.
    pub fn invalid_country_code(code: impl Into<String>) -> Self {
        Self::InvalidCountryCode { code: code.into() }
    }

    /// Creates an invalid visitor id error.
    pub fn invalid_visitor_id(value: impl Into<String>) -> Self {
        Self::InvalidVisitorId { value: value.into() }
    }

    /// Creates an invalid language range error.
    pub fn invalid_language_range(range: impl Into<String>) -> Self {
        Self::InvalidLanguageRange { range: range.into() }
    }

    /// Wire name of the parameter this error refers to, when there is one.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { parameter, .. } => Some(*parameter),
            Self::InvalidCountryCode { .. } => Some("country"),
            Self::InvalidVisitorId { .. } => Some("_id"),
            Self::InvalidLanguageRange { .. } => Some("lang"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_names_parameter_and_pattern() {
        let error = ParameterError::invalid_value("token_auth", "[a-z0-9]{32}");
        assert_eq!(error.to_string(), "invalid value for token_auth: must match regex [a-z0-9]{32}");
        assert_eq!(error.parameter(), Some("token_auth"));
    }

    #[test]
    fn formatter_errors_map_to_their_parameter() {
        assert_eq!(ParameterError::invalid_country_code("xyz").parameter(), Some("country"));
        assert_eq!(ParameterError::invalid_visitor_id("zz").parameter(), Some("_id"));
        assert_eq!(ParameterError::invalid_language_range(";q=").parameter(), Some("lang"));
    }
}
