use std::fmt;

use serde::{Deserialize, Serialize};

use super::json_string;

/// A custom key/value pair attached to a visit or a page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVariable {
    /// Variable name
    pub key: String,
    /// Variable value
    pub value: String,
}

impl CustomVariable {
    /// Creates a variable.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Ordered custom variables, rendered as `{"1":["key","value"],...}` with
/// one-based slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomVariables(Vec<CustomVariable>);

impl CustomVariables {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable into the next slot.
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(CustomVariable::new(key, value));
        self
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no variable has been added.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<CustomVariable>> for CustomVariables {
    fn from(variables: Vec<CustomVariable>) -> Self {
        Self(variables)
    }
}

impl fmt::Display for CustomVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, variable) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(
                f,
                "\"{}\":[{},{}]",
                index + 1,
                json_string(&variable.key),
                json_string(&variable.value)
            )?;
        }
        f.write_str("}")
    }
}
