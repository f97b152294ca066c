use std::{fmt, str::FromStr};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};

/// Unique visitor id: eight bytes rendered as 16 lowercase hex characters.
///
/// Every visitor should keep the same id for its whole lifetime. Use
/// [`VisitorId::from_hash`] to derive a stable id from something like a
/// username hash instead of generating a random one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisitorId([u8; 8]);

impl VisitorId {
    /// Generates a random visitor id.
    pub fn random() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Derives a visitor id from a hash. The same hash always yields the same
    /// id.
    pub fn from_hash(hash: i64) -> Self {
        let mut bytes = [0u8; 8];
        let mut remaining = hash;
        // Only the first seven bytes carry the hash, the last stays zero.
        for (index, byte) in bytes.iter_mut().take(7).enumerate() {
            *byte = (remaining.wrapping_add(index as i64) & 0xFF) as u8;
            remaining >>= 8;
        }
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for VisitorId {
    type Err = ParameterError;

    fn from_str(value: &str) -> Result<Self> {
        if value.len() != 16 || !value.is_ascii() {
            return Err(ParameterError::invalid_visitor_id(value));
        }

        let mut bytes = [0u8; 8];
        for (index, byte) in bytes.iter_mut().enumerate() {
            let pair = &value[index * 2..index * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| ParameterError::invalid_visitor_id(value))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for VisitorId {
    type Error = ParameterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VisitorId> for String {
    fn from(id: VisitorId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_derived_id_is_stable() {
        assert_eq!(VisitorId::from_hash(3_434_343_434_343_434_343).to_string(), "6749be5b2c42af00");
        assert_eq!(VisitorId::from_hash(42), VisitorId::from_hash(42));
    }

    #[test]
    fn negative_hash_is_accepted() {
        let id = VisitorId::from_hash(-1);
        assert_eq!(id.to_string(), "ff00010203040500");
    }

    #[test]
    fn random_ids_render_sixteen_hex_chars() {
        let id = VisitorId::random().to_string();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parses_its_own_rendering() {
        let id = VisitorId::from_hash(987_654_321);
        assert_eq!(id.to_string().parse::<VisitorId>(), Ok(id));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("abc".parse::<VisitorId>().is_err());
        assert!("zzzzzzzzzzzzzzzz".parse::<VisitorId>().is_err());
        assert!("ääääääää".parse::<VisitorId>().is_err());
    }
}
