use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Six character page view id drawn from `[0-9A-Za-z]`.
///
/// All requests belonging to one page view should share the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(i64);

impl UniqueId {
    /// Generates a random id.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen())
    }

    /// Creates the id that corresponds to `value`.
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..6 {
            // Truncation to 32 bits is part of the id format.
            let code_point = (self.0 >> (index * 8)) as i32;
            let position = (code_point % ALPHABET.len() as i32).unsigned_abs() as usize;
            write!(f, "{}", ALPHABET[position] as char)?;
        }
        Ok(())
    }
}
