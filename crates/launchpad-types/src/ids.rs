//! Opaque entity identifiers
//!
//! An [`ObjectId`] is 12 bytes, exchanged on the wire as exactly 24 hex
//! characters. Layout of generated ids:
//!
//! ```text
//! | 4 bytes unix seconds (BE) | 5 bytes process nonce | 3 bytes counter (BE) |
//! ```
//!
//! Ids minted by one process therefore sort by creation time, with the
//! counter breaking ties inside the same second.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use thiserror::Error;

/// Length of an identifier in bytes
pub const ID_LEN: usize = 12;

/// Length of the canonical hex encoding
pub const HEX_LEN: usize = ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Identifier parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier must be exactly {HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),

    #[error("identifier contains non-hex character {character:?} at position {index}")]
    InvalidCharacter { character: char, index: usize },
}

/// Unique identifier for catalog and deployment records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Generate a fresh identifier stamped with the current time
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        Self::with_timestamp(secs)
    }

    fn with_timestamp(secs: u32) -> Self {
        static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & (COUNTER_MASK >> 1)))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_nonce());
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse the canonical 24-character hex form (either case)
    pub fn parse(text: &str) -> Result<Self, IdError> {
        if text.len() != HEX_LEN {
            return Err(IdError::InvalidLength(text.len()));
        }
        if let Some((index, character)) = text
            .char_indices()
            .find(|(_, c)| !c.is_ascii_hexdigit())
        {
            return Err(IdError::InvalidCharacter { character, index });
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|_| IdError::InvalidLength(text.len()))?;
        Ok(Self(bytes))
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation time embedded in the identifier
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        chrono::DateTime::from_timestamp(secs as i64, 0).unwrap_or_default()
    }
}

fn process_nonce() -> &'static [u8; 5] {
    static NONCE: OnceLock<[u8; 5]> = OnceLock::new();
    NONCE.get_or_init(|| rand::random())
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique_and_ordered() {
        let id1 = ObjectId::generate();
        let id2 = ObjectId::generate();
        assert_ne!(id1, id2);
        assert!(id1 < id2);
    }

    #[test]
    fn test_parse_known_value() {
        let id = ObjectId::parse("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(id.bytes()[0], 0x50);
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
        assert_eq!(id.timestamp().timestamp(), 0x507f1f77);
    }

    #[test]
    fn test_parse_uppercase_normalizes() {
        let id: ObjectId = "507F1F77BCF86CD799439011".parse().unwrap();
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ObjectId::parse(""), Err(IdError::InvalidLength(0)));
        assert_eq!(ObjectId::parse("not-an-id"), Err(IdError::InvalidLength(9)));
        assert_eq!(
            ObjectId::parse("507f1f77bcf86cd79943901g"),
            Err(IdError::InvalidCharacter {
                character: 'g',
                index: 23
            })
        );
        // 24 bytes but multi-byte characters
        assert!(ObjectId::parse("507f1f77bcf86cd7994390é").is_err());
    }

    #[test]
    fn test_timestamp_matches_generation_time() {
        let before = chrono::Utc::now().timestamp();
        let id = ObjectId::generate();
        let after = chrono::Utc::now().timestamp();
        let ts = id.timestamp().timestamp();
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = ObjectId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1b2c3d4e5f60718293a4b\"");

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ObjectId>("\"xyz\"").is_err());
    }
}
