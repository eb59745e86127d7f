//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings.
//!
//! ## Storage
//!
//! Objects are stored in `<store>/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if invalid length/characters
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Check whether `prefix` could abbreviate an object ID
    pub fn is_valid_prefix(prefix: &str) -> bool {
        !prefix.is_empty()
            && prefix.len() <= OBJECT_ID_LENGTH
            && prefix.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl TryFrom<String> for ObjectId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        Self::try_parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn any_forty_hex_chars_parse(id in "[0-9a-f]{40}") {
            let oid = ObjectId::try_parse(id.clone()).unwrap();
            assert_eq!(oid.as_ref(), id);
            assert_eq!(oid.to_path(), PathBuf::from(&id[..2]).join(&id[2..]));
        }

        #[test]
        fn wrong_length_is_rejected(id in "[0-9a-f]{1,39}") {
            assert!(ObjectId::try_parse(id).is_err());
        }
    }

    #[test]
    fn non_hex_characters_are_rejected() {
        let id = "z".repeat(OBJECT_ID_LENGTH);
        assert!(ObjectId::try_parse(id).is_err());
    }

    #[test]
    fn prefixes_must_be_short_hex() {
        assert!(ObjectId::is_valid_prefix("a1b2"));
        assert!(!ObjectId::is_valid_prefix(""));
        assert!(!ObjectId::is_valid_prefix("master"));
        assert!(!ObjectId::is_valid_prefix(&"a".repeat(41)));
    }

    #[test]
    fn serde_rejects_malformed_ids() {
        let parsed = serde_json::from_str::<ObjectId>("\"not-a-hash\"");
        assert!(parsed.is_err());
    }
}
