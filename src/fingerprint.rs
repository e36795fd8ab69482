//! Schema fingerprints for drift detection

use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::Result;
use crate::schema::MessageSchema;

/// SHA256 fingerprint of a schema's canonical JSON form
///
/// Two schemas with the same fingerprint declare the same fields; callers
/// use this to detect drift between a persisted schema file and the one
/// compiled into an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute the fingerprint of a schema
    ///
    /// The schema serializes with fields in ascending number order and map
    /// keys sorted, so equal schemas always hash to equal fingerprints.
    pub fn of_schema(schema: &MessageSchema) -> Result<Self> {
        let canonical = serde_json::to_string(schema)?;
        Ok(Self::from_bytes(canonical.as_bytes()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a schema matches this fingerprint
    pub fn verify(&self, schema: &MessageSchema) -> Result<bool> {
        Ok(*self == Self::of_schema(schema)?)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}
