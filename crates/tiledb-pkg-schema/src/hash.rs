//! SHA-256 digests and the checksum sidecar format.

use serde::{Deserialize, Deserializer, Serialize};

/// Errors produced when parsing a digest or a checksum sidecar.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DigestError {
    /// The digest is not 64 characters long.
    #[error("Invalid SHA256 digest: expected 64 hex characters, got {len} in '{value}'")]
    Length {
        /// Length of the rejected value.
        len: usize,
        /// The rejected value.
        value: String,
    },

    /// The digest contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),

    /// The sidecar has no digest token at all.
    #[error("Empty checksum file")]
    Empty,
}

/// A validated SHA256 digest (64 hex characters).
///
/// Digests read back from sidecar files are validated before they reach the
/// release manifest, but keep the case they were written in so the manifest
/// repeats the sidecar token exactly. Use [`Sha256Digest::matches`] to
/// compare digests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();

        if s.len() != 64 {
            return Err(DigestError::Length { len: s.len(), value: s });
        }

        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s));
        }

        Ok(Self(s))
    }

    /// Wrap raw digest bytes as produced by a hasher.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two digests name the same hash, ignoring hex case.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Render a sidecar line: `"<hex>  <filename>\n"`.
    ///
    /// Two spaces separate digest and name, matching `sha256sum` text mode
    /// so `sha256sum -c` accepts the file.
    pub fn sidecar_line(&self, filename: &str) -> String {
        format!("{}  {filename}\n", self.0)
    }

    /// Parse the digest out of sidecar contents (first whitespace token).
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Empty`] for an empty file, or a validation
    /// error if the first token is not a digest.
    pub fn from_sidecar(contents: &str) -> Result<Self, DigestError> {
        let token = contents.split_whitespace().next().ok_or(DigestError::Empty)?;
        Self::new(token)
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
