//! Content digest (SHA-1)
//!
//! Digests are 40-character lowercase hexadecimal strings. Snapshot sources store
//! them next to each entry; other sources compute them by streaming the content.
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "f7c3bc1d...")
//! - Short: first 7 characters

use crate::artifacts::content::READ_CHUNK_SIZE;
use sha1::{Digest, Sha1};
use std::io::{self, Read};

/// Length of a hex encoded SHA-1 digest
pub const DIGEST_LENGTH: usize = 40;

/// SHA-1 digest of a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Parse and validate a digest from its hex form
    ///
    /// Uppercase hex digits are accepted and normalized to lowercase.
    pub fn try_parse(digest: impl AsRef<str>) -> anyhow::Result<Self> {
        let digest = digest.as_ref();

        if digest.len() != DIGEST_LENGTH {
            return Err(anyhow::anyhow!("Invalid digest length: {}", digest.len()));
        }
        if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid digest characters: {}", digest));
        }

        Ok(Self(digest.to_ascii_lowercase()))
    }

    /// Digest everything `reader` yields
    pub fn from_reader(mut reader: impl Read) -> anyhow::Result<Self> {
        let mut hasher = Sha1::new();
        let mut buffer = vec![0; READ_CHUNK_SIZE];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Self::try_parse(format!("{:x}", hasher.finalize()))
    }

    pub fn from_bytes(content: &[u8]) -> Self {
        Self(format!("{:x}", Sha1::digest(content)))
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
