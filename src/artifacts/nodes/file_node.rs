//! File leaves
//!
//! A [`FileNode`] describes one file of a tree: its name, kind, size and modification
//! time, plus a [`ContentSource`] through which its content can be proven equal to
//! another file's. Each source states how expensive every [`ContentMethod`] is for
//! it; an archive entry carries a CRC for free while a file on disk has to be read.
//!
//! The node memoizes the facts derived from its content (text guess, checksum,
//! digest) the first time they are asked for.

use crate::artifacts::content::checksum::crc32;
use crate::artifacts::content::digest::ContentDigest;
use crate::artifacts::content::text::probe_text;
use crate::artifacts::nodes::Node;
use chrono::{DateTime, Utc};
use derive_new::new;
use std::fmt;
use std::io::Read;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    #[default]
    Regular,
    Symlink,
    Special,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Regular => "file",
            FileType::Symlink => "symlink",
            FileType::Special => "special",
        }
    }
}

/// Relative price a source pays to produce one kind of content proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cost {
    Easy,
    Moderate,
    Hard,
    VeryHard,
    Impossible,
}

impl Cost {
    /// Additive weight of the cost, `None` when the method is not available at all
    pub fn weight(self) -> Option<u64> {
        match self {
            Cost::Easy => Some(1),
            Cost::Moderate => Some(10),
            Cost::Hard => Some(100),
            Cost::VeryHard => Some(1000),
            Cost::Impossible => None,
        }
    }

    pub fn is_possible(self) -> bool {
        self != Cost::Impossible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentMethod {
    /// CRC-32 of the content
    Checksum,
    /// SHA-1 of the content
    Digest,
    /// Raw byte for byte comparison
    Bytes,
    /// Byte comparison after line terminator normalization
    Text,
}

impl ContentMethod {
    /// Methods deciding binary equality, in tie-break order
    pub const BINARY: [ContentMethod; 3] = [
        ContentMethod::Checksum,
        ContentMethod::Digest,
        ContentMethod::Bytes,
    ];

    pub fn index(self) -> usize {
        match self {
            ContentMethod::Checksum => 0,
            ContentMethod::Digest => 1,
            ContentMethod::Bytes => 2,
            ContentMethod::Text => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentMethod::Checksum => "checksum",
            ContentMethod::Digest => "digest",
            ContentMethod::Bytes => "bytes",
            ContentMethod::Text => "text",
        }
    }
}

impl fmt::Display for ContentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the bytes of a file come from
///
/// `open` hands out a fresh stream on every call; streams are never shared or
/// rewound. Sources that already know a checksum or digest (archive entries,
/// snapshot records) expose it through `stored_checksum`/`stored_digest`.
pub trait ContentSource: fmt::Debug + Send + Sync {
    fn cost(&self, method: ContentMethod) -> Cost;

    fn open(&self) -> anyhow::Result<Box<dyn Read + '_>>;

    fn stored_checksum(&self) -> Option<u32> {
        None
    }

    fn stored_digest(&self) -> Option<ContentDigest> {
        None
    }
}

#[derive(Debug, new)]
pub struct FileNode {
    name: String,
    file_type: FileType,
    size: u64,
    source: Arc<dyn ContentSource>,
    #[new(default)]
    root: Option<String>,
    #[new(default)]
    modified: Option<DateTime<Utc>>,
    #[new(default)]
    text: OnceLock<bool>,
    #[new(default)]
    checksum: OnceLock<u32>,
    #[new(default)]
    digest: OnceLock<ContentDigest>,
}

impl FileNode {
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    pub fn cost(&self, method: ContentMethod) -> Cost {
        self.source.cost(method)
    }

    pub fn open(&self) -> anyhow::Result<Box<dyn Read + '_>> {
        self.source.open()
    }

    /// Whether the content looks like text, judged from its first bytes
    pub fn is_text(&self) -> anyhow::Result<bool> {
        if let Some(text) = self.text.get() {
            return Ok(*text);
        }

        let text = probe_text(self.open()?)?;
        Ok(*self.text.get_or_init(|| text))
    }

    /// CRC-32 of the content, taken from the source when it already knows it
    pub fn checksum(&self) -> anyhow::Result<u32> {
        if let Some(checksum) = self.checksum.get() {
            return Ok(*checksum);
        }

        let checksum = match self.source.stored_checksum() {
            Some(checksum) => checksum,
            None => crc32(self.open()?)?,
        };
        Ok(*self.checksum.get_or_init(|| checksum))
    }

    /// SHA-1 digest of the content, taken from the source when it already knows it
    pub fn digest(&self) -> anyhow::Result<ContentDigest> {
        if let Some(digest) = self.digest.get() {
            return Ok(digest.clone());
        }

        let digest = match self.source.stored_digest() {
            Some(digest) => digest,
            None => ContentDigest::from_reader(self.open()?)?,
        };
        Ok(self.digest.get_or_init(|| digest).clone())
    }
}

impl Node for FileNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }
}
