use crate::artifacts::content::READ_CHUNK_SIZE;
use crate::artifacts::content::text::text_equal;
use crate::artifacts::errors::CompareError;
use crate::artifacts::nodes::{ContentMethod, FileNode, Node};
use derive_new::new;
use std::io::{self, Read};
use tracing::debug;

/// Decides whether two files have the same content
///
/// In text-aware mode two text files are compared with normalized line
/// terminators, a text file never equals a binary one, and two binary files fall
/// through to the binary comparison. Binary comparison first checks sizes, then
/// applies whichever of checksum, digest or raw bytes costs both sides the least.
#[derive(Debug, Clone, Copy, Default, new)]
pub struct Inspector {
    text_aware: bool,
}

impl Inspector {
    /// Cheapest binary method both files support
    ///
    /// Ties go to the method listed first in [`ContentMethod::BINARY`].
    pub fn select_method(a: &FileNode, b: &FileNode) -> Result<ContentMethod, CompareError> {
        ContentMethod::BINARY
            .iter()
            .copied()
            .filter_map(|method| {
                let total = a.cost(method).weight()? + b.cost(method).weight()?;
                Some((method, total))
            })
            .min_by_key(|(_, total)| *total)
            .map(|(method, _)| method)
            .ok_or_else(|| CompareError::NoViableMethod {
                name: a.name().to_string(),
            })
    }

    pub fn is_text_comparable(a: &FileNode, b: &FileNode) -> bool {
        a.cost(ContentMethod::Text).is_possible() && b.cost(ContentMethod::Text).is_possible()
    }

    pub fn content_equal(&self, a: &FileNode, b: &FileNode) -> anyhow::Result<bool> {
        if self.text_aware && Self::is_text_comparable(a, b) {
            match (a.is_text()?, b.is_text()?) {
                (true, true) => {
                    debug!(file = a.name(), method = %ContentMethod::Text, "comparing content");
                    return Ok(text_equal(a.open()?, b.open()?)?);
                }
                (true, false) | (false, true) => return Ok(false),
                (false, false) => {}
            }
        }

        self.binary_equal(a, b)
    }

    pub fn binary_equal(&self, a: &FileNode, b: &FileNode) -> anyhow::Result<bool> {
        if a.size() != b.size() {
            return Ok(false);
        }

        let method = Self::select_method(a, b)?;
        debug!(file = a.name(), %method, "comparing content");

        match method {
            ContentMethod::Checksum => Ok(a.checksum()? == b.checksum()?),
            ContentMethod::Digest => Ok(a.digest()? == b.digest()?),
            ContentMethod::Bytes => Ok(bytes_equal(a.open()?, b.open()?)?),
            ContentMethod::Text => Ok(text_equal(a.open()?, b.open()?)?),
        }
    }
}

/// Compare two streams byte for byte
pub fn bytes_equal(mut a: impl Read, mut b: impl Read) -> io::Result<bool> {
    let mut buffer_a = vec![0; READ_CHUNK_SIZE];
    let mut buffer_b = vec![0; READ_CHUNK_SIZE];

    loop {
        let n = read_full(&mut a, &mut buffer_a)?;
        let m = read_full(&mut b, &mut buffer_b)?;

        if n != m || buffer_a[..n] != buffer_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn read_full(reader: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::memory::MemorySource;
    use crate::artifacts::nodes::{Cost, FileType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    fn node(source: MemorySource) -> FileNode {
        FileNode::new(
            "file".to_string(),
            FileType::Regular,
            source.len() as u64,
            Arc::new(source),
        )
    }

    fn costs(checksum: Cost, digest: Cost, bytes: Cost) -> MemorySource {
        MemorySource::new("content")
            .with_cost(ContentMethod::Checksum, checksum)
            .with_cost(ContentMethod::Digest, digest)
            .with_cost(ContentMethod::Bytes, bytes)
    }

    #[test]
    fn selects_lowest_total_cost() {
        let disk = node(costs(Cost::Hard, Cost::VeryHard, Cost::Moderate));
        let archive = node(costs(Cost::Easy, Cost::Easy, Cost::Hard));

        assert_eq!(
            Inspector::select_method(&disk, &archive),
            Ok(ContentMethod::Checksum)
        );
        assert_eq!(
            Inspector::select_method(&disk, &disk),
            Ok(ContentMethod::Bytes)
        );
    }

    #[test]
    fn equal_totals_prefer_checksum_then_digest() {
        let cheap = node(costs(Cost::Easy, Cost::Easy, Cost::Easy));
        assert_eq!(
            Inspector::select_method(&cheap, &cheap),
            Ok(ContentMethod::Checksum)
        );

        let no_checksum = node(costs(Cost::Impossible, Cost::Moderate, Cost::Moderate));
        assert_eq!(
            Inspector::select_method(&no_checksum, &no_checksum),
            Ok(ContentMethod::Digest)
        );
    }

    #[rstest]
    #[case(Cost::Hard)]
    #[case(Cost::VeryHard)]
    #[case(Cost::Impossible)]
    fn irrelevant_cost_does_not_change_selection(#[case] digest: Cost) {
        let a = node(costs(Cost::Easy, digest, Cost::Hard));
        let b = node(costs(Cost::Moderate, Cost::Hard, Cost::Moderate));

        assert_eq!(Inspector::select_method(&a, &b), Ok(ContentMethod::Checksum));
    }

    #[test]
    fn no_shared_method_is_a_configuration_error() {
        let snapshot = node(MemorySource::snapshot("content"));
        let archive = node(MemorySource::archived("content"));

        let error = Inspector::new(false)
            .content_equal(&snapshot, &archive)
            .expect_err("no method is shared");

        assert!(CompareError::is_fatal(&error));
        assert_eq!(
            error.downcast_ref::<CompareError>(),
            Some(&CompareError::NoViableMethod {
                name: "file".to_string()
            })
        );
    }

    #[test]
    fn size_mismatch_short_circuits_before_selection() -> anyhow::Result<()> {
        let snapshot = node(MemorySource::snapshot("short"));
        let archive = node(MemorySource::archived("much longer"));

        assert!(!Inspector::new(false).content_equal(&snapshot, &archive)?);
        Ok(())
    }

    #[test]
    fn chosen_method_decides_the_outcome() -> anyhow::Result<()> {
        // Same size, different bytes, but the stored checksums collide.
        let a = node(MemorySource::archived("abc").with_checksum(7));
        let b = node(MemorySource::archived("xyz").with_checksum(7));
        assert!(Inspector::new(false).content_equal(&a, &b)?);

        let a = node(MemorySource::new("abc").with_cost(ContentMethod::Checksum, Cost::Impossible));
        let b = node(MemorySource::new("xyz").with_cost(ContentMethod::Checksum, Cost::Impossible));
        assert!(!Inspector::new(false).content_equal(&a, &b)?);

        Ok(())
    }

    #[test]
    fn snapshot_digest_matches_streamed_digest() -> anyhow::Result<()> {
        let snapshot = node(MemorySource::snapshot("payload"));
        let disk = node(
            MemorySource::new("payload")
                .with_cost(ContentMethod::Checksum, Cost::Hard)
                .with_cost(ContentMethod::Digest, Cost::VeryHard)
                .with_cost(ContentMethod::Bytes, Cost::Moderate),
        );

        assert_eq!(
            Inspector::select_method(&snapshot, &disk),
            Ok(ContentMethod::Digest)
        );
        assert!(Inspector::new(false).content_equal(&snapshot, &disk)?);
        Ok(())
    }

    #[rstest]
    #[case("one\r\ntwo\r\n", "one\ntwo\n", true, true)]
    #[case("one\r\ntwo\r\n", "one\ntwo\n", false, false)]
    #[case("text", "te\0t", true, false)]
    #[case("\0\x01\x02\x03", "\0\x01\x02\x03", true, true)]
    #[case("\0\x01\x02\x03", "\0\x01\x02\x04", true, false)]
    fn text_awareness(
        #[case] a: &'static str,
        #[case] b: &'static str,
        #[case] text_aware: bool,
        #[case] expected: bool,
    ) -> anyhow::Result<()> {
        let inspector = Inspector::new(text_aware);

        assert_eq!(
            inspector.content_equal(&node(MemorySource::new(a)), &node(MemorySource::new(b)))?,
            expected
        );
        Ok(())
    }

    #[test]
    fn text_mode_needs_text_support_on_both_sides() -> anyhow::Result<()> {
        let a = node(MemorySource::new("one\r\n"));
        let b = node(MemorySource::new("one\n").with_cost(ContentMethod::Text, Cost::Impossible));

        assert!(!Inspector::is_text_comparable(&a, &b));
        assert!(!Inspector::new(true).content_equal(&a, &b)?);
        Ok(())
    }

    #[test]
    fn bytes_equal_spans_multiple_chunks() -> io::Result<()> {
        let mut long = vec![7u8; READ_CHUNK_SIZE * 2 + 3];
        assert!(bytes_equal(long.as_slice(), long.clone().as_slice())?);

        let copy = long.clone();
        if let Some(last) = long.last_mut() {
            *last = 8;
        }
        assert!(!bytes_equal(long.as_slice(), copy.as_slice())?);
        assert!(!bytes_equal(&copy[..10], copy.as_slice())?);
        Ok(())
    }
}
