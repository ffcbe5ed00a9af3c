//! Text detection and text-aware comparison
//!
//! A file is guessed to be text from its first [`TEXT_PROBE_SIZE`] bytes: a NUL byte
//! means binary, and so does having more than a third of control bytes other than
//! tab, line feed and carriage return.
//!
//! Text comparison treats CRLF, CR and LF as the same line terminator and ignores a
//! single DOS end-of-file marker (0x1A) when it is the very last byte.

use std::io::{self, BufReader, Bytes, Read};
use std::iter::Peekable;

pub const TEXT_PROBE_SIZE: usize = 512;

/// DOS end-of-file marker (Ctrl-Z)
pub const DOS_EOF: u8 = 0x1A;

pub fn looks_like_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }

    let control = sample
        .iter()
        .filter(|&&byte| is_control(byte))
        .count();

    control * 3 <= sample.len()
}

fn is_control(byte: u8) -> bool {
    (byte < 0x20 && !matches!(byte, b'\t' | b'\n' | b'\r')) || byte == 0x7F
}

/// Read up to [`TEXT_PROBE_SIZE`] bytes from `reader` and guess whether they are text
pub fn probe_text(reader: impl Read) -> io::Result<bool> {
    let mut sample = Vec::with_capacity(TEXT_PROBE_SIZE);
    reader
        .take(TEXT_PROBE_SIZE as u64)
        .read_to_end(&mut sample)?;

    Ok(looks_like_text(&sample))
}

/// Byte iterator yielding text with every line terminator turned into `\n` and a
/// trailing DOS end-of-file marker dropped
pub struct NormalizedText<R: Read> {
    bytes: Peekable<Bytes<BufReader<R>>>,
}

impl<R: Read> NormalizedText<R> {
    pub fn new(reader: R) -> Self {
        NormalizedText {
            bytes: BufReader::new(reader).bytes().peekable(),
        }
    }
}

impl<R: Read> Iterator for NormalizedText<R> {
    type Item = io::Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = match self.bytes.next()? {
            Ok(byte) => byte,
            Err(e) => return Some(Err(e)),
        };

        match byte {
            b'\r' => {
                if matches!(self.bytes.peek(), Some(Ok(b'\n'))) {
                    self.bytes.next();
                }
                Some(Ok(b'\n'))
            }
            DOS_EOF if self.bytes.peek().is_none() => None,
            byte => Some(Ok(byte)),
        }
    }
}

/// Compare two streams as text
pub fn text_equal(a: impl Read, b: impl Read) -> io::Result<bool> {
    let mut a = NormalizedText::new(a);
    let mut b = NormalizedText::new(b);

    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ok(true),
            (Some(x), Some(y)) => {
                if x? != y? {
                    return Ok(false);
                }
            }
            (Some(x), None) => {
                x?;
                return Ok(false);
            }
            (None, Some(y)) => {
                y?;
                return Ok(false);
            }
        }
    }
}
