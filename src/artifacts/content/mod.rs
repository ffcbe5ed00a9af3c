//! File content proofs and equality
//!
//! - `checksum`: CRC-32 over a byte stream
//! - `digest`: SHA-1 content digests
//! - `text`: text/binary guessing and line-terminator normalized comparison
//! - `inspector`: picks the cheapest method two files can both afford and applies it

pub mod checksum;
pub mod digest;
pub mod inspector;
pub mod text;

/// Size of the read buffer used when streaming file content
pub const READ_CHUNK_SIZE: usize = 64 * 1024;
