use crate::artifacts::content::READ_CHUNK_SIZE;
use flate2::Crc;
use std::io::{self, Read};

/// CRC-32 (the zip/gzip polynomial) of everything `reader` yields
pub fn crc32(mut reader: impl Read) -> io::Result<u32> {
    let mut crc = Crc::new();
    let mut buffer = vec![0; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => crc.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(crc.sum())
}
