//! SHA-256 content digests
//!
//! Loads are verified by digesting the source slot and the active image
//! independently and comparing the results. A digest is always computed
//! from a fresh, full read of the region, never from a cached buffer, so
//! external modification between operations is always detected.

use std::fmt;
use std::io::{self, Read};

use sha2::{Digest, Sha256};

/// Chunk size for streamed digesting and copying
pub const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 digest of a region's full content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest an in-memory buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Digest a reader to completion, streaming in [`CHUNK_SIZE`] chunks
pub fn digest_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<ContentDigest> {
    digest_reader_observed(reader, &mut |_| {})
}

/// Like [`digest_reader`], reporting each chunk's byte count to `observe`
pub fn digest_reader_observed<R: Read + ?Sized>(
    reader: &mut R,
    observe: &mut dyn FnMut(u64),
) -> io::Result<ContentDigest> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        observe(n as u64);
    }
    Ok(ContentDigest(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_known_vector() {
        let digest = ContentDigest::of_bytes(b"abc");
        assert_eq!(
            digest.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_input() {
        let digest = ContentDigest::of_bytes(b"");
        assert_eq!(
            digest.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_reader_matches_bytes() {
        let data = vec![0xa5u8; CHUNK_SIZE * 2 + 17];
        let from_reader = digest_reader(&mut Cursor::new(&data)).unwrap();
        assert_eq!(from_reader, ContentDigest::of_bytes(&data));
    }

    #[test]
    fn test_observer_counts_all_bytes() {
        let data = vec![7u8; CHUNK_SIZE + 100];
        let mut seen = 0u64;
        digest_reader_observed(&mut Cursor::new(&data), &mut |n| seen += n).unwrap();
        assert_eq!(seen, data.len() as u64);
    }
}
