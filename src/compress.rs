//! Whole-buffer zlib compression for on-disk object storage (§4.1, §4.2).
//!
//! Unlike the grounding crate's `internal::zlib::stream::inflate`, which
//! decodes from a pack byte-stream while tracking a running object hash,
//! storage here is one object per file, so compression is a pair of pure
//! buffer-to-buffer functions. `flate2` is the same zlib binding the
//! grounding crate uses.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Deflate `data` at the default compression level.
pub fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflate a zlib-compressed buffer.
pub fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = deflate(&data).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn round_trips_empty() {
        let compressed = deflate(b"").unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn rejects_truncated_input() {
        let data = b"some reasonably sized payload to compress".repeat(3);
        let mut compressed = deflate(&data).unwrap();
        compressed.truncate(compressed.len() / 2);
        assert!(inflate(&compressed).is_err());
    }
}
