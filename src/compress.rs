//! Optional deflate compression of the plaintext payload.

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionId {
    None,
    Deflate,
}

impl CompressionId {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Deflate),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Deflate => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("decompressed size {actual} does not match expected plain_size {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub fn compress(id: CompressionId, plaintext: &[u8]) -> Result<Vec<u8>, CompressError> {
    match id {
        CompressionId::None => Ok(plaintext.to_vec()),
        CompressionId::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(plaintext)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Decompress `data`. When `expected_len` is `Some`, the output length must
/// match exactly.
pub fn decompress(
    id: CompressionId,
    data: &[u8],
    expected_len: Option<usize>,
) -> Result<Vec<u8>, CompressError> {
    let out = match id {
        CompressionId::None => data.to_vec(),
        CompressionId::Deflate => {
            let mut decoder = DeflateDecoder::new(data);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            out
        }
    };

    if let Some(expected) = expected_len {
        if out.len() != expected {
            return Err(CompressError::SizeMismatch {
                expected,
                actual: out.len(),
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deflate_roundtrip() {
        let plain = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = compress(CompressionId::Deflate, &plain).unwrap();
        assert!(compressed.len() < plain.len());
        let decompressed =
            decompress(CompressionId::Deflate, &compressed, Some(plain.len())).unwrap();
        assert_eq!(decompressed, plain);
    }

    #[test]
    fn none_roundtrip() {
        let plain = b"unchanged".to_vec();
        let compressed = compress(CompressionId::None, &plain).unwrap();
        assert_eq!(compressed, plain);
        let decompressed = decompress(CompressionId::None, &compressed, Some(plain.len())).unwrap();
        assert_eq!(decompressed, plain);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let plain = b"hello world".to_vec();
        let compressed = compress(CompressionId::Deflate, &plain).unwrap();
        let err = decompress(CompressionId::Deflate, &compressed, Some(plain.len() + 1));
        assert!(matches!(err, Err(CompressError::SizeMismatch { .. })));
    }
}
