//! TLV chunk reader/writer for the envelope header.
//!
//! Chunk layout: `tag:u8 len:u8 value:len bytes`. A `len` byte means every
//! chunk value is at most 255 bytes; that's enough for the fixed-size
//! fields this format carries (uints, cipher ids, salts, KDF params).

pub const TAG_END: u8 = 0;
pub const TAG_DATA_SIZE: u8 = 1;
pub const TAG_PLAIN_SIZE: u8 = 2;
pub const TAG_COMPRESSION: u8 = 3;
pub const TAG_CIPHER: u8 = 4;
pub const TAG_KDF: u8 = 5;
pub const TAG_KDF_PARAMS: u8 = 6;
pub const TAG_SALT: u8 = 7;
pub const TAG_CRC32: u8 = 8;

pub struct Chunk<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

/// Append one chunk to `buf`. Panics if `value.len() > 255`, which would be
/// a programming error in a writer (every value written here has a known,
/// small, fixed size).
pub fn write_chunk(buf: &mut Vec<u8>, tag: u8, value: &[u8]) {
    assert!(value.len() <= 255, "chunk value too long for a u8 length");
    buf.push(tag);
    buf.push(value.len() as u8);
    buf.extend_from_slice(value);
}

/// Encode a uint in its natural (smallest u32-or-less) little-endian width.
/// Writers always use this for DATA_SIZE/PLAIN_SIZE/CRC32 so readers can
/// exercise the integer-width-tolerance path against bytes this crate itself
/// could plausibly have written, plus non-u32 widths for forward/backward
/// compatibility with other writers.
pub fn encode_uint_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Decode a little-endian uint of width 1, 2, 4, or 8 bytes.
pub fn decode_uint(value: &[u8]) -> Result<u64, TlvError> {
    match value.len() {
        1 => Ok(value[0] as u64),
        2 => Ok(u16::from_le_bytes(value.try_into().unwrap()) as u64),
        4 => Ok(u32::from_le_bytes(value.try_into().unwrap()) as u64),
        8 => Ok(u64::from_le_bytes(value.try_into().unwrap())),
        other => Err(TlvError::BadUintWidth(other)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TlvError {
    #[error("corrupted file envelope: not a valid uint encoding (len {0})")]
    BadUintWidth(usize),

    #[error("truncated chunk header")]
    TruncatedHeader,

    #[error("truncated chunk value")]
    TruncatedValue,
}

/// Iterate the chunks in `data`, stopping at TAG_END, EOF of `data`, or a
/// truncated chunk. Returns each `(tag, value)` pair via `on_chunk`; stops
/// early (without error) on TAG_END or exhaustion, tolerating short or
/// truncated metadata rather than treating it as an error.
pub fn for_each_chunk<'a, E: From<TlvError>>(
    data: &'a [u8],
    mut on_chunk: impl FnMut(Chunk<'a>) -> Result<(), E>,
) -> Result<(), E> {
    let mut pos = 0usize;
    loop {
        if data.len() - pos < 2 {
            // Implicit end of chunks: no more data for a full header.
            return Ok(());
        }
        let tag = data[pos];
        let len = data[pos + 1] as usize;
        pos += 2;
        if tag == TAG_END {
            return Ok(());
        }
        if data.len() - pos < len {
            return Err(TlvError::TruncatedValue.into());
        }
        let value = &data[pos..pos + len];
        pos += len;
        on_chunk(Chunk { tag, value })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_width_tolerance() {
        for value in [0u64, 1, 255, 65535, u32::MAX as u64] {
            for width in [1usize, 2, 4, 8] {
                if value >= 1u64 << (width * 8) {
                    continue;
                }
                let bytes = value.to_le_bytes();
                let slice = &bytes[..width];
                assert_eq!(decode_uint(slice).unwrap(), value, "width {width}");
            }
        }
    }

    #[test]
    fn stops_at_end_tag() {
        let mut data = Vec::new();
        write_chunk(&mut data, TAG_COMPRESSION, &[0]);
        data.push(TAG_END);
        write_chunk(&mut data, TAG_CIPHER, &[1]); // should never be visited

        let mut seen = Vec::new();
        for_each_chunk(&data, |c| {
            seen.push(c.tag);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![TAG_COMPRESSION]);
    }

    #[test]
    fn short_metadata_stops_cleanly() {
        let mut data = Vec::new();
        write_chunk(&mut data, TAG_COMPRESSION, &[0]);
        // No TAG_END, no trailing junk: iteration should just run out.
        let mut seen = Vec::new();
        for_each_chunk(&data, |c| {
            seen.push(c.tag);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![TAG_COMPRESSION]);
    }
}
