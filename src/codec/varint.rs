//! Hand-rolled little-endian base-128 varint codec (unsigned, LEB128-style),
//! used to length-prefix every record in the native stream format.
//!
//! Pulled out of a crate deliberately: the format pins exact error semantics
//! (truncation past 10 continuation bytes, hard overflow past 64 bits) that
//! a generic varint crate doesn't expose as distinguishable error variants.

use std::io::{Read, Write};

use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};

const MAX_CONTINUATION_BYTES: usize = 10;

/// Appends `value` to `out` as a little-endian base-128 varint.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

/// Reads one varint-encoded value from `reader`. Fails with
/// [`NevrcapErrorKind::VarintTruncated`] past 10 continuation bytes, or
/// [`NevrcapErrorKind::VarintOverflow`] if the decoded value would not fit
/// in a `u64`.
pub fn decode_varint<R: Read>(reader: &mut R) -> NevrcapResult<u64> {
    let mut accumulator: u128 = 0;
    let mut shift: u32 = 0;
    let mut continuation_bytes = 0usize;
    let mut byte_buf = [0u8; 1];

    loop {
        reader.read_exact(&mut byte_buf)?;
        let byte = byte_buf[0];
        accumulator |= u128::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            if accumulator > u128::from(u64::MAX) {
                return NevrcapError::new_result(NevrcapErrorKind::VarintOverflow {
                    value: accumulator,
                });
            }
            return Ok(accumulator as u64);
        }
        continuation_bytes += 1;
        if continuation_bytes > MAX_CONTINUATION_BYTES {
            return NevrcapError::new_result(NevrcapErrorKind::VarintTruncated);
        }
        shift += 7;
    }
}

/// Writes `bytes` prefixed with its varint-encoded length, reusing
/// `scratch` across calls to keep the steady-state write path free of
/// per-frame heap churn.
pub fn write_length_prefixed<W: Write>(
    writer: &mut W,
    bytes: &[u8],
    scratch: &mut Vec<u8>,
) -> NevrcapResult<()> {
    scratch.clear();
    encode_varint(bytes.len() as u64, scratch);
    writer.write_all(scratch)?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Reads a varint-prefixed payload into `scratch`, clearing it first.
/// Returns `Ok(false)` on a clean end-of-stream (no bytes available where a
/// length prefix was expected), `Ok(true)` if a payload was read.
pub fn read_length_prefixed<R: Read>(
    reader: &mut R,
    scratch: &mut Vec<u8>,
) -> NevrcapResult<bool> {
    let mut first_byte = [0u8; 1];
    if reader.read(&mut first_byte)? == 0 {
        return Ok(false);
    }

    let mut accumulator: u128 = u128::from(first_byte[0] & 0x7f);
    let mut shift: u32 = 7;
    let mut continuing = first_byte[0] & 0x80 != 0;
    let mut continuation_bytes = 0usize;

    while continuing {
        continuation_bytes += 1;
        if continuation_bytes > MAX_CONTINUATION_BYTES {
            return NevrcapError::new_result(NevrcapErrorKind::VarintTruncated);
        }
        let mut byte_buf = [0u8; 1];
        reader.read_exact(&mut byte_buf)?;
        let byte = byte_buf[0];
        accumulator |= u128::from(byte & 0x7f) << shift;
        continuing = byte & 0x80 != 0;
        shift += 7;
    }

    if accumulator > u128::from(u64::MAX) {
        return NevrcapError::new_result(NevrcapErrorKind::VarintOverflow { value: accumulator });
    }

    let len = accumulator as usize;
    scratch.clear();
    scratch.resize(len, 0);
    reader.read_exact(scratch)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_small_and_large_values() {
        for value in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let mut cursor = Cursor::new(buf);
            assert_eq!(decode_varint(&mut cursor).unwrap(), value);
        }
    }

    #[test]
    fn more_than_ten_continuation_bytes_truncates() {
        let bytes = vec![0x80u8; 11];
        let mut cursor = Cursor::new(bytes);
        let err = decode_varint(&mut cursor).unwrap_err();
        assert!(matches!(err.kind, NevrcapErrorKind::VarintTruncated));
    }

    #[test]
    fn ten_continuation_bytes_then_terminator_succeeds() {
        let mut bytes = vec![0x80u8; 10];
        bytes.push(0x00);
        let mut cursor = Cursor::new(bytes);
        assert_eq!(decode_varint(&mut cursor).unwrap(), 0);
    }

    #[test]
    fn length_prefixed_round_trip() {
        let mut buf = Vec::new();
        let mut scratch = Vec::new();
        write_length_prefixed(&mut buf, b"hello world", &mut scratch).unwrap();

        let mut cursor = Cursor::new(buf);
        let mut out = Vec::new();
        assert!(read_length_prefixed(&mut cursor, &mut out).unwrap());
        assert_eq!(out, b"hello world");
        assert!(!read_length_prefixed(&mut cursor, &mut out).unwrap());
    }
}
