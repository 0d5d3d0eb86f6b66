//! Stateless little-endian field readers.
//!
//! Each reader consumes exactly the bytes it names from the source or fails
//! with the name of the field it was reading.

use crate::error::FooterError;
use std::io::{self, Read};

/// Read exactly `N` bytes into a stack array.
pub fn read_array<R, const N: usize>(
    reader: &mut R,
    field: &'static str,
) -> Result<[u8; N], FooterError>
where
    R: Read + ?Sized,
{
    let mut buf = [0u8; N];
    reader
        .read_exact(&mut buf)
        .map_err(|e| FooterError::from_io(field, e))?;
    Ok(buf)
}

/// Read an unsigned little-endian integer of `width` bytes (1..=8).
pub fn read_uint<R>(reader: &mut R, width: usize, field: &'static str) -> Result<u64, FooterError>
where
    R: Read + ?Sized,
{
    assert!((1..=8).contains(&width), "unsupported integer width {width}");

    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf[..width])
        .map_err(|e| FooterError::from_io(field, e))?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_le16<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<u16, FooterError> {
    Ok(read_uint(reader, 2, field)? as u16)
}

pub fn read_le32<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<u32, FooterError> {
    Ok(read_uint(reader, 4, field)? as u32)
}

pub fn read_le64<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<u64, FooterError> {
    read_uint(reader, 8, field)
}

/// Read exactly `len` bytes into a fresh buffer.
///
/// Callers bound `len` before calling; this function allocates it up front.
pub fn read_vec<R>(reader: &mut R, len: usize, field: &'static str) -> Result<Vec<u8>, FooterError>
where
    R: Read + ?Sized,
{
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|e| FooterError::from_io(field, e))?;
    Ok(buf)
}

/// Skip `len` reserved bytes, failing if the source ends first.
pub fn skip<R>(reader: &mut R, len: u64, field: &'static str) -> Result<(), FooterError>
where
    R: Read + ?Sized,
{
    let skipped = io::copy(&mut reader.take(len), &mut io::sink())
        .map_err(|e| FooterError::from_io(field, e))?;

    if skipped < len {
        return Err(FooterError::TruncatedInput { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_uint_is_little_endian() {
        let mut cur = Cursor::new(vec![0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(read_uint(&mut cur, 3, "x").unwrap(), 0x030201);
        assert_eq!(read_uint(&mut cur, 2, "y").unwrap(), 0x0504);
    }

    #[test]
    fn typed_readers_advance_in_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());
        data.extend_from_slice(&0xD0B5B1C4u32.to_le_bytes());
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut cur = Cursor::new(data);

        assert_eq!(read_le16(&mut cur, "a").unwrap(), 0xBEEF);
        assert_eq!(read_le32(&mut cur, "b").unwrap(), 0xD0B5B1C4);
        assert_eq!(read_le64(&mut cur, "c").unwrap(), u64::MAX);
    }

    #[test]
    fn short_read_names_the_field() {
        let mut cur = Cursor::new(vec![0u8; 3]);
        match read_le32(&mut cur, "ftr_size") {
            Err(FooterError::TruncatedInput { field }) => assert_eq!(field, "ftr_size"),
            other => panic!("expected TruncatedInput, got: {other:?}"),
        }
    }

    #[test]
    fn read_array_and_vec_take_exact_lengths() {
        let mut cur = Cursor::new((0u8..10).collect::<Vec<_>>());
        let head: [u8; 4] = read_array(&mut cur, "head").unwrap();
        assert_eq!(head, [0, 1, 2, 3]);
        assert_eq!(read_vec(&mut cur, 6, "tail").unwrap(), vec![4, 5, 6, 7, 8, 9]);
        assert!(read_vec(&mut cur, 1, "more").is_err());
    }

    #[test]
    fn skip_moves_forward() {
        let mut cur = Cursor::new(vec![9, 9, 9, 9, 7]);
        skip(&mut cur, 4, "spare2").unwrap();
        assert_eq!(read_array::<_, 1>(&mut cur, "next").unwrap(), [7]);
    }

    #[test]
    fn skip_past_end_is_truncation() {
        let mut cur = Cursor::new(vec![0u8; 10]);
        match skip(&mut cur, 32, "key_to_salt_padding") {
            Err(FooterError::TruncatedInput { field }) => {
                assert_eq!(field, "key_to_salt_padding")
            }
            other => panic!("expected TruncatedInput, got: {other:?}"),
        }
    }
}
