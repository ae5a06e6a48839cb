//! Little-endian readers over any `Read`.
//!
//! A short read is an error, never a partial value.
//!
//! Fixed-layout subrecord payloads are decoded by passing `&mut &[u8]` as the
//! reader, so running off the end of a payload surfaces as
//! [`crate::Error::UnexpectedEof`].

use std::io::Read;

use crate::{Error, Result};

/// One byte.
#[inline]
pub(crate) fn u8<R: Read>(r: &mut R) -> Result<u8> {
    let [b] = bytesa(r)?;
    Ok(b)
}

/// `u16`.
#[inline]
pub(crate) fn le_u16<R: Read>(r: &mut R) -> Result<u16> {
    Ok(u16::from_le_bytes(bytesa(r)?))
}

/// `i16`.
#[inline]
pub(crate) fn le_i16<R: Read>(r: &mut R) -> Result<i16> {
    Ok(i16::from_le_bytes(bytesa(r)?))
}

/// `u32`.
#[inline]
pub(crate) fn le_u32<R: Read>(r: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(bytesa(r)?))
}

/// `i32`.
#[inline]
pub(crate) fn le_i32<R: Read>(r: &mut R) -> Result<i32> {
    Ok(i32::from_le_bytes(bytesa(r)?))
}

/// `f32`.
#[inline]
pub(crate) fn le_f32<R: Read>(r: &mut R) -> Result<f32> {
    Ok(f32::from_le_bytes(bytesa(r)?))
}

/// `N` raw bytes.
#[inline]
pub(crate) fn bytesa<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    r.read_exact(&mut out)?;
    Ok(out)
}

/// `len` raw bytes.
#[inline]
///
/// The buffer grows as data arrives, so an oversized `len` from a corrupt
/// file fails with [`Error::UnexpectedEof`] instead of allocating it.
#[inline]
pub(crate) fn bytesv<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    r.take(len as u64).read_to_end(&mut out)?;
    if out.len() != len {
        return Err(Error::UnexpectedEof);
    }
    Ok(out)
}

/// Decode a string that ends at the first null byte, or at the end of `buf`
/// if there is none.
///
/// Plugin strings are Windows-1252 in practice; bytes that are not valid
/// UTF-8 are replaced rather than rejected.
#[inline]
pub(crate) fn null_padded_string(buf: &[u8]) -> String {
    let text = buf.split(|&b| b == 0).next().unwrap_or_default();
    String::from_utf8_lossy(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reader_stops_at_end() {
        let mut r: &[u8] = &[0x34, 0x12, 0xFF];
        assert_eq!(le_u16(&mut r).unwrap(), 0x1234);
        assert!(matches!(le_u16(&mut r), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn null_padded_string_stops_at_first_null() {
        assert_eq!(null_padded_string(b"Lydia\0\0junk"), "Lydia");
        assert_eq!(null_padded_string(b"NoTerminator"), "NoTerminator");
    }
}
