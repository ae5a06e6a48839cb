//! zlib record payloads (requires the `compression` feature).
//!
//! A compressed record's payload is laid out as
//! ```text
//! [0x00] DecompressedSize  (u32 LE)
//! [0x04] zlib stream       (DataSize - 4 bytes)
//! ```
//! The subrecords are parsed from the inflated bytes exactly as if the
//! record had been stored uncompressed.

#![cfg(feature = "compression")]

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::utils::le_u32;
use crate::{Error, Result};

/// Inflate a compressed record payload into `out`.
///
/// `out` is cleared first so one buffer can serve every record of a file.
/// Returns [`Error::Decompress`] if the stream is corrupt or inflates to a
/// different size than its prefix declares.
pub fn inflate_record(data: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let mut rest = data;
    let size = le_u32(&mut rest)? as usize;

    out.clear();
    // Untrusted prefix: reserve at most 64 times the stream size.
    out.reserve(size.min(data.len().saturating_mul(64)));
    ZlibDecoder::new(rest)
        .take(size as u64 + 1)
        .read_to_end(out)
        .map_err(|_| Error::Decompress)?;

    if out.len() != size {
        return Err(Error::Decompress);
    }
    Ok(())
}
