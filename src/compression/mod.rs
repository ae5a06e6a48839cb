//! Record decompression (requires the `compression` feature).
//!
//! Gated behind the `compression` Cargo feature so that the core loader
//! builds without a zlib implementation. It is enabled by default; turn it
//! off when every plugin you load is known to be uncompressed:
//!
//! ```toml
//! [dependencies]
//! esmkit = { version = "0.1", default-features = false }
//! ```
//!
//! Without the feature, a record with the compressed flag fails with
//! [`crate::Error::Parse`].
//!
//! ## Submodules
//!
//! | Module | Algorithm | Typical use in esmkit |
//! |--------|-----------|-----------------------|
//! | [`zlib`] | zlib (deflate) | Record payloads flagged `0x00040000` |

#[cfg(feature = "compression")]
pub mod zlib;
