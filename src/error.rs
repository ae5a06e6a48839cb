//! Errors raised while reading plugins.

use std::fmt;
use std::io;

use crate::tag::Tag;

/// Result alias used throughout esmkit.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading a plugin.
///
/// Loader failures reach the caller wrapped in [`Error::Record`], which names
/// the record that was being read. Use [`Error::root`] to get at the cause.
#[derive(Debug)]
pub enum Error {
    /// Truncated stream, header or subrecord.
    UnexpectedEof,
    /// A subrecord tag that the record kind neither handles nor ignores.
    UnknownSubrecord { tag: Tag, record: Tag },
    /// A zero-terminated string array was missing its final terminator.
    MalformedStringArray { tag: Tag },
    /// A subrecord's payload size matches none of the known layouts.
    UnsupportedRecordVariant { tag: Tag, size: u32 },
    /// A loader consumed fewer bytes than the subrecord declared.
    SizeMismatch { tag: Tag, declared: u32, consumed: u32 },
    /// The file does not start with a `TES4` header record.
    BadMagic,
    /// An offset, length or element count does not fit its container.
    InvalidRange,
    /// Any other structural problem.
    Parse(&'static str),
    /// A plugin was loaded that is not part of the active load order.
    UnknownPlugin(String),
    /// A plugin names a master that is not part of the active load order.
    MissingMaster { plugin: String, master: String },
    /// The load order holds more plugins than a resolved form id can address.
    LoadOrderTooLarge(usize),
    /// I/O failure other than a short read.
    Io(io::Error),
    /// A compressed record could not be inflated.
    #[cfg(feature = "compression")]
    Decompress,
    /// A record failed to load.
    Record {
        tag: Tag,
        form_id: u32,
        offset: u64,
        source: Box<Error>,
    },
}

impl Error {
    /// The innermost error, with any [`Error::Record`] context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Record { source, .. } => source.root(),
            e => e,
        }
    }

    pub(crate) fn in_record(self, tag: Tag, form_id: u32, offset: u64) -> Self {
        Error::Record {
            tag,
            form_id,
            offset,
            source: Box::new(self),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "stream ended early"),
            Error::UnknownSubrecord { tag, record } => {
                write!(f, "unknown subrecord {tag} in {record} record")
            }
            Error::MalformedStringArray { tag } => {
                write!(f, "{tag}: string array is not zero-terminated")
            }
            Error::UnsupportedRecordVariant { tag, size } => {
                write!(f, "{tag}: no known layout is {size} bytes long")
            }
            Error::SizeMismatch {
                tag,
                declared,
                consumed,
            } => write!(
                f,
                "{tag}: declared {declared} bytes but {consumed} were read"
            ),
            Error::BadMagic => write!(f, "not a TES4 plugin"),
            Error::InvalidRange => write!(f, "offset or length out of range"),
            Error::Parse(s) => write!(f, "malformed plugin: {s}"),
            Error::UnknownPlugin(p) => write!(f, "plugin '{p}' is not in the load order"),
            Error::MissingMaster { plugin, master } => {
                write!(f, "plugin '{plugin}' requires missing master '{master}'")
            }
            Error::LoadOrderTooLarge(n) => write!(f, "load order has {n} plugins"),
            Error::Io(e) => write!(f, "{e}"),
            #[cfg(feature = "compression")]
            Error::Decompress => write!(f, "zlib decompression failed"),
            Error::Record {
                tag,
                form_id,
                offset,
                source,
            } => write!(
                f,
                "{tag} record {form_id:08X} at offset {offset:#x}: {source}"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Record { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(e)
        }
    }
}
