//! Four-character type codes.
//!
//! Every record, group and subrecord in a plugin starts with a 4-byte ASCII
//! code (`NPC_`, `GRUP`, `EDID`, ...). [`Tag`] wraps the raw bytes so that
//! comparisons stay byte-exact while still printing readably.

use std::fmt;

/// A 4-byte record or subrecord type code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Header record every plugin starts with.
    pub const TES4: Tag = Tag(*b"TES4");
    /// Group envelope.
    pub const GRUP: Tag = Tag(*b"GRUP");
    /// Size override for the subrecord that follows.
    pub const XXXX: Tag = Tag(*b"XXXX");

    /// The code as a little-endian integer, as it appears on disk.
    pub fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<[u8; 4]> for Tag {
    fn from(b: [u8; 4]) -> Self {
        Tag(b)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic()) {
            for &b in &self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "{:#010x}", self.as_u32())
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Declare the closed set of subrecord tags a record kind handles.
///
/// Generates a fieldless enum with `from_tag` / `tag` conversions so loaders
/// can match exhaustively instead of comparing raw codes.
macro_rules! subrecord_tags {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $code:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            /// Map a raw tag to a handled field, if this record kind knows it.
            $vis fn from_tag(tag: $crate::tag::Tag) -> Option<Self> {
                match &tag.0 {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The on-disk tag for this field.
            #[allow(dead_code)]
            $vis fn tag(self) -> $crate::tag::Tag {
                match self {
                    $(Self::$variant => $crate::tag::Tag(*$code),)*
                }
            }
        }
    };
}

pub(crate) use subrecord_tags;
