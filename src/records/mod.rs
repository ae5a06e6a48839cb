//! Record kinds and the tag-to-loader registry.
//!
//! Each submodule targets one record kind. All loaders follow the same
//! conventions:
//!
//! * **One pass, in file order** - subrecords are applied as they stream in.
//!   Scalar fields are overwritten by a later subrecord with the same tag,
//!   list fields are appended to.
//! * **Closed tag sets** - every kind declares the subrecords it handles and,
//!   separately, those it knowingly ignores. Anything else fails the record
//!   with [`crate::Error::UnknownSubrecord`].
//! * **Layouts by size** - where a payload differs between games, the
//!   declared size picks the layout. A size that matches no known layout is
//!   skipped and the field keeps its default.
//! * **Resolved references only** - form ids are resolved as they are read.
//!
//! | Module | Tag | Record |
//! |--------|-----|--------|
//! | [`npc`]    | `NPC_` | Non-player character / actor base |
//! | [`global`] | `GLOB` | Global variable |

pub mod global;
pub mod npc;

use crate::form_id::FormId;
use crate::reader::{RecordHeader, SubRecordReader};
use crate::tag::Tag;
use crate::{Error, Result};

pub use global::Global;
pub use npc::Npc;

/// A record kind with a loader.
pub trait LoadRecord: Sized {
    /// On-disk record type.
    const TAG: Tag;

    /// Subrecords this kind recognizes but does not interpret.
    const IGNORED: &'static [Tag];

    /// Build the record from its header and payload.
    fn load(header: &RecordHeader, reader: &mut SubRecordReader<'_>) -> Result<Self>;
}

/// Skip an ignorable subrecord, or fail on one that is not.
///
/// Loaders call this from the fallback arm of their tag match.
pub(crate) fn skip_ignored<T: LoadRecord>(
    reader: &mut SubRecordReader<'_>,
    tag: Tag,
) -> Result<()> {
    if !T::IGNORED.contains(&tag) {
        return Err(Error::UnknownSubrecord {
            tag,
            record: T::TAG,
        });
    }
    log::trace!("{}: ignoring {tag}", T::TAG);
    reader.skip_current_subrecord()
}

/// The closed set of record kinds this crate loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Npc,
    Global,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Npc, RecordKind::Global];

    /// Look up the loader for a record or top-level group tag.
    pub fn from_tag(tag: Tag) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn tag(self) -> Tag {
        match self {
            Self::Npc => Npc::TAG,
            Self::Global => Global::TAG,
        }
    }

    /// Run this kind's loader.
    pub fn load(self, header: &RecordHeader, reader: &mut SubRecordReader<'_>) -> Result<Record> {
        Ok(match self {
            Self::Npc => Record::Npc(Npc::load(header, reader)?),
            Self::Global => Record::Global(Global::load(header, reader)?),
        })
    }
}

/// A fully loaded record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Npc(Npc),
    Global(Global),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Npc(_) => RecordKind::Npc,
            Self::Global(_) => RecordKind::Global,
        }
    }

    /// Resolved id of the record itself.
    pub fn form_id(&self) -> FormId {
        match self {
            Self::Npc(r) => r.id,
            Self::Global(r) => r.id,
        }
    }

    pub fn editor_id(&self) -> &str {
        match self {
            Self::Npc(r) => &r.editor_id,
            Self::Global(r) => &r.editor_id,
        }
    }

    pub fn as_npc(&self) -> Option<&Npc> {
        match self {
            Self::Npc(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_global(&self) -> Option<&Global> {
        match self {
            Self::Global(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_maps_tags() {
        assert_eq!(RecordKind::from_tag(Tag(*b"NPC_")), Some(RecordKind::Npc));
        assert_eq!(RecordKind::from_tag(Tag(*b"GLOB")), Some(RecordKind::Global));
        assert_eq!(RecordKind::from_tag(Tag(*b"WEAP")), None);
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_tag(kind.tag()), Some(kind));
        }
    }
}
