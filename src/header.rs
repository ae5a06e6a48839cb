//! The `TES4` file header record and the per-file parsing context.
//!
//! ## Subrecords
//! ```text
//! HEDR  Version (f32) | RecordCount (u32) | NextObjectId (u32)    12 bytes
//! CNAM  Author (zstring)
//! SNAM  Description (zstring)
//! MAST  Master file name (zstring), repeated once per master
//! DATA  Master file size (u64), follows each MAST
//! INTV  Internal version (u32)
//! INCC  Interior cell count (u32)
//! ```
//!
//! ## Version table
//! | HEDR version | Game |
//! |--------------|------|
//! | 0.8, 1.0     | Oblivion (20-byte headers) |
//! | 0.94         | Fallout 3, early Skyrim (form version < 40 means Fallout 3) |
//! | 1.32 - 1.34  | Fallout: New Vegas |
//! | 1.7          | Skyrim |
//! | 0.95, 1.0    | Fallout 4 (24-byte headers) |

use crate::form_id::FormIdResolver;
use crate::reader::{RecordFlags, RecordHeader, SubRecordReader};
use crate::tag::{Tag, subrecord_tags};
use crate::{Error, Result};

/// HEDR version, kept as the raw `f32` bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EsmVersion {
    #[default]
    V080,
    V094,
    V095,
    V100,
    V132,
    V133,
    V134,
    V170,
    Other(u32),
}

impl EsmVersion {
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            0x3F4C_CCCD => Self::V080,
            0x3F70_A3D7 => Self::V094,
            0x3F73_3333 => Self::V095,
            0x3F80_0000 => Self::V100,
            0x3FA8_F5C3 => Self::V132,
            0x3FAA_3D71 => Self::V133,
            0x3FAB_851F => Self::V134,
            0x3FD9_999A => Self::V170,
            x => Self::Other(x),
        }
    }

    pub fn to_bits(self) -> u32 {
        match self {
            Self::V080 => 0x3F4C_CCCD,
            Self::V094 => 0x3F70_A3D7,
            Self::V095 => 0x3F73_3333,
            Self::V100 => 0x3F80_0000,
            Self::V132 => 0x3FA8_F5C3,
            Self::V133 => 0x3FAA_3D71,
            Self::V134 => 0x3FAB_851F,
            Self::V170 => 0x3FD9_999A,
            Self::Other(x) => x,
        }
    }

    pub fn as_f32(self) -> f32 {
        f32::from_bits(self.to_bits())
    }
}

/// Everything a record loader needs to know about the file it reads from.
///
/// Fixed once the header has been parsed and passed to every loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileContext {
    pub version: EsmVersion,
    /// [`None`] for 20-byte record headers.
    pub form_version: Option<u16>,
    /// Header flag `0x80`.
    pub localized: bool,
}

impl FileContext {
    /// Oblivion.
    pub fn is_tes4(&self) -> bool {
        matches!(self.version, EsmVersion::V080 | EsmVersion::V100) && self.form_version.is_none()
    }

    /// Fallout: New Vegas.
    pub fn is_fonv(&self) -> bool {
        matches!(
            self.version,
            EsmVersion::V132 | EsmVersion::V133 | EsmVersion::V134
        )
    }

    /// Skyrim. Fallout 3 shares version 0.94 but predates form version 40.
    pub fn is_tes5(&self) -> bool {
        match self.version {
            EsmVersion::V170 => true,
            EsmVersion::V094 => self.form_version.is_some_and(|v| v >= 40),
            _ => false,
        }
    }

    /// Fallout 4.
    pub fn is_fo4(&self) -> bool {
        match self.version {
            EsmVersion::V095 => true,
            EsmVersion::V100 => self.form_version.is_some(),
            _ => false,
        }
    }

    /// Whether display strings are string-table ids rather than inline text.
    pub fn uses_string_tables(&self) -> bool {
        self.localized && !self.is_tes4()
    }
}

/// One entry of the plugin's master list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Master {
    pub name: String,
    /// Size recorded by the editor; not checked against the real file.
    pub size: u64,
}

/// Parsed `TES4` header record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileHeader {
    pub flags: RecordFlags,
    pub version: EsmVersion,
    pub form_version: Option<u16>,
    pub num_records: u32,
    pub next_object_id: u32,
    pub author: String,
    pub description: String,
    pub masters: Vec<Master>,
    pub internal_version: Option<u32>,
    pub interior_cell_count: Option<u32>,
}

subrecord_tags! {
    enum HeaderField {
        Hedr = b"HEDR",
        Cnam = b"CNAM",
        Snam = b"SNAM",
        Mast = b"MAST",
        Data = b"DATA",
        Intv = b"INTV",
        Incc = b"INCC",
    }
}

impl FileHeader {
    /// Parse the header from the `TES4` record payload.
    ///
    /// Subrecords this parser does not use (override lists, offsets,
    /// screenshots, ...) are skipped whatever their tag.
    pub fn load(record: &RecordHeader, data: &[u8]) -> Result<Self> {
        let ctx = FileContext::default();
        let resolver = FormIdResolver::new(Vec::new(), 0);
        let mut reader = SubRecordReader::new(Tag::TES4, data, &ctx, &resolver);

        let mut header = FileHeader {
            flags: record.flags,
            form_version: record.form_version,
            ..Default::default()
        };
        let mut seen_hedr = false;

        while let Some(sub) = reader.next_sub_record_header()? {
            let Some(field) = HeaderField::from_tag(sub.tag) else {
                log::trace!("TES4: skipping {}", sub.tag);
                reader.skip_current_subrecord()?;
                continue;
            };
            match field {
                HeaderField::Hedr => {
                    if sub.data_size != 12 {
                        return Err(Error::UnsupportedRecordVariant {
                            tag: sub.tag,
                            size: sub.data_size,
                        });
                    }
                    header.version = EsmVersion::from_bits(reader.read_scalar()?);
                    header.num_records = reader.read_scalar()?;
                    header.next_object_id = reader.read_scalar()?;
                    seen_hedr = true;
                }
                HeaderField::Cnam => header.author = reader.read_zstring()?,
                HeaderField::Snam => header.description = reader.read_zstring()?,
                HeaderField::Mast => header.masters.push(Master {
                    name: reader.read_zstring()?,
                    size: 0,
                }),
                HeaderField::Data => match header.masters.last_mut() {
                    Some(master) if sub.data_size == 8 => master.size = reader.read_scalar()?,
                    _ => reader.skip_current_subrecord()?,
                },
                HeaderField::Intv => header.internal_version = Some(reader.read_scalar()?),
                HeaderField::Incc => header.interior_cell_count = Some(reader.read_scalar()?),
            }
        }

        if !seen_hedr {
            return Err(Error::Parse("TES4 record has no HEDR"));
        }
        Ok(header)
    }

    /// The parsing context for the rest of the file.
    pub fn context(&self) -> FileContext {
        FileContext {
            version: self.version,
            form_version: self.form_version,
            localized: self.flags.contains(RecordFlags::LOCALIZED),
        }
    }

    /// Master file names in declaration order.
    pub fn master_names(&self) -> Vec<String> {
        self.masters.iter().map(|m| m.name.clone()).collect()
    }

    pub fn is_master(&self) -> bool {
        self.flags.contains(RecordFlags::MASTER)
    }
}
