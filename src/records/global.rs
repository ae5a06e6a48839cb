//! GLOB - global variable.
//!
//! ```text
//! EDID  Editor id (zstring)
//! FNAM  Value type (u8: 's' short, 'l' long, 'f' float)
//! FLTV  Value (f32, whatever the type)
//! ```

use crate::Result;
use crate::form_id::FormId;
use crate::reader::{RecordFlags, RecordHeader, SubRecordReader};
use crate::records::{LoadRecord, skip_ignored};
use crate::tag::{Tag, subrecord_tags};

/// Declared type of a global.
///
/// The value is always stored as `f32`; the type only says how scripts
/// should treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobalType {
    Short,
    Long,
    #[default]
    Float,
    Unknown(u8),
}

impl From<u8> for GlobalType {
    fn from(v: u8) -> Self {
        match v {
            b's' => Self::Short,
            b'l' => Self::Long,
            b'f' => Self::Float,
            x => Self::Unknown(x),
        }
    }
}

/// A loaded `GLOB` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Global {
    pub id: FormId,
    pub flags: RecordFlags,
    pub editor_id: String,
    pub value_type: GlobalType,
    pub value: f32,
}

subrecord_tags! {
    enum GlobalField {
        Edid = b"EDID",
        Fnam = b"FNAM",
        Fltv = b"FLTV",
    }
}

impl Global {
    /// The value truncated according to its declared type.
    pub fn typed_value(&self) -> f64 {
        match self.value_type {
            GlobalType::Short | GlobalType::Long => self.value.trunc() as f64,
            _ => self.value as f64,
        }
    }
}

impl LoadRecord for Global {
    const TAG: Tag = Tag(*b"GLOB");
    const IGNORED: &'static [Tag] = &[];

    fn load(header: &RecordHeader, reader: &mut SubRecordReader<'_>) -> Result<Self> {
        let mut global = Global {
            id: reader.resolve_header_id(header),
            flags: header.flags,
            ..Default::default()
        };

        while let Some(sub) = reader.next_sub_record_header()? {
            match GlobalField::from_tag(sub.tag) {
                Some(GlobalField::Edid) => global.editor_id = reader.read_zstring()?,
                Some(GlobalField::Fnam) => {
                    global.value_type = GlobalType::from(reader.read_scalar::<u8>()?)
                }
                Some(GlobalField::Fltv) => global.value = reader.read_scalar()?,
                None => skip_ignored::<Self>(reader, sub.tag)?,
            }
        }

        Ok(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::form_id::{FormIdResolver, RawFormId};
    use crate::header::FileContext;

    fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut v = tag.to_vec();
        v.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        v.extend_from_slice(payload);
        v
    }

    fn load(data: &[u8]) -> Result<Global> {
        let ctx = FileContext::default();
        let resolver = FormIdResolver::new(vec![], 2);
        let header = RecordHeader {
            tag: Global::TAG,
            data_size: data.len() as u32,
            flags: RecordFlags(0),
            form_id: RawFormId(0x0000_0039),
            vc_info: 0,
            form_version: None,
            offset: 0,
        };
        let mut reader = SubRecordReader::new(Global::TAG, data, &ctx, &resolver);
        Global::load(&header, &mut reader)
    }

    #[test]
    fn loads_typed_global() {
        let data = [
            sub(b"EDID", b"GameHour\0"),
            sub(b"FNAM", b"s"),
            sub(b"FLTV", &7.75f32.to_le_bytes()),
        ]
        .concat();
        let g = load(&data).unwrap();
        assert_eq!(g.id, FormId { file: 2, index: 0x39 });
        assert_eq!(g.editor_id, "GameHour");
        assert_eq!(g.value_type, GlobalType::Short);
        assert_eq!(g.typed_value(), 7.0);
    }

    #[test]
    fn nothing_is_ignorable() {
        let data = sub(b"MODL", b"x\0");
        assert!(matches!(
            load(&data),
            Err(Error::UnknownSubrecord { tag, record })
                if tag == Tag(*b"MODL") && record == Global::TAG
        ));
    }
}
