//! Byte-level builders for synthetic plugin files.

#![allow(dead_code)]

use std::io::Cursor;

/// Encode one subrecord.
pub fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = tag.to_vec();
    v.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    v.extend_from_slice(payload);
    v
}

pub fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A plugin under construction.
pub struct Plugin {
    /// 20-byte (Oblivion) or 24-byte record and group headers.
    header_size: usize,
    version: f32,
    form_version: u16,
    flags: u32,
    masters: Vec<String>,
    body: Vec<u8>,
}

impl Plugin {
    pub fn oblivion() -> Self {
        Self {
            header_size: 20,
            version: 1.0,
            form_version: 0,
            flags: 0,
            masters: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn skyrim() -> Self {
        Self {
            header_size: 24,
            version: 1.7,
            form_version: 44,
            ..Self::oblivion()
        }
    }

    pub fn new_vegas() -> Self {
        Self {
            header_size: 24,
            version: 1.34,
            form_version: 15,
            ..Self::oblivion()
        }
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn master(mut self, name: &str) -> Self {
        self.masters.push(name.to_owned());
        self
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Encode a record with an explicit payload.
    pub fn record(&self, tag: &[u8; 4], flags: u32, form_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut v = tag.to_vec();
        v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        v.extend_from_slice(&flags.to_le_bytes());
        v.extend_from_slice(&form_id.to_le_bytes());
        v.extend_from_slice(&0u32.to_le_bytes());
        if self.header_size == 24 {
            v.extend_from_slice(&self.form_version.to_le_bytes());
            v.extend_from_slice(&0u16.to_le_bytes());
        }
        v.extend_from_slice(payload);
        v
    }

    /// Encode a group of the given type around already-encoded contents.
    pub fn group_of_type(&self, label: &[u8; 4], group_type: i32, contents: &[Vec<u8>]) -> Vec<u8> {
        let body = contents.concat();
        let mut v = b"GRUP".to_vec();
        v.extend_from_slice(&((self.header_size + body.len()) as u32).to_le_bytes());
        v.extend_from_slice(label);
        v.extend_from_slice(&group_type.to_le_bytes());
        v.extend_from_slice(&0u32.to_le_bytes());
        if self.header_size == 24 {
            v.extend_from_slice(&0u32.to_le_bytes());
        }
        v.extend(body);
        v
    }

    /// Encode a top-level group.
    pub fn group(&self, label: &[u8; 4], contents: &[Vec<u8>]) -> Vec<u8> {
        self.group_of_type(label, 0, contents)
    }

    /// Append encoded bytes after the header.
    pub fn push(mut self, bytes: Vec<u8>) -> Self {
        self.body.extend(bytes);
        self
    }

    /// Encode the `TES4` header record.
    pub fn header_record(&self) -> Vec<u8> {
        let mut hedr = self.version.to_le_bytes().to_vec();
        hedr.extend_from_slice(&0u32.to_le_bytes());
        hedr.extend_from_slice(&0x800u32.to_le_bytes());

        let mut payload = sub(b"HEDR", &hedr);
        payload.extend(sub(b"CNAM", b"esmkit\0"));
        for master in &self.masters {
            let mut name = master.as_bytes().to_vec();
            name.push(0);
            payload.extend(sub(b"MAST", &name));
            payload.extend(sub(b"DATA", &0u64.to_le_bytes()));
        }
        self.record(b"TES4", self.flags, 0, &payload)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_record();
        out.extend_from_slice(&self.body);
        out
    }

    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }
}

/// `GLOB` payload.
pub fn global(editor_id: &str, value_type: u8, value: f32) -> Vec<u8> {
    let mut edid = editor_id.as_bytes().to_vec();
    edid.push(0);
    [
        sub(b"EDID", &edid),
        sub(b"FNAM", &[value_type]),
        sub(b"FLTV", &value.to_le_bytes()),
    ]
    .concat()
}
