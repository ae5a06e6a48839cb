//! Display strings and localized string tables.
//!
//! Older plugins store display names inline as null-terminated strings.
//! Localized plugins (header flag `0x80`) store a 32-bit id instead, which
//! is looked up in companion files shipped next to the plugin:
//!
//! | File | Used for | Entry encoding |
//! |------|----------|----------------|
//! | `<plugin>_<lang>.STRINGS`   | names (`FULL`)         | null-terminated |
//! | `<plugin>_<lang>.DLSTRINGS` | descriptions           | u32 length + bytes |
//! | `<plugin>_<lang>.ILSTRINGS` | dialogue               | u32 length + bytes |
//!
//! ## String table layout
//! ```text
//! [0x00] Count                         (u32 LE)
//! [0x04] DataSize                      (u32 LE)
//! [0x08] Directory (Count × 8 bytes)
//!          [0x00] StringId             (u32 LE)
//!          [0x04] Offset into data     (u32 LE)
//! [...]  Data (DataSize bytes)
//! ```
//!
//! The tables may not be loaded yet when records are parsed, so a localized
//! field is kept as a [`LocalizedString`] handle and resolved on first access.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use crate::utils::{bytesv, le_u32, null_padded_string};
use crate::{Error, Result};

/// Which companion table a localized id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTableKind {
    Strings,
    DlStrings,
    IlStrings,
}

impl StringTableKind {
    /// File extension of the companion file, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Strings => "STRINGS",
            Self::DlStrings => "DLSTRINGS",
            Self::IlStrings => "ILSTRINGS",
        }
    }

    fn length_prefixed(self) -> bool {
        !matches!(self, Self::Strings)
    }
}

/// Source of localized strings.
pub trait StringLookup {
    fn lookup(&self, kind: StringTableKind, id: u32) -> Option<&str>;
}

/// One parsed companion string table.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: HashMap<u32, String>,
}

impl StringTable {
    /// Parse a string table of the given kind.
    pub fn parse<R: Read>(r: &mut R, kind: StringTableKind) -> Result<Self> {
        let count = le_u32(r)?;
        let data_size = le_u32(r)? as usize;

        // `count` is untrusted; the directory grows only as entries are read.
        let mut directory = Vec::new();
        for _ in 0..count {
            let id = le_u32(r)?;
            let offset = le_u32(r)? as usize;
            directory.push((id, offset));
        }

        let data = bytesv(r, data_size)?;

        let mut entries = HashMap::with_capacity(directory.len());
        for (id, offset) in directory {
            let mut slice = data.get(offset..).ok_or(Error::InvalidRange)?;
            if kind.length_prefixed() {
                let len = le_u32(&mut slice)? as usize;
                slice = slice.get(..len).ok_or(Error::InvalidRange)?;
            }
            entries.insert(id, null_padded_string(slice));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three companion tables of one plugin and language.
#[derive(Debug, Clone, Default)]
pub struct StringTables {
    pub strings: StringTable,
    pub dl_strings: StringTable,
    pub il_strings: StringTable,
}

impl StringTables {
    /// Load `<plugin stem>_<language>.<EXT>` of every kind from `dir`.
    pub fn open(dir: impl AsRef<Path>, plugin: &str, language: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let stem = plugin.rsplit_once('.').map_or(plugin, |(stem, _)| stem);
        let load = |kind: StringTableKind| -> Result<StringTable> {
            let path = dir.join(format!("{stem}_{language}.{}", kind.extension()));
            log::debug!("loading string table {}", path.display());
            let mut file = BufReader::new(File::open(path)?);
            StringTable::parse(&mut file, kind)
        };
        Ok(Self {
            strings: load(StringTableKind::Strings)?,
            dl_strings: load(StringTableKind::DlStrings)?,
            il_strings: load(StringTableKind::IlStrings)?,
        })
    }
}

impl StringLookup for StringTables {
    fn lookup(&self, kind: StringTableKind, id: u32) -> Option<&str> {
        match kind {
            StringTableKind::Strings => self.strings.get(id),
            StringTableKind::DlStrings => self.dl_strings.get(id),
            StringTableKind::IlStrings => self.il_strings.get(id),
        }
    }
}

/// Lazily resolved handle to a string-table entry.
///
/// Equality ignores the cache: two handles are equal when they name the
/// same entry.
#[derive(Debug, Clone)]
pub struct LocalizedString {
    pub kind: StringTableKind,
    pub id: u32,
    resolved: OnceLock<String>,
}

impl PartialEq for LocalizedString {
    fn eq(&self, other: &Self) -> bool {
        (self.kind, self.id) == (other.kind, other.id)
    }
}

impl Eq for LocalizedString {}

impl LocalizedString {
    pub fn new(kind: StringTableKind, id: u32) -> Self {
        Self {
            kind,
            id,
            resolved: OnceLock::new(),
        }
    }

    /// Resolve against `lookup`, caching the first successful result.
    ///
    /// A miss is not cached, so a later call can succeed once the table has
    /// been loaded.
    pub fn get<L: StringLookup + ?Sized>(&self, lookup: &L) -> Option<&str> {
        if let Some(s) = self.resolved.get() {
            return Some(s.as_str());
        }
        if self.id == 0 {
            return Some(self.resolved.get_or_init(String::new).as_str());
        }
        let s = lookup.lookup(self.kind, self.id)?;
        Some(self.resolved.get_or_init(|| s.to_owned()).as_str())
    }

    /// The cached value, if [`Self::get`] has already succeeded.
    pub fn cached(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }
}

/// A display string as read from a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayString {
    Inline(String),
    Localized(LocalizedString),
}

impl Default for DisplayString {
    fn default() -> Self {
        Self::Inline(String::new())
    }
}

impl DisplayString {
    /// The text, resolving localized ids through `lookup` if necessary.
    pub fn get<L: StringLookup + ?Sized>(&self, lookup: &L) -> Option<&str> {
        match self {
            Self::Inline(s) => Some(s.as_str()),
            Self::Localized(l) => l.get(lookup),
        }
    }

    /// The text if it is available without a string table.
    pub fn as_inline(&self) -> Option<&str> {
        match self {
            Self::Inline(s) => Some(s.as_str()),
            Self::Localized(l) => l.cached(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, &[u8])]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut dir = Vec::new();
        for (id, bytes) in entries {
            dir.extend_from_slice(&id.to_le_bytes());
            dir.extend_from_slice(&(data.len() as u32).to_le_bytes());
            data.extend_from_slice(bytes);
        }
        let mut out = Vec::new();
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend(dir);
        out.extend(data);
        out
    }

    #[test]
    fn parses_null_terminated_table() {
        let bytes = table(&[(7, &b"Lydia\0"[..]), (9, &b"Whiterun Guard\0"[..])]);
        let t = StringTable::parse(&mut bytes.as_slice(), StringTableKind::Strings).unwrap();
        assert_eq!(t.get(7), Some("Lydia"));
        assert_eq!(t.get(9), Some("Whiterun Guard"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn parses_length_prefixed_table() {
        let bytes = table(&[(1, &b"\x04\0\0\0abc\0"[..])]);
        let t = StringTable::parse(&mut bytes.as_slice(), StringTableKind::DlStrings).unwrap();
        assert_eq!(t.get(1), Some("abc"));
    }

    #[test]
    fn bad_offset_is_rejected() {
        let mut bytes = table(&[(1, &b"x\0"[..])]);
        // Point the only directory entry past the data block.
        bytes[12..16].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            StringTable::parse(&mut bytes.as_slice(), StringTableKind::Strings),
            Err(Error::InvalidRange)
        ));
    }

    #[test]
    fn localized_resolves_once_table_is_loaded() {
        let handle = LocalizedString::new(StringTableKind::Strings, 7);
        let empty = StringTables::default();
        assert_eq!(handle.get(&empty), None);
        assert_eq!(handle.cached(), None);

        let bytes = table(&[(7, &b"Lydia\0"[..])]);
        let tables = StringTables {
            strings: StringTable::parse(&mut bytes.as_slice(), StringTableKind::Strings).unwrap(),
            ..Default::default()
        };
        assert_eq!(handle.get(&tables), Some("Lydia"));
        assert_eq!(handle.cached(), Some("Lydia"));
        // Cached value wins even against a table that no longer has it.
        assert_eq!(handle.get(&empty), Some("Lydia"));
    }

    #[test]
    fn opens_companion_files() {
        let dir = std::env::temp_dir().join(format!("esmkit-strings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Mod_English.STRINGS"), table(&[(3, &b"Sword\0"[..])])).unwrap();
        std::fs::write(dir.join("Mod_English.DLSTRINGS"), table(&[])).unwrap();
        std::fs::write(
            dir.join("Mod_English.ILSTRINGS"),
            table(&[(5, &b"\x03\0\0\0Hi\0"[..])]),
        )
        .unwrap();

        let tables = StringTables::open(&dir, "Mod.esp", "English").unwrap();
        assert_eq!(tables.lookup(StringTableKind::Strings, 3), Some("Sword"));
        assert_eq!(tables.lookup(StringTableKind::IlStrings, 5), Some("Hi"));
        assert!(tables.dl_strings.is_empty());

        assert!(StringTables::open(&dir, "Other.esp", "English").is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn huge_count_is_eof() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
        assert!(matches!(
            StringTable::parse(&mut bytes.as_slice(), StringTableKind::Strings),
            Err(Error::UnexpectedEof)
        ));

        let mut bytes = table(&[]);
        bytes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            StringTable::parse(&mut bytes.as_slice(), StringTableKind::Strings),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn equality_ignores_resolution_cache() {
        let resolved = LocalizedString::new(StringTableKind::Strings, 0);
        let fresh = resolved.clone();
        assert_eq!(resolved.get(&StringTables::default()), Some(""));
        assert_eq!(resolved.cached(), Some(""));
        assert_eq!(fresh.cached(), None);
        assert_eq!(resolved, fresh);
        assert_ne!(resolved, LocalizedString::new(StringTableKind::DlStrings, 0));
    }

    #[test]
    fn zero_id_is_empty() {
        let handle = LocalizedString::new(StringTableKind::Strings, 0);
        assert_eq!(handle.get(&StringTables::default()), Some(""));
    }
}
