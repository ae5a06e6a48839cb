//! Whole-file loading and the merged record set.
//!
//! ## File layout
//! ```text
//! TES4 record                       file header, see [`crate::header`]
//! GRUP "GLOB" (type 0)              one top-level group per record type
//!   GLOB record
//!   GLOB record
//! GRUP "NPC_" (type 0)
//!   NPC_ record
//!   GRUP ... (nested, type != 0)    walked the same way
//! GRUP "WEAP" (type 0)              no loader: skipped by its declared size
//! ```
//!
//! Loading one file is strictly sequential. Independent files share nothing
//! but the frozen [`LoadOrder`], so [`load_all`] may load them in parallel.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::form_id::{FormId, FormIdResolver};
use crate::header::{FileContext, FileHeader};
use crate::load_order::LoadOrder;
use crate::reader::{EsmReader, GroupHeader, Header, RecordHeader, SubRecordReader};
use crate::records::{Record, RecordKind};
use crate::{Error, Result};

/// Every record loaded from one plugin, in file order.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    /// Position of the plugin in the load order it was loaded against.
    pub position: u16,
    pub header: FileHeader,
    pub records: Vec<Record>,
}

impl LoadedFile {
    pub fn context(&self) -> FileContext {
        self.header.context()
    }
}

struct FileLoader<'a, R> {
    esm: EsmReader<R>,
    ctx: FileContext,
    resolver: &'a FormIdResolver,
    records: Vec<Record>,
}

/// Load one plugin.
///
/// `name` is the plugin's file name as it appears in `load_order`; the
/// header's masters must all be in the load order too.
pub fn load_file<R: Read + Seek>(
    source: R,
    name: &str,
    load_order: &LoadOrder,
) -> Result<LoadedFile> {
    let mut esm = EsmReader::new(source);
    let tes4 = esm.read_file_header()?;
    let header = FileHeader::load(&tes4, esm.read_record_data(&tes4)?)
        .map_err(|e| e.in_record(tes4.tag, tes4.form_id.0, tes4.offset))?;
    let resolver = load_order.resolver_for(name, &header.master_names())?;

    log::debug!(
        "{name}: version {:?}, form version {:?}, {} masters, {}-byte headers",
        header.version,
        header.form_version,
        header.masters.len(),
        esm.header_size()
    );

    let mut loader = FileLoader {
        esm,
        ctx: header.context(),
        resolver: &resolver,
        records: Vec::new(),
    };
    loader.run()?;

    Ok(LoadedFile {
        name: name.to_owned(),
        position: resolver.own_position(),
        header,
        records: loader.records,
    })
}

/// [`load_file`] from a path; the file name is the plugin name.
pub fn load_path(path: impl AsRef<Path>, load_order: &LoadOrder) -> Result<LoadedFile> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(Error::Parse("plugin path has no file name"))?;
    let file = BufReader::new(File::open(path)?);
    load_file(file, name, load_order)
}

/// Load several independent plugins.
///
/// Returns one result per source, in input order. A failed file does not
/// affect the others.
#[cfg(feature = "parallel")]
pub fn load_all<R>(load_order: &LoadOrder, sources: Vec<(String, R)>) -> Vec<Result<LoadedFile>>
where
    R: Read + Seek + Send,
{
    use rayon::prelude::*;

    sources
        .into_par_iter()
        .map(|(name, source)| load_file(source, &name, load_order))
        .collect()
}

/// Load several independent plugins.
///
/// Returns one result per source, in input order. A failed file does not
/// affect the others.
#[cfg(not(feature = "parallel"))]
pub fn load_all<R>(load_order: &LoadOrder, sources: Vec<(String, R)>) -> Vec<Result<LoadedFile>>
where
    R: Read + Seek + Send,
{
    sources
        .into_iter()
        .map(|(name, source)| load_file(source, &name, load_order))
        .collect()
}

impl<R: Read + Seek> FileLoader<'_, R> {
    fn run(&mut self) -> Result<()> {
        while let Some(header) = self.esm.next_header()? {
            match header {
                Header::Group(group) if RecordKind::from_tag(group.label_tag()).is_some() => {
                    self.walk_group(&group)?
                }
                Header::Group(group) => {
                    log::trace!("skipping group {} ({} bytes)", group.label_tag(), group.size);
                    self.esm.skip_group(&group)?;
                }
                Header::Record(record) => self.load_record(&record)?,
            }
        }
        Ok(())
    }

    /// Walk a group and every nested group, tracking open group ends on a heap stack.
    fn walk_group(&mut self, group: &GroupHeader) -> Result<()> {
        let mut ends = vec![group.end()];
        while let Some(&end) = ends.last() {
            let pos = self.esm.position()?;
            if pos == end {
                ends.pop();
                continue;
            }
            if pos > end {
                return Err(Error::Parse("group contents overrun the group size"));
            }
            match self.esm.next_header()?.ok_or(Error::UnexpectedEof)? {
                Header::Group(inner) => {
                    if inner.end() > end {
                        return Err(Error::Parse("nested group overruns its parent"));
                    }
                    ends.push(inner.end());
                }
                Header::Record(record) => self.load_record(&record)?,
            }
        }
        Ok(())
    }

    fn load_record(&mut self, header: &RecordHeader) -> Result<()> {
        let Some(kind) = RecordKind::from_tag(header.tag) else {
            log::trace!("skipping {} record {:?}", header.tag, header.form_id);
            return self.esm.skip_record(header);
        };
        if header.flags.is_ignored() {
            log::warn!("{} {:?} is flagged ignored; skipping", header.tag, header.form_id);
            return self.esm.skip_record(header);
        }

        let wrap = |e: Error| e.in_record(header.tag, header.form_id.0, header.offset);
        let data = self.esm.read_record_data(header).map_err(wrap)?;
        let mut reader = SubRecordReader::new(header.tag, data, &self.ctx, self.resolver);
        let record = kind.load(header, &mut reader).map_err(wrap)?;
        debug_assert!(reader.is_complete());

        self.records.push(record);
        Ok(())
    }
}

/// Records of several plugins merged by resolved form id.
///
/// A record defined again by a later plugin replaces the earlier definition.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: HashMap<FormId, Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every record of `file`, replacing existing definitions.
    pub fn insert_file(&mut self, file: LoadedFile) {
        for record in file.records {
            self.records.insert(record.form_id(), record);
        }
    }

    /// Merge the results of [`load_all`] in load-order position order.
    ///
    /// Failed files are logged and returned; they contribute nothing.
    pub fn merge(&mut self, results: Vec<Result<LoadedFile>>) -> Vec<Error> {
        let mut files = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::warn!("plugin failed to load: {e}");
                    errors.push(e);
                }
            }
        }
        files.sort_by_key(|f| f.position);
        for file in files {
            self.insert_file(file);
        }
        errors
    }

    pub fn get(&self, id: FormId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FormId, &Record)> {
        self.records.iter()
    }

    /// Records of one kind, in no particular order.
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records.values().filter(move |r| r.kind() == kind)
    }
}
