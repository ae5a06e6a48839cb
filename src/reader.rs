//! Record, group and subrecord readers.
//!
//! ## Record header (20 or 24 bytes)
//! ```text
//! [0x00] Type          (4 bytes, e.g. "NPC_")
//! [0x04] DataSize      (u32 LE) - payload size, excluding this header
//! [0x08] Flags         (u32 LE)
//! [0x0C] FormId        (u32 LE, raw)
//! [0x10] VcInfo        (u32 LE)
//! [0x14] FormVersion   (u16 LE)   - absent in Oblivion (20-byte headers)
//! [0x16] Unknown       (u16 LE)   - absent in Oblivion
//! ```
//!
//! ## Group header (same size as a record header)
//! ```text
//! [0x00] "GRUP"
//! [0x04] GroupSize     (u32 LE) - including this header
//! [0x08] Label         (4 bytes; the record type for top-level groups)
//! [0x0C] GroupType     (i32 LE; 0 = top-level)
//! [0x10] Stamp         (u32 LE)
//! [0x14] Unknown       (u32 LE)   - absent in Oblivion
//! ```
//!
//! ## Subrecord header (6 bytes)
//! ```text
//! [0x00] Type          (4 bytes)
//! [0x04] DataSize      (u16 LE)
//! ```
//! A payload larger than 0xFFFF bytes is announced by a preceding `XXXX`
//! subrecord whose 4-byte payload is the real size; the following header's
//! own size field is then ignored.
//!
//! ## Compressed records
//! With flag `0x00040000` set the payload is a `u32 LE` decompressed size
//! followed by a zlib stream. See [`crate::compression`].

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::form_id::{FormId, FormIdResolver, RawFormId};
use crate::header::FileContext;
use crate::strings::{DisplayString, LocalizedString, StringTableKind};
use crate::tag::Tag;
use crate::utils::{bytesa, le_i32, le_u16, le_u32, null_padded_string};
use crate::{Error, Result};

/// Record header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFlags(pub u32);

impl RecordFlags {
    /// Header record only: the plugin is a master file.
    pub const MASTER: u32 = 0x0000_0001;
    pub const DELETED: u32 = 0x0000_0020;
    /// Header record only: display strings live in string tables.
    pub const LOCALIZED: u32 = 0x0000_0080;
    /// Header record only: light master.
    pub const LIGHT_MASTER: u32 = 0x0000_0200;
    pub const IGNORED: u32 = 0x0000_1000;
    pub const COMPRESSED: u32 = 0x0004_0000;

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn is_deleted(self) -> bool {
        self.contains(Self::DELETED)
    }

    pub fn is_ignored(self) -> bool {
        self.contains(Self::IGNORED)
    }

    pub fn is_compressed(self) -> bool {
        self.contains(Self::COMPRESSED)
    }
}

/// Header of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: Tag,
    /// Payload size on disk (compressed size for compressed records).
    pub data_size: u32,
    pub flags: RecordFlags,
    pub form_id: RawFormId,
    pub vc_info: u32,
    /// [`None`] for 20-byte (Oblivion) headers.
    pub form_version: Option<u16>,
    /// Absolute stream offset of the header.
    pub offset: u64,
}

/// Header of a `GRUP` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupHeader {
    /// Total group size including this header.
    pub size: u32,
    pub label: [u8; 4],
    pub group_type: i32,
    pub stamp: u32,
    /// Absolute stream offset of the header.
    pub offset: u64,
}

impl GroupHeader {
    /// Top-level groups hold every record of one type.
    pub fn is_top_level(&self) -> bool {
        self.group_type == 0
    }

    /// The label read as a record type.
    pub fn label_tag(&self) -> Tag {
        Tag(self.label)
    }

    /// Absolute stream offset one past the group's last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.size as u64
    }
}

/// Either kind of top-level header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Record(RecordHeader),
    Group(GroupHeader),
}

/// Sequential reader over the headers of one plugin file.
///
/// Record payloads are read into a buffer owned by the reader and reused
/// for every record of the file.
pub struct EsmReader<R> {
    inner: R,
    header_size: u64,
    /// Stream length, known after [`Self::read_file_header`].
    len: u64,
    scratch: Vec<u8>,
    #[cfg(feature = "compression")]
    inflated: Vec<u8>,
}

impl<R: Read + Seek> EsmReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            header_size: 24,
            len: u64::MAX,
            scratch: Vec::new(),
            #[cfg(feature = "compression")]
            inflated: Vec::new(),
        }
    }

    /// Record/group header size in bytes (20 or 24), known after
    /// [`Self::read_file_header`].
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Current absolute stream offset.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Read the leading `TES4` record header.
    ///
    /// Also determines the header size for the rest of the file: Oblivion
    /// headers stop after the version-control word, so the `HEDR` subrecord
    /// follows immediately. The stream length is recorded so that no record
    /// or group may claim bytes past the end of the file.
    pub fn read_file_header(&mut self) -> Result<RecordHeader> {
        let offset = self.position()?;
        self.len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let tag = Tag(bytesa(&mut self.inner)?);
        if tag != Tag::TES4 {
            return Err(Error::BadMagic);
        }
        let data_size = le_u32(&mut self.inner)?;
        let flags = RecordFlags(le_u32(&mut self.inner)?);
        let form_id = RawFormId(le_u32(&mut self.inner)?);
        let vc_info = le_u32(&mut self.inner)?;

        let peek: [u8; 4] = bytesa(&mut self.inner)?;
        let form_version = if &peek == b"HEDR" {
            self.header_size = 20;
            self.inner.seek(SeekFrom::Current(-4))?;
            None
        } else {
            self.header_size = 24;
            Some(u16::from_le_bytes([peek[0], peek[1]]))
        };
        self.check_fits(offset + self.header_size + data_size as u64)?;

        Ok(RecordHeader {
            tag,
            data_size,
            flags,
            form_id,
            vc_info,
            form_version,
            offset,
        })
    }

    /// A record or group ending at `end` must lie inside the stream.
    fn check_fits(&self, end: u64) -> Result<()> {
        if end > self.len {
            return Err(Error::UnexpectedEof);
        }
        Ok(())
    }

    /// Read the next record or group header.
    ///
    /// Returns [`None`] at a clean end of file; a header cut short is
    /// [`Error::UnexpectedEof`].
    pub fn next_header(&mut self) -> Result<Option<Header>> {
        let offset = self.position()?;
        let Some(tag) = self.read_tag_or_eof()? else {
            return Ok(None);
        };
        let size = le_u32(&mut self.inner)?;

        if tag == Tag::GRUP {
            let label = bytesa(&mut self.inner)?;
            let group_type = le_i32(&mut self.inner)?;
            let stamp = le_u32(&mut self.inner)?;
            if self.header_size == 24 {
                let _unknown = le_u32(&mut self.inner)?;
            }
            if (size as u64) < self.header_size {
                return Err(Error::Parse("group smaller than its header"));
            }
            let group = GroupHeader {
                size,
                label,
                group_type,
                stamp,
                offset,
            };
            self.check_fits(group.end())?;
            return Ok(Some(Header::Group(group)));
        }

        let flags = RecordFlags(le_u32(&mut self.inner)?);
        let form_id = RawFormId(le_u32(&mut self.inner)?);
        let vc_info = le_u32(&mut self.inner)?;
        let form_version = if self.header_size == 24 {
            let v = le_u16(&mut self.inner)?;
            let _unknown = le_u16(&mut self.inner)?;
            Some(v)
        } else {
            None
        };
        self.check_fits(offset + self.header_size + size as u64)?;

        Ok(Some(Header::Record(RecordHeader {
            tag,
            data_size: size,
            flags,
            form_id,
            vc_info,
            form_version,
            offset,
        })))
    }

    fn read_tag_or_eof(&mut self) -> Result<Option<Tag>> {
        let mut b = [0u8; 4];
        let mut filled = 0;
        while filled < b.len() {
            match self.inner.read(&mut b[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(Error::UnexpectedEof),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(Tag(b)))
    }

    /// Read a record's payload, inflating it if it is compressed.
    ///
    /// The returned slice borrows the reader's buffer and is valid until the
    /// next call.
    pub fn read_record_data(&mut self, header: &RecordHeader) -> Result<&[u8]> {
        let size = header.data_size as u64;
        self.scratch.clear();
        (&mut self.inner).take(size).read_to_end(&mut self.scratch)?;
        if self.scratch.len() as u64 != size {
            return Err(Error::UnexpectedEof);
        }

        if !header.flags.is_compressed() {
            return Ok(self.scratch.as_slice());
        }
        self.inflate()
    }

    #[cfg(feature = "compression")]
    fn inflate(&mut self) -> Result<&[u8]> {
        crate::compression::zlib::inflate_record(&self.scratch, &mut self.inflated)?;
        Ok(self.inflated.as_slice())
    }

    #[cfg(not(feature = "compression"))]
    fn inflate(&mut self) -> Result<&[u8]> {
        Err(Error::Parse(
            "compressed record requires the `compression` feature",
        ))
    }

    /// Skip a record's payload without reading it.
    pub fn skip_record(&mut self, header: &RecordHeader) -> Result<()> {
        let end = header.offset + self.header_size + header.data_size as u64;
        self.check_fits(end)?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Skip the rest of a group whose header has just been read.
    pub fn skip_group(&mut self, group: &GroupHeader) -> Result<()> {
        self.check_fits(group.end())?;
        self.inner.seek(SeekFrom::Start(group.end()))?;
        Ok(())
    }

    /// Consume the reader, returning the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Header of one subrecord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecordHeader {
    pub tag: Tag,
    /// Payload size; taken from a preceding `XXXX` when present.
    pub data_size: u32,
}

/// A fixed-size little-endian value that can be read straight out of a
/// subrecord payload.
pub trait Scalar: Sized + Copy {
    const SIZE: usize;
    fn from_le_slice(b: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_le_slice(b: &[u8]) -> Self {
                    let mut a = [0u8; std::mem::size_of::<$t>()];
                    a.copy_from_slice(b);
                    <$t>::from_le_bytes(a)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

#[derive(Debug, Clone, Copy)]
struct Current {
    header: SubRecordHeader,
    start: usize,
    end: usize,
}

/// Cursor over the subrecords of one record payload.
///
/// Every read is bounded by the current subrecord. When the next header is
/// requested the cursor must sit exactly at the end of the previous
/// subrecord; a loader that read less than was declared gets
/// [`Error::SizeMismatch`] instead of silently desynchronizing.
pub struct SubRecordReader<'a> {
    record: Tag,
    data: &'a [u8],
    pos: usize,
    current: Option<Current>,
    size_override: Option<u32>,
    ctx: &'a FileContext,
    resolver: &'a FormIdResolver,
}

impl<'a> SubRecordReader<'a> {
    pub fn new(
        record: Tag,
        data: &'a [u8],
        ctx: &'a FileContext,
        resolver: &'a FormIdResolver,
    ) -> Self {
        Self {
            record,
            data,
            pos: 0,
            current: None,
            size_override: None,
            ctx,
            resolver,
        }
    }

    /// Type of the record being read.
    pub fn record_tag(&self) -> Tag {
        self.record
    }

    pub fn context(&self) -> &'a FileContext {
        self.ctx
    }

    pub fn resolver(&self) -> &'a FormIdResolver {
        self.resolver
    }

    /// Offset within the record payload.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the whole payload has been consumed.
    pub fn is_complete(&self) -> bool {
        self.pos == self.data.len() && self.current.is_none_or(|c| c.end == self.pos)
    }

    /// Header of the subrecord being read, if any.
    pub fn sub_record_header(&self) -> Option<SubRecordHeader> {
        self.current.map(|c| c.header)
    }

    /// Advance to the next subrecord.
    ///
    /// Returns [`None`] once the record payload is exhausted.
    pub fn next_sub_record_header(&mut self) -> Result<Option<SubRecordHeader>> {
        if let Some(cur) = self.current.take()
            && self.pos != cur.end
        {
            return Err(Error::SizeMismatch {
                tag: cur.header.tag,
                declared: cur.header.data_size,
                consumed: (self.pos - cur.start) as u32,
            });
        }

        loop {
            if self.pos == self.data.len() {
                if self.size_override.is_some() {
                    return Err(Error::Parse("XXXX at end of record"));
                }
                return Ok(None);
            }

            let mut rest = &self.data[self.pos..];
            let tag = Tag(bytesa(&mut rest)?);
            let short_size = le_u16(&mut rest)?;
            self.pos += 6;

            if tag == Tag::XXXX {
                if short_size != 4 {
                    return Err(Error::Parse("XXXX payload must be 4 bytes"));
                }
                self.size_override = Some(le_u32(&mut rest)?);
                self.pos += 4;
                continue;
            }

            let data_size = self.size_override.take().unwrap_or(short_size as u32);
            let start = self.pos;
            let end = start
                .checked_add(data_size as usize)
                .filter(|&end| end <= self.data.len())
                .ok_or(Error::UnexpectedEof)?;

            let header = SubRecordHeader { tag, data_size };
            self.current = Some(Current { header, start, end });
            return Ok(Some(header));
        }
    }

    fn current(&self) -> Result<Current> {
        self.current.ok_or(Error::Parse("no subrecord header has been read"))
    }

    /// Bytes of the current subrecord not yet consumed.
    pub fn remaining(&self) -> usize {
        self.current.map_or(0, |c| c.end - self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let cur = self.current()?;
        if n > cur.end - self.pos {
            return Err(Error::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_rest(&mut self) -> Result<&'a [u8]> {
        let n = self.current()?.end - self.pos;
        self.take(n)
    }

    /// Read one scalar, advancing exactly `T::SIZE` bytes.
    pub fn read_scalar<T: Scalar>(&mut self) -> Result<T> {
        Ok(T::from_le_slice(self.take(T::SIZE)?))
    }

    /// Read `count` scalars.
    ///
    /// Nothing is returned unless all of them could be read.
    pub fn read_array<T: Scalar>(&mut self, count: usize) -> Result<Vec<T>> {
        let len = count.checked_mul(T::SIZE).ok_or(Error::InvalidRange)?;
        let bytes = self.take(len)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::from_le_slice).collect())
    }

    /// Take the whole payload of a fixed-layout subrecord.
    ///
    /// `sizes` lists the payload sizes of every known layout. Any other size
    /// returns [`Error::UnsupportedRecordVariant`] without moving the cursor;
    /// the caller decides whether to skip.
    pub fn read_struct(&mut self, sizes: &[u32]) -> Result<&'a [u8]> {
        let cur = self.current()?;
        if self.pos != cur.start || !sizes.contains(&cur.header.data_size) {
            return Err(Error::UnsupportedRecordVariant {
                tag: cur.header.tag,
                size: cur.header.data_size,
            });
        }
        self.take_rest()
    }

    /// [`Self::read_struct`], skipping the subrecord when no layout matches.
    pub fn read_struct_or_skip(&mut self, sizes: &[u32]) -> Result<Option<&'a [u8]>> {
        match self.read_struct(sizes) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(Error::UnsupportedRecordVariant { tag, size }) => {
                log::debug!(
                    "{}: skipping {tag} with unsupported size {size}",
                    self.record
                );
                self.skip_current_subrecord()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Move past the rest of the current subrecord without interpreting it.
    pub fn skip_current_subrecord(&mut self) -> Result<()> {
        self.pos = self.current()?.end;
        Ok(())
    }

    /// Read a raw form id and resolve it against the load order.
    pub fn read_form_id(&mut self) -> Result<FormId> {
        let raw = RawFormId(self.read_scalar::<u32>()?);
        Ok(self.resolver.resolve(raw))
    }

    /// Resolve the form id of the record's own header.
    pub fn resolve_header_id(&self, header: &RecordHeader) -> FormId {
        self.resolver.resolve(header.form_id)
    }

    /// Read the rest of the subrecord as a null-terminated string.
    pub fn read_zstring(&mut self) -> Result<String> {
        Ok(null_padded_string(self.take_rest()?))
    }

    /// Read the rest of the subrecord as a sequence of null-terminated
    /// strings.
    ///
    /// The payload must end with a terminator.
    pub fn read_string_array(&mut self) -> Result<Vec<String>> {
        let tag = self.current()?.header.tag;
        let bytes = self.take_rest()?;
        let Some((&0, body)) = bytes.split_last() else {
            return Err(Error::MalformedStringArray { tag });
        };
        Ok(body
            .split(|&b| b == 0)
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect())
    }

    /// Read a display string: inline for plain plugins, a string-table id for
    /// localized ones.
    pub fn read_display_string(&mut self) -> Result<DisplayString> {
        self.read_display_string_from(StringTableKind::Strings)
    }

    /// [`Self::read_display_string`] for fields stored in a specific table.
    pub fn read_display_string_from(&mut self, kind: StringTableKind) -> Result<DisplayString> {
        if self.ctx.uses_string_tables() {
            let id = self.read_scalar::<u32>()?;
            Ok(DisplayString::Localized(LocalizedString::new(kind, id)))
        } else {
            Ok(DisplayString::Inline(self.read_zstring()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::header::EsmVersion;

    fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut v = tag.to_vec();
        v.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        v.extend_from_slice(payload);
        v
    }

    fn fixtures() -> (FileContext, FormIdResolver) {
        (FileContext::default(), FormIdResolver::new(vec![0], 1))
    }

    #[test]
    fn reads_scalars_and_completes() {
        let data = [sub(b"MODB", &2.5f32.to_le_bytes()), sub(b"CSDC", &[7])].concat();
        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);

        let h = r.next_sub_record_header().unwrap().unwrap();
        assert_eq!(h.tag, Tag(*b"MODB"));
        assert_eq!(r.read_scalar::<f32>().unwrap(), 2.5);
        r.next_sub_record_header().unwrap().unwrap();
        assert_eq!(r.read_scalar::<u8>().unwrap(), 7);
        assert!(r.next_sub_record_header().unwrap().is_none());
        assert!(r.is_complete());
        assert_eq!(r.position(), data.len());
    }

    #[test]
    fn underread_is_a_size_mismatch() {
        let data = sub(b"MODB", &[0; 8]);
        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);
        r.next_sub_record_header().unwrap();
        r.read_scalar::<u32>().unwrap();
        assert!(matches!(
            r.next_sub_record_header(),
            Err(Error::SizeMismatch {
                declared: 8,
                consumed: 4,
                ..
            })
        ));
    }

    #[test]
    fn overread_stops_at_subrecord_end() {
        let data = [sub(b"CSDC", &[1]), sub(b"EDID", b"x\0")].concat();
        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);
        r.next_sub_record_header().unwrap();
        assert!(matches!(r.read_scalar::<u32>(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn xxxx_overrides_next_size() {
        let payload = vec![0xAB; 70_000];
        let mut data = sub(b"XXXX", &70_000u32.to_le_bytes());
        data.extend_from_slice(b"FGGS");
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&payload);

        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);
        let h = r.next_sub_record_header().unwrap().unwrap();
        assert_eq!(h.tag, Tag(*b"FGGS"));
        assert_eq!(h.data_size, 70_000);
        r.skip_current_subrecord().unwrap();
        assert!(r.next_sub_record_header().unwrap().is_none());
    }

    #[test]
    fn declared_size_past_record_end_is_eof() {
        let mut data = sub(b"EDID", b"abc\0");
        data.truncate(data.len() - 2);
        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);
        assert!(matches!(
            r.next_sub_record_header(),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn read_struct_rejects_unknown_sizes_without_moving() {
        let data = sub(b"ACBS", &[0; 7]);
        let (ctx, res) = fixtures();
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &ctx, &res);
        r.next_sub_record_header().unwrap();
        assert!(matches!(
            r.read_struct(&[16, 20, 24]),
            Err(Error::UnsupportedRecordVariant { size: 7, .. })
        ));
        assert_eq!(r.remaining(), 7);
        assert_eq!(r.read_struct_or_skip(&[16, 20, 24]).unwrap(), None);
        assert!(r.next_sub_record_header().unwrap().is_none());
    }

    #[test]
    fn string_array_needs_terminator() {
        let (ctx, res) = fixtures();

        let good = sub(b"KFFZ", b"Idle.kf\0Walk.kf\0");
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &good, &ctx, &res);
        r.next_sub_record_header().unwrap();
        assert_eq!(r.read_string_array().unwrap(), ["Idle.kf", "Walk.kf"]);

        let bad = sub(b"KFFZ", b"Idle.kf\0Walk.kf");
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &bad, &ctx, &res);
        r.next_sub_record_header().unwrap();
        assert!(matches!(
            r.read_string_array(),
            Err(Error::MalformedStringArray { tag }) if tag == Tag(*b"KFFZ")
        ));
    }

    #[test]
    fn display_string_follows_localization() {
        let res = FormIdResolver::new(vec![], 0);

        let plain = FileContext::default();
        let data = sub(b"FULL", b"Lydia\0");
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &plain, &res);
        r.next_sub_record_header().unwrap();
        assert_eq!(
            r.read_display_string().unwrap(),
            DisplayString::Inline("Lydia".into())
        );

        let localized = FileContext {
            version: EsmVersion::V170,
            form_version: Some(44),
            localized: true,
        };
        let data = sub(b"FULL", &0x1234u32.to_le_bytes());
        let mut r = SubRecordReader::new(Tag(*b"NPC_"), &data, &localized, &res);
        r.next_sub_record_header().unwrap();
        let DisplayString::Localized(handle) = r.read_display_string().unwrap() else {
            panic!("expected a localized string");
        };
        assert_eq!(handle.id, 0x1234);
        assert_eq!(handle.kind, StringTableKind::Strings);
    }

    #[test]
    fn detects_oblivion_header_size() {
        let mut file = b"TES4".to_vec();
        file.extend_from_slice(&18u32.to_le_bytes());
        file.extend_from_slice(&[0; 12]);
        file.extend(sub(b"HEDR", &[0; 12]));

        let mut esm = EsmReader::new(Cursor::new(file));
        let h = esm.read_file_header().unwrap();
        assert_eq!(h.form_version, None);
        assert_eq!(esm.header_size(), 20);
        assert_eq!(esm.position().unwrap(), 20);
    }

    #[test]
    fn oversized_record_is_eof_before_reading() {
        let mut file = b"TES4".to_vec();
        file.extend_from_slice(&18u32.to_le_bytes());
        file.extend_from_slice(&[0; 12]);
        file.extend(sub(b"HEDR", &[0; 12]));
        file.extend_from_slice(b"GLOB");
        file.extend_from_slice(&0xF000_0000u32.to_le_bytes());
        file.extend_from_slice(&[0; 12]);

        let mut esm = EsmReader::new(Cursor::new(file));
        let tes4 = esm.read_file_header().unwrap();
        esm.read_record_data(&tes4).unwrap();
        assert!(matches!(esm.next_header(), Err(Error::UnexpectedEof)));

        let huge = RecordHeader {
            data_size: 0xF000_0000,
            ..tes4
        };
        assert!(matches!(
            esm.read_record_data(&huge),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn clean_eof_has_no_header() {
        let mut esm = EsmReader::new(Cursor::new(Vec::new()));
        assert!(esm.next_header().unwrap().is_none());

        let mut esm = EsmReader::new(Cursor::new(b"NP".to_vec()));
        assert!(matches!(esm.next_header(), Err(Error::UnexpectedEof)));
    }
}
