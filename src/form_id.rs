//! Form identifiers and their resolution against the load order.
//!
//! On disk a form id is a 32-bit value `0xMMOOOOOO`: the top byte `MM` indexes
//! the *writing plugin's own* master list (with any index past the end of
//! that list meaning "this plugin"), and the low 24 bits `OOOOOO` identify the
//! object inside that plugin. The same object therefore has different raw ids
//! in different plugins. Resolving replaces `MM` with the position of the
//! owning plugin in the active [`crate::load_order::LoadOrder`].
//!
//! Loaders only ever see raw ids through
//! [`crate::reader::SubRecordReader::read_form_id`], which resolves them
//! immediately, so a [`RawFormId`] never reaches a loaded record.

use std::fmt;

/// A file-relative form id exactly as stored on disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawFormId(pub u32);

impl RawFormId {
    /// Index into the writing plugin's master list.
    pub fn file_index(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Object index within the owning plugin.
    pub fn object_index(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl fmt::Debug for RawFormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawFormId({:08X})", self.0)
    }
}

/// A load-order-global form id.
///
/// `file` is the owning plugin's position in the load order, `index` the
/// 24-bit object index inside it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FormId {
    pub file: u16,
    pub index: u32,
}

impl FormId {
    /// The null reference (raw id 0).
    pub const NULL: FormId = FormId { file: 0, index: 0 };

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// Pack into a single key, file position in the high bits.
    pub fn to_u64(self) -> u64 {
        (self.file as u64) << 32 | self.index as u64
    }
}

impl fmt::Debug for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormId({}:{:06X})", self.file, self.index)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:06X}", self.file, self.index)
    }
}

/// Anything that can be turned into a resolved [`FormId`].
///
/// Implemented for [`FormId`] itself as the identity, which makes
/// [`FormIdResolver::resolve`] idempotent.
pub trait IntoFormId {
    fn into_form_id(self, resolver: &FormIdResolver) -> FormId;
}

impl IntoFormId for RawFormId {
    fn into_form_id(self, resolver: &FormIdResolver) -> FormId {
        if self.0 == 0 {
            return FormId::NULL;
        }
        let file = resolver
            .masters
            .get(self.file_index() as usize)
            .copied()
            .unwrap_or(resolver.own);
        FormId {
            file,
            index: self.object_index(),
        }
    }
}

impl IntoFormId for FormId {
    fn into_form_id(self, _: &FormIdResolver) -> FormId {
        self
    }
}

/// Per-plugin mapping from raw to resolved form ids.
///
/// Built by [`crate::load_order::LoadOrder::resolver_for`] once the load
/// order is final. It holds no interior mutability and can be shared freely
/// between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormIdResolver {
    /// Load-order position of each entry in the plugin's master list.
    masters: Vec<u16>,
    /// Load-order position of the plugin itself.
    own: u16,
}

impl FormIdResolver {
    pub(crate) fn new(masters: Vec<u16>, own: u16) -> Self {
        Self { masters, own }
    }

    /// Resolve a raw (or already resolved) form id.
    pub fn resolve<F: IntoFormId>(&self, id: F) -> FormId {
        id.into_form_id(self)
    }

    /// Load-order position of the plugin this resolver belongs to.
    pub fn own_position(&self) -> u16 {
        self.own
    }
}
