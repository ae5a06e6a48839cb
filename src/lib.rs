//! **esmkit** - a versioned record loader for ESM4-family game data files
//! (Oblivion, Fallout 3, Fallout: New Vegas, Skyrim, Fallout 4).
//!
//! A plugin (`.esm` / `.esp` / `.esl`) is a `TES4` header record followed by
//! groups of records; each record is a list of tagged subrecords whose layout
//! depends on the game that wrote the file.
//!
//! # Modules
//! | Module | Contents |
//! |--------|----------|
//! | [`reader`]      | Record, group and subrecord readers |
//! | [`header`]      | `TES4` file header and per-file context |
//! | [`form_id`]     | Raw and resolved form ids |
//! | [`load_order`]  | Load order and `plugins.txt` parsing |
//! | [`strings`]     | Inline and localized display strings |
//! | [`records`]     | Record kinds and their loaders |
//! | [`loader`]      | Whole-file loading and merged record sets |
//! | [`compression`] | zlib record payloads |
//!
//! # Example
//! ```no_run
//! use esmkit::{LoadOrder, RecordSet, load_path};
//!
//! let order = LoadOrder::new(["Skyrim.esm", "MyMod.esp"])?;
//! let mut set = RecordSet::new();
//! for plugin in order.plugins() {
//!     set.insert_file(load_path(plugin, &order)?);
//! }
//! println!("{} records", set.len());
//! # Ok::<(), esmkit::Error>(())
//! ```

pub mod compression;
pub mod error;
pub mod form_id;
pub mod header;
pub mod load_order;
pub mod loader;
pub mod reader;
pub mod records;
pub mod strings;
pub mod tag;
mod utils;

pub use error::{Error, Result};
pub use form_id::{FormId, RawFormId};
pub use header::{EsmVersion, FileContext, FileHeader};
pub use load_order::LoadOrder;
pub use loader::{LoadedFile, RecordSet, load_all, load_file, load_path};
pub use records::{Record, RecordKind};
pub use strings::{DisplayString, StringTables};
pub use tag::Tag;
