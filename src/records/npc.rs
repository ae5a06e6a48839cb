//! NPC_ - non-player character (actor base) record.
//!
//! The same record type is used by every game in the family, but several
//! subrecords change layout between them. The declared payload size picks
//! the layout; where sizes collide (`ACBS` is 24 bytes in both Fallout 3 and
//! Skyrim) the file version decides.
//!
//! ## Variable-layout subrecords
//! ```text
//! ACBS  16 bytes  Oblivion            flags, base spell points, fatigue, ...
//!       24 bytes  Fallout 3 / FNV     flags, fatigue, barter gold, ..., karma
//!       24 bytes  Skyrim              flags, magicka/stamina offsets, ...
//!       20 bytes  Fallout 4           flags, XP offset, level, ...
//! SNAM   8 bytes  faction (form id), rank (i8), 3 unused bytes
//!        5 bytes  faction (form id), rank (i8)        (Fallout 4)
//! AIDT  12 bytes  Oblivion AI data; other sizes are not decoded
//! DATA  33 bytes  Oblivion skills, health and attributes; 0 bytes elsewhere
//! WNAM   4 bytes  worn armor (form id) for 0.94 / 1.7 files,
//!                 foot weight (f32) otherwise
//! ```
//!
//! ## Face generation
//! `FGGS` and `FGTS` are 50 `f32` coefficients, `FGGA` is 30.

use std::io::Read;

use crate::Result;
use crate::form_id::FormId;
use crate::header::{EsmVersion, FileContext};
use crate::reader::{RecordFlags, RecordHeader, SubRecordReader};
use crate::records::{LoadRecord, skip_ignored};
use crate::strings::DisplayString;
use crate::tag::{Tag, subrecord_tags};
use crate::utils::{bytesa, le_f32, le_i16, le_u16, le_u32, u8};

/// Symmetric face-geometry and face-texture coefficient count.
pub const SYMMETRIC_COEFFICIENTS: usize = 50;
/// Asymmetric face-geometry coefficient count.
pub const ASYMMETRIC_COEFFICIENTS: usize = 30;

/// One `CNTO` inventory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryItem {
    pub item: FormId,
    pub count: i32,
}

/// One `SNAM` faction membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorFaction {
    pub faction: FormId,
    pub rank: i8,
}

/// Oblivion `AIDT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiData {
    pub aggression: u8,
    pub confidence: u8,
    pub energy_level: u8,
    pub responsibility: u8,
    pub ai_flags: u32,
    pub train_skill: u8,
    pub train_level: u8,
    pub unknown: u16,
}

impl AiData {
    pub const SIZE: u32 = 12;

    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Self {
            aggression: u8(r)?,
            confidence: u8(r)?,
            energy_level: u8(r)?,
            responsibility: u8(r)?,
            ai_flags: le_u32(r)?,
            train_skill: u8(r)?,
            train_level: u8(r)?,
            unknown: le_u16(r)?,
        })
    }
}

/// Oblivion `ACBS` (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcbsTes4 {
    pub flags: u32,
    pub base_spell: u16,
    pub fatigue: u16,
    pub barter_gold: u16,
    pub level_or_offset: i16,
    pub calc_min_level: u16,
    pub calc_max_level: u16,
}

/// Fallout 3 / New Vegas `ACBS` (24 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AcbsFo3 {
    pub flags: u32,
    pub fatigue: u16,
    pub barter_gold: u16,
    pub level_or_mult: i16,
    pub calc_min_level: u16,
    pub calc_max_level: u16,
    pub speed_multiplier: u16,
    pub karma: f32,
    pub disposition_base: i16,
    pub template_flags: u16,
}

/// Skyrim `ACBS` (24 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcbsTes5 {
    pub flags: u32,
    pub magicka_offset: i16,
    pub stamina_offset: i16,
    pub level_or_mult: u16,
    pub calc_min_level: u16,
    pub calc_max_level: u16,
    pub speed_multiplier: u16,
    pub disposition_base: i16,
    pub template_flags: u16,
    pub health_offset: i16,
    pub bleedout_override: u16,
}

/// Fallout 4 `ACBS` (20 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcbsFo4 {
    pub flags: u32,
    pub xp_value_offset: i16,
    pub level_or_mult: u16,
    pub calc_min_level: u16,
    pub calc_max_level: u16,
    pub disposition_base: i16,
    pub template_flags: u16,
    pub bleedout_override: u16,
    pub unknown: u16,
}

/// Which `ACBS` layout a record carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseConfigVariant {
    Tes4,
    Fo3,
    Tes5,
    Fo4,
}

/// Decoded `ACBS` base configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorBaseConfig {
    Tes4(AcbsTes4),
    Fo3(AcbsFo3),
    Tes5(AcbsTes5),
    Fo4(AcbsFo4),
}

impl ActorBaseConfig {
    /// Payload sizes of every known layout.
    pub const SIZES: &'static [u32] = &[16, 20, 24];

    pub fn variant(&self) -> BaseConfigVariant {
        match self {
            Self::Tes4(_) => BaseConfigVariant::Tes4,
            Self::Fo3(_) => BaseConfigVariant::Fo3,
            Self::Tes5(_) => BaseConfigVariant::Tes5,
            Self::Fo4(_) => BaseConfigVariant::Fo4,
        }
    }

    /// Actor flags; the first field of every layout.
    pub fn flags(&self) -> u32 {
        match self {
            Self::Tes4(c) => c.flags,
            Self::Fo3(c) => c.flags,
            Self::Tes5(c) => c.flags,
            Self::Fo4(c) => c.flags,
        }
    }

    /// Decode a payload whose size is one of [`Self::SIZES`].
    fn parse(bytes: &[u8], ctx: &FileContext) -> Result<Self> {
        let r = &mut &bytes[..];
        Ok(match bytes.len() {
            16 => Self::Tes4(AcbsTes4 {
                flags: le_u32(r)?,
                base_spell: le_u16(r)?,
                fatigue: le_u16(r)?,
                barter_gold: le_u16(r)?,
                level_or_offset: le_i16(r)?,
                calc_min_level: le_u16(r)?,
                calc_max_level: le_u16(r)?,
            }),
            20 => Self::Fo4(AcbsFo4 {
                flags: le_u32(r)?,
                xp_value_offset: le_i16(r)?,
                level_or_mult: le_u16(r)?,
                calc_min_level: le_u16(r)?,
                calc_max_level: le_u16(r)?,
                disposition_base: le_i16(r)?,
                template_flags: le_u16(r)?,
                bleedout_override: le_u16(r)?,
                unknown: le_u16(r)?,
            }),
            _ if ctx.is_tes5() => Self::Tes5(AcbsTes5 {
                flags: le_u32(r)?,
                magicka_offset: le_i16(r)?,
                stamina_offset: le_i16(r)?,
                level_or_mult: le_u16(r)?,
                calc_min_level: le_u16(r)?,
                calc_max_level: le_u16(r)?,
                speed_multiplier: le_u16(r)?,
                disposition_base: le_i16(r)?,
                template_flags: le_u16(r)?,
                health_offset: le_i16(r)?,
                bleedout_override: le_u16(r)?,
            }),
            _ => Self::Fo3(AcbsFo3 {
                flags: le_u32(r)?,
                fatigue: le_u16(r)?,
                barter_gold: le_u16(r)?,
                level_or_mult: le_i16(r)?,
                calc_min_level: le_u16(r)?,
                calc_max_level: le_u16(r)?,
                speed_multiplier: le_u16(r)?,
                karma: le_f32(r)?,
                disposition_base: le_i16(r)?,
                template_flags: le_u16(r)?,
            }),
        })
    }
}

/// Oblivion `DATA`: skills, health and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpcData {
    /// Armorer through Speechcraft, in editor order.
    pub skills: [u8; 21],
    pub health: u32,
    /// Strength, Intelligence, Willpower, Agility, Speed, Endurance,
    /// Personality, Luck.
    pub attributes: [u8; 8],
}

impl NpcData {
    pub const SIZE: u32 = 33;

    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Self {
            skills: bytesa(r)?,
            health: le_u32(r)?,
            attributes: bytesa(r)?,
        })
    }
}

/// `HCLR` hair colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HairColour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub custom: u8,
}

/// A loaded `NPC_` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Npc {
    pub id: FormId,
    pub flags: RecordFlags,

    pub is_tes4: bool,
    pub is_fonv: bool,
    /// Set when a 20-byte `ACBS` was seen.
    pub is_fo4: bool,

    pub editor_id: String,
    pub model: String,
    pub full_name: DisplayString,

    pub race: Option<FormId>,
    pub class: Option<FormId>,
    pub hair: Option<FormId>,
    pub eyes: Option<FormId>,
    pub death_item: Option<FormId>,
    pub script: Option<FormId>,
    pub combat_style: Option<FormId>,
    pub sound_base: Option<FormId>,
    pub sound: Option<FormId>,
    pub sound_chance: u8,
    pub base_template: Option<FormId>,
    pub worn_armor: Option<FormId>,
    pub default_outfit: Option<FormId>,
    pub sleep_outfit: Option<FormId>,
    pub default_package_list: Option<FormId>,
    pub hair_colour_id: Option<FormId>,
    pub beard_colour_id: Option<FormId>,

    pub inventory: Vec<InventoryItem>,
    /// Item count declared by `COCT`. Informational; `inventory` is built
    /// from the `CNTO` entries actually present.
    pub inventory_count_hint: Option<u32>,
    pub spells: Vec<FormId>,
    pub ai_packages: Vec<FormId>,
    pub factions: Vec<ActorFaction>,
    pub head_parts: Vec<FormId>,

    pub ai_data: Option<AiData>,
    pub base_config: Option<ActorBaseConfig>,
    pub data: Option<NpcData>,

    pub foot_weight: f32,
    pub bound_radius: f32,
    pub hair_length: f32,
    pub hair_colour: HairColour,
    pub fg_race: u16,
    /// Animation files (`KFFZ`).
    pub kf: Vec<String>,

    pub sym_shape_mode_coefficients: Vec<f32>,
    pub asym_shape_mode_coefficients: Vec<f32>,
    pub sym_texture_mode_coefficients: Vec<f32>,
}

subrecord_tags! {
    enum NpcField {
        Edid = b"EDID",
        Modl = b"MODL",
        Full = b"FULL",
        Cnto = b"CNTO",
        Splo = b"SPLO",
        Pkid = b"PKID",
        Snam = b"SNAM",
        Rnam = b"RNAM",
        Cnam = b"CNAM",
        Hnam = b"HNAM",
        Enam = b"ENAM",
        Inam = b"INAM",
        Scri = b"SCRI",
        Aidt = b"AIDT",
        Acbs = b"ACBS",
        Data = b"DATA",
        Znam = b"ZNAM",
        Cscr = b"CSCR",
        Csdi = b"CSDI",
        Csdc = b"CSDC",
        Wnam = b"WNAM",
        Modb = b"MODB",
        Kffz = b"KFFZ",
        Lnam = b"LNAM",
        Hclr = b"HCLR",
        Tplt = b"TPLT",
        Fggs = b"FGGS",
        Fgga = b"FGGA",
        Fgts = b"FGTS",
        Fnam = b"FNAM",
        Pnam = b"PNAM",
        Hclf = b"HCLF",
        Bclf = b"BCLF",
        Coct = b"COCT",
        Doft = b"DOFT",
        Soft = b"SOFT",
        Dplt = b"DPLT",
    }
}

macro_rules! tags {
    ($($code:literal),* $(,)?) => {
        &[$(Tag(*$code)),*]
    };
}

impl LoadRecord for Npc {
    const TAG: Tag = Tag(*b"NPC_");

    const IGNORED: &'static [Tag] = tags![
        // destructible
        b"DAMC", b"DEST", b"DMDC", b"DMDL", b"DMDT", b"DMDS", b"DSTA", b"DSTD", b"DSTF",
        // height and weight multipliers
        b"NAM6", b"NAM7",
        b"ATKR", b"CRIF", b"CSDT", b"DNAM", b"ECOR", b"ANAM", b"ATKD", b"ATKE", b"FTST",
        b"KSIZ", b"KWDA", b"NAM5", b"NAM8", b"NAM9", b"NAMA", b"OBND", b"PRKR", b"PRKZ",
        b"QNAM", b"SPCT", b"TIAS", b"TINC", b"TINI", b"TINV", b"VMAD", b"VTCK", b"GNAM",
        b"SHRT", b"SPOR",
        // Fallout 3
        b"EAMT", b"NAM4", b"COED",
        // Fallout 4
        b"APPR", b"ATKS", b"ATKT", b"ATKW", b"ATTX", b"FTYP", b"LTPT", b"LTPC", b"MWGT",
        b"NTRM", b"PFRN", b"PRPS", b"PTRN", b"STCP", b"TETI", b"TEND", b"TPTA",
        // Fallout 4 object templates
        b"OBTE", b"OBTF", b"OBTS", b"STOP",
        // Fallout 4 package lists
        b"OCOR", b"GWOR", b"FCPL", b"RCLR",
        // Fallout 4 actor sounds
        b"CS2D", b"CS2E", b"CS2F", b"CS2H", b"CS2K",
        // Fallout 4 morphs
        b"MSDK", b"MSDV", b"MRSV", b"FMRI", b"FMRS", b"FMIN",
    ];

    fn load(header: &RecordHeader, reader: &mut SubRecordReader<'_>) -> Result<Self> {
        let ctx = reader.context();
        let mut npc = Npc {
            id: reader.resolve_header_id(header),
            flags: header.flags,
            is_tes4: ctx.is_tes4(),
            is_fonv: ctx.is_fonv(),
            ..Default::default()
        };

        while let Some(sub) = reader.next_sub_record_header()? {
            let Some(field) = NpcField::from_tag(sub.tag) else {
                skip_ignored::<Self>(reader, sub.tag)?;
                continue;
            };
            npc.apply(field, sub.data_size, reader)?;
        }

        if let Some(hint) = npc.inventory_count_hint
            && hint as usize != npc.inventory.len()
        {
            log::warn!(
                "NPC_ {}: COCT declares {hint} items but {} CNTO entries were read",
                npc.editor_id,
                npc.inventory.len()
            );
        }

        Ok(npc)
    }
}

impl Npc {
    fn apply(
        &mut self,
        field: NpcField,
        size: u32,
        reader: &mut SubRecordReader<'_>,
    ) -> Result<()> {
        let ctx = reader.context();
        match field {
            NpcField::Edid => self.editor_id = reader.read_zstring()?,
            NpcField::Modl => self.model = reader.read_zstring()?,
            NpcField::Full => self.full_name = reader.read_display_string()?,
            NpcField::Cnto => {
                let item = reader.read_form_id()?;
                let count = reader.read_scalar()?;
                self.inventory.push(InventoryItem { item, count });
            }
            NpcField::Splo => self.spells.push(reader.read_form_id()?),
            NpcField::Pkid => self.ai_packages.push(reader.read_form_id()?),
            NpcField::Snam => match size {
                5 | 8 => {
                    let faction = reader.read_form_id()?;
                    let rank = reader.read_scalar()?;
                    reader.skip_current_subrecord()?;
                    self.factions.push(ActorFaction { faction, rank });
                }
                _ => {
                    reader.read_struct_or_skip(&[5, 8])?;
                }
            },
            NpcField::Rnam => self.race = Some(reader.read_form_id()?),
            NpcField::Cnam => self.class = Some(reader.read_form_id()?),
            NpcField::Hnam => self.hair = Some(reader.read_form_id()?),
            NpcField::Enam => self.eyes = Some(reader.read_form_id()?),
            NpcField::Inam => self.death_item = Some(reader.read_form_id()?),
            NpcField::Scri => self.script = Some(reader.read_form_id()?),
            NpcField::Aidt => {
                if let Some(bytes) = reader.read_struct_or_skip(&[AiData::SIZE])? {
                    self.ai_data = Some(AiData::parse(&mut &bytes[..])?);
                }
            }
            NpcField::Acbs => {
                if let Some(bytes) = reader.read_struct_or_skip(ActorBaseConfig::SIZES)? {
                    let config = ActorBaseConfig::parse(bytes, ctx)?;
                    if config.variant() == BaseConfigVariant::Fo4 {
                        self.is_fo4 = true;
                    }
                    self.base_config = Some(config);
                }
            }
            NpcField::Data => {
                if let Some(bytes) = reader.read_struct_or_skip(&[0, NpcData::SIZE])?
                    && !bytes.is_empty()
                {
                    self.data = Some(NpcData::parse(&mut &bytes[..])?);
                }
            }
            NpcField::Znam => self.combat_style = Some(reader.read_form_id()?),
            NpcField::Cscr => self.sound_base = Some(reader.read_form_id()?),
            NpcField::Csdi => self.sound = Some(reader.read_form_id()?),
            NpcField::Csdc => self.sound_chance = reader.read_scalar()?,
            NpcField::Wnam => match ctx.version {
                EsmVersion::V094 | EsmVersion::V170 => {
                    self.worn_armor = Some(reader.read_form_id()?)
                }
                _ => self.foot_weight = reader.read_scalar()?,
            },
            NpcField::Modb => self.bound_radius = reader.read_scalar()?,
            NpcField::Kffz => self.kf.extend(reader.read_string_array()?),
            NpcField::Lnam => self.hair_length = reader.read_scalar()?,
            NpcField::Hclr => {
                self.hair_colour = HairColour {
                    red: reader.read_scalar()?,
                    green: reader.read_scalar()?,
                    blue: reader.read_scalar()?,
                    custom: reader.read_scalar()?,
                }
            }
            NpcField::Tplt => self.base_template = Some(reader.read_form_id()?),
            NpcField::Fggs => {
                self.sym_shape_mode_coefficients = reader.read_array(SYMMETRIC_COEFFICIENTS)?
            }
            NpcField::Fgga => {
                self.asym_shape_mode_coefficients = reader.read_array(ASYMMETRIC_COEFFICIENTS)?
            }
            NpcField::Fgts => {
                self.sym_texture_mode_coefficients = reader.read_array(SYMMETRIC_COEFFICIENTS)?
            }
            NpcField::Fnam => self.fg_race = reader.read_scalar()?,
            NpcField::Pnam => self.head_parts.push(reader.read_form_id()?),
            NpcField::Hclf => self.hair_colour_id = Some(reader.read_form_id()?),
            NpcField::Bclf => self.beard_colour_id = Some(reader.read_form_id()?),
            NpcField::Coct => self.inventory_count_hint = Some(reader.read_scalar()?),
            NpcField::Doft => self.default_outfit = Some(reader.read_form_id()?),
            NpcField::Soft => self.sleep_outfit = Some(reader.read_form_id()?),
            NpcField::Dplt => self.default_package_list = Some(reader.read_form_id()?),
        }
        Ok(())
    }

    /// Base configuration layout, if an `ACBS` was decoded.
    pub fn base_config_variant(&self) -> Option<BaseConfigVariant> {
        self.base_config.as_ref().map(ActorBaseConfig::variant)
    }

    pub fn is_deleted(&self) -> bool {
        self.flags.is_deleted()
    }
}
