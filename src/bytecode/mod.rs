//! Layout facts for event flow binaries.
//!
//! An event file is a single blob per map: a pointer-heavy header, fixed
//! tables of talk handlers and trigger rectangles, one or more instruction
//! runs and the dialogue strings they reference. Everything position or
//! table shaped lives here; the opcode vocabulary is in [`opcodes`] and
//! the scalar plumbing in [`io`].

pub mod io;
pub mod opcodes;

/// Every instruction cell opens with this marker byte.
pub const INS_MARKER: u8 = 0xFF;

/// Instruction runs and dialogue strings start on boundaries of this many
/// bytes, padded with zeros.
pub const RUN_ALIGN: usize = 8;

/// Finished files are padded with zeros to a multiple of the disc sector
/// size.
pub const SECTOR_SIZE: usize = 0x800;

/// Listing body for files with no entry point and no handler tables.
pub const EMPTY_FILE_TEXT: &str = "EMPTY";

/// Keyword opening each section header line of a listing.
pub const SECTION_KEYWORD: &str = "section";

/// Keyword of the entry point line at the top of a listing.
pub const ADDR_KEYWORD: &str = "addr";

pub const BGM_SECTION: &str = ".bgm";
pub const TALK_SECTION: &str = ".talk";
pub const TALK2_SECTION: &str = ".talk2";
pub const POSITIONS_SECTION: &str = ".positions";
pub const INTERACTABLES_SECTION: &str = ".interactables";
pub const CODE_SECTION: &str = ".code";
pub const TEXT_SECTION: &str = ".text";

/// A header or table slot holding 0 or -1 points at nothing.
pub fn slot_is_vacant(addr: u32) -> bool {
    addr == 0 || addr == u32::MAX
}

/// Which retail build a file comes from.
///
/// The Japanese build has no relocated text table, so the header slot at
/// 0x34 does not exist there and every slot after it sits four bytes
/// lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Us,
    Jp,
}

impl Region {
    fn shift(self) -> u32 {
        match self {
            Region::Us => 0,
            Region::Jp => 4,
        }
    }

    /// Offset of the two background song id words.
    pub fn song_ids_addr(self) -> u32 {
        0x02
    }

    /// Header slot pointing at the relocated text table, when the build
    /// has one.
    pub fn text_table_slot(self) -> Option<u32> {
        match self {
            Region::Us => Some(0x34),
            Region::Jp => None,
        }
    }

    /// Header slot whose word is the address of the position trigger
    /// count. The word after that count address points at the entries.
    pub fn position_size_slot(self) -> u32 {
        0x38 - self.shift()
    }

    /// Header slot whose word is the address of the interactable trigger
    /// count.
    pub fn interactable_size_slot(self) -> u32 {
        0x48 - self.shift()
    }

    /// Header slot holding the address the script starts running from.
    pub fn entry_slot(self) -> u32 {
        0x64 - self.shift()
    }

    /// The fixed table of per character talk handlers.
    pub fn talk_table(self) -> TalkTable {
        TalkTable {
            base: 0x1F4 - self.shift(),
            slots: 64,
            stride: 0x24,
            first_off: 0x4,
            second_off: 0x14,
        }
    }

    /// The smaller second talk handler table further down the header.
    pub fn talk2_table(self) -> TalkTable {
        TalkTable {
            base: 0xAF4 - self.shift(),
            slots: 8,
            stride: 0x1C,
            first_off: 0x4,
            second_off: 0x10,
        }
    }
}

/// Geometry of a fixed table whose slots each carry two handler address
/// words at known offsets.
#[derive(Debug, Clone, Copy)]
pub struct TalkTable {
    pub base: u32,
    pub slots: u32,
    pub stride: u32,
    pub first_off: u32,
    pub second_off: u32,
}

impl TalkTable {
    /// Address of the first handler word of `slot`.
    pub fn first_addr(&self, slot: u32) -> u32 {
        self.base + slot * self.stride + self.first_off
    }

    /// Address of the second handler word of `slot`.
    pub fn second_addr(&self, slot: u32) -> u32 {
        self.base + slot * self.stride + self.second_off
    }
}
