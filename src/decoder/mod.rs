//! Turns an event file back into an editable listing.
//!
//! The listing starts with the flow entry address, then one section per
//! header table (`.bgm`, `.talk`, `.talk2`, `.positions`,
//! `.interactables`), then the decoded `.code` runs and finally the
//! `.text` strings. Every address that something jumps to or that a
//! header slot points at becomes a `LABEL_n`, numbered in discovery
//! order, so the listing re-encodes without any absolute offsets in it.

mod ins;

use std::collections::BTreeMap;
use std::io::{self, Cursor};

use log::debug;
use thiserror::Error;

use crate::bytecode::io::ReadExt;
use crate::bytecode::{
    slot_is_vacant, Region, TalkTable, ADDR_KEYWORD, BGM_SECTION, CODE_SECTION, EMPTY_FILE_TEXT,
    INTERACTABLES_SECTION, POSITIONS_SECTION, SECTION_KEYWORD, TALK2_SECTION, TALK_SECTION,
    TEXT_SECTION,
};
use crate::chartable::CharTable;
use crate::refs::LabelMap;
use crate::text::{Render, TextList};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("{name} (0x{opcode:02x}) carries the non-zero check value 0x{check:04x}")]
    BadCheck {
        name: &'static str,
        opcode: u8,
        check: u16,
    },

    #[error("no known meaning for {what} value {value}")]
    UnknownOrdinal { what: &'static str, value: u32 },
}

/// A decoded event file: the listing itself plus how often each opcode
/// turned up, which the census tool aggregates over whole discs.
#[derive(Debug)]
pub struct Decoded {
    pub listing: String,
    pub opcode_counts: BTreeMap<u8, usize>,
}

pub fn decode(data: &[u8], region: Region, table: &CharTable) -> Result<Decoded, DecodeError> {
    Decoder::new(data, region, table).run()
}

/// Renders just the text block of an event file, with control codes
/// interpreted for reading instead of for re-encoding.
pub fn dump_text(data: &[u8], region: Region, table: &CharTable) -> Result<String, DecodeError> {
    let mut cur = Cursor::new(data);
    let texts = read_text_list(&mut cur, region, table, Render::Display)?;

    let mut out = format!("Number of dialogs: {}\n\n", texts.len());
    for (i, entry) in texts.entries().iter().enumerate() {
        out.push_str(&format!("{}(0x{:08x}):\n{}\n\n", i, entry.address, entry.content));
    }
    Ok(out)
}

fn read_text_list(
    cur: &mut Cursor<&[u8]>,
    region: Region,
    table: &CharTable,
    mode: Render,
) -> Result<TextList, DecodeError> {
    let slot = match region.text_table_slot() {
        Some(slot) => slot,
        None => return Ok(TextList::default()),
    };
    cur.set_position(slot.into());
    let table_addr = cur.read_u32_le()?;
    if slot_is_vacant(table_addr) {
        return Ok(TextList::default());
    }
    Ok(TextList::read(cur, table_addr, table, mode)?)
}

struct Decoder<'a> {
    cur: Cursor<&'a [u8]>,
    region: Region,
    table: &'a CharTable,
    labels: LabelMap,
    texts: TextList,
    counts: BTreeMap<u8, usize>,
    /// Set once the current run has walked off the end of the code,
    /// either into text or through a final `ret`.
    last: bool,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], region: Region, table: &'a CharTable) -> Decoder<'a> {
        Decoder {
            cur: Cursor::new(data),
            region,
            table,
            labels: LabelMap::default(),
            texts: TextList::default(),
            counts: BTreeMap::new(),
            last: false,
        }
    }

    fn run(mut self) -> Result<Decoded, DecodeError> {
        // Everything before the code section is buffered so the entry
        // address can still go first in the listing.
        let mut pre = String::new();

        pre.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, BGM_SECTION));
        self.cur.set_position(self.region.song_ids_addr().into());
        let first_song = self.cur.read_u16_le()?;
        let second_song = self.cur.read_u16_le()?;
        pre.push_str(&format!("\t0x{:02x}\n\t0x{:02x}\n\n", first_song, second_song));

        self.texts = read_text_list(&mut self.cur, self.region, self.table, Render::RoundTrip)?;

        pre.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, TALK_SECTION));
        self.talk_section(&mut pre, self.region.talk_table())?;

        pre.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, TALK2_SECTION));
        self.talk_section(&mut pre, self.region.talk2_table())?;

        pre.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, POSITIONS_SECTION));
        self.trigger_section(&mut pre, self.region.position_size_slot())?;

        pre.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, INTERACTABLES_SECTION));
        self.trigger_section(&mut pre, self.region.interactable_size_slot())?;

        self.cur.set_position(self.region.entry_slot().into());
        let mut entry = self.cur.read_u32_le()?;
        if entry == u32::MAX {
            // No recorded entry point. Start at the earliest label, or
            // give up on files whose header points at nothing at all.
            entry = match self.labels.min_address() {
                Some(addr) => addr,
                None => {
                    return Ok(Decoded {
                        listing: EMPTY_FILE_TEXT.to_string(),
                        opcode_counts: self.counts,
                    })
                }
            };
        }

        let mut out = format!("{}\t0x{:08x}\n\n", ADDR_KEYWORD, entry);
        out.push_str(&pre);
        out.push_str(&format!("{}\t{}\n", SECTION_KEYWORD, CODE_SECTION));

        debug!("decoding the entry run at {entry:#x}");
        self.cur.set_position(entry.into());
        self.code_run(&mut out, false)?;

        // Jump targets past the text block never get reached by the
        // linear walk above, so decode a run from each one still
        // missing until none are left.
        while let Some((addr, id)) = self.labels.first_unlisted() {
            debug!("decoding the unlisted run for {id} at {addr:#x}");
            self.cur.set_position(addr.into());
            self.last = false;
            self.code_run(&mut out, true)?;
        }

        if !self.texts.is_empty() {
            out.push_str(&format!(
                "\n{}\t{}\t0x{:x}\n",
                SECTION_KEYWORD,
                TEXT_SECTION,
                self.texts.len()
            ));
            for (i, entry) in self.texts.entries().iter().enumerate() {
                out.push_str(&format!("\t{:03}:{}\n", i, entry.content));
            }
        }

        Ok(Decoded {
            listing: out,
            opcode_counts: self.counts,
        })
    }

    /// Decodes instructions from the current position until the run
    /// ends, printing a label line whenever one is defined here.
    fn code_run(&mut self, out: &mut String, past_text: bool) -> Result<(), DecodeError> {
        while !self.last {
            let at = self.cur.position() as u32;
            if let Some(id) = self.labels.lookup(at) {
                out.push_str(&format!("\n{}:\n", id));
                self.labels.mark_listed(at);
            }
            let line = self.instruction_line(past_text)?;
            out.push_str(&line);
        }
        Ok(())
    }

    /// One `\tNN\t\tLABEL_a,LABEL_b` line per occupied slot. A `_`
    /// stands in for the vacant half of a slot.
    fn talk_section(&mut self, out: &mut String, table: TalkTable) -> Result<(), DecodeError> {
        let backup = self.cur.position();
        for slot in 0..table.slots {
            self.cur.set_position(table.first_addr(slot).into());
            let first = self.cur.read_u32_le()?;
            self.cur.set_position(table.second_addr(slot).into());
            let second = self.cur.read_u32_le()?;

            if slot_is_vacant(first) && slot_is_vacant(second) {
                continue;
            }
            let first = self.half_slot(first);
            let second = self.half_slot(second);
            out.push_str(&format!("\t{:02}\t\t{},{}\n", slot, first, second));
        }
        out.push('\n');
        self.cur.set_position(backup);
        Ok(())
    }

    fn half_slot(&mut self, addr: u32) -> String {
        if slot_is_vacant(addr) {
            "_".to_string()
        } else {
            self.labels.id_for(addr).to_string()
        }
    }

    /// Walks a position or interactable table: the header slot points
    /// at the entry count, the slot after it at the entries themselves.
    fn trigger_section(&mut self, out: &mut String, size_slot: u32) -> Result<(), DecodeError> {
        let backup = self.cur.position();

        self.cur.set_position(size_slot.into());
        let size_ptr = self.cur.read_u32_le()?;
        self.cur.set_position(size_ptr.into());
        let size = self.cur.read_u32_le()? as i32;

        if size > 0 {
            self.cur.set_position((size_slot + 4).into());
            let entries_ptr = self.cur.read_u32_le()?;
            self.cur.set_position(entries_ptr.into());

            for _ in 0..size {
                let x = self.cur.read_u8()? as i8;
                let y = self.cur.read_u8()? as i8;
                let _pad = self.cur.read_u16_le()?;
                let addr = self.cur.read_u32_le()?;
                let label = self.labels.id_for(addr);
                out.push_str(&format!("\t{:03}\t{:03}\t{}\n", x, y, label));
            }
        }

        out.push('\n');
        self.cur.set_position(backup);
        Ok(())
    }
}
