//! Assembles a parsed listing over the original binary.
//!
//! The bytes before the entry address are copied from the original file
//! and patched where the listing touches them: song IDs, talk slot
//! addresses, trigger coordinates and handlers. Code is appended from
//! the entry address, strings after the code, and on the US layout the
//! string address table goes last with its location backfilled into the
//! header. Addresses for labels and strings flow through the reference
//! table, so forward references cost nothing to write.

use log::{debug, warn};

use crate::bytecode::io::{patch_u16_le, patch_u32_le, word_at_le, WriteExt};
use crate::bytecode::opcodes::{self, *};
use crate::bytecode::{Region, TalkTable, INS_MARKER, RUN_ALIGN, SECTOR_SIZE};
use crate::chartable::CharTable;
use crate::refs::RefTable;
use crate::tables;
use crate::text::encode_string;

use super::ast::{Arg, Stmt, TalkRow, TriggerRow};
use super::error::EmitError;
use super::ParseContext;

pub fn assemble(
    ctx: ParseContext,
    original: &[u8],
    region: Region,
    table: &CharTable,
) -> Result<Vec<u8>, EmitError> {
    let entry = entry_address(&ctx, original, region)?;
    let mut out = original[..entry as usize].to_vec();
    let mut refs = RefTable::default();

    patch_songs(&mut out, region, &ctx.songs)?;
    patch_talks(&mut out, &mut refs, region.talk_table(), &ctx.talks)?;
    patch_talks(&mut out, &mut refs, region.talk2_table(), &ctx.talks2)?;
    patch_triggers(
        &mut out,
        &mut refs,
        region.position_size_slot(),
        &ctx.positions,
        "positions",
    )?;
    patch_triggers(
        &mut out,
        &mut refs,
        region.interactable_size_slot(),
        &ctx.interactables,
        "interactables",
    )?;

    debug!("assembling {} code lines from {entry:#x}", ctx.code.len());
    for stmt in &ctx.code {
        match stmt {
            Stmt::Label(name) => {
                out.pad_to(RUN_ALIGN);
                refs.define_label(&mut out, name);
            }
            Stmt::Ins { name, args } => encode_ins(&mut out, &mut refs, name, args)?,
            Stmt::Opaque(words) => {
                for word in words {
                    out.push_u32_be(*word);
                }
            }
        }
    }

    encode_texts(&mut out, &mut refs, region, table, &ctx)?;

    let undefined = refs.undefined_labels();
    if !undefined.is_empty() {
        return Err(EmitError::UndefinedLabels(undefined));
    }
    let undefined = refs.undefined_texts();
    if !undefined.is_empty() {
        return Err(EmitError::UndefinedTexts(undefined));
    }

    out.pad_to(SECTOR_SIZE);
    Ok(out)
}

/// The address code gets appended from. The original header decides;
/// the `addr` line of the listing only counts when the header slot
/// holds -1.
fn entry_address(ctx: &ParseContext, original: &[u8], region: Region) -> Result<u32, EmitError> {
    let header = word_at_le(original, region.entry_slot() as usize)
        .ok_or(EmitError::ShortOriginal)?;
    let entry = if header == u32::MAX {
        ctx.entry.ok_or(EmitError::NoEntry)?
    } else {
        header
    };
    if entry as usize > original.len() {
        return Err(EmitError::EntryBeyondFile(entry));
    }
    Ok(entry)
}

fn patch_songs(out: &mut Vec<u8>, region: Region, songs: &[u16]) -> Result<(), EmitError> {
    for (i, id) in songs.iter().enumerate() {
        let at = region.song_ids_addr() as usize + 2 * i;
        if at + 2 > out.len() {
            return Err(EmitError::PatchOutOfRange(at));
        }
        patch_u16_le(out, at, *id);
    }
    Ok(())
}

/// Points the listed halves of each talk slot at their labels. A `_`
/// half never made it into the row, so the copied address stays.
fn patch_talks(
    out: &mut Vec<u8>,
    refs: &mut RefTable,
    table: TalkTable,
    rows: &[TalkRow],
) -> Result<(), EmitError> {
    for row in rows {
        if !(0..table.slots as i64).contains(&row.slot) {
            return Err(EmitError::TalkSlot(row.slot));
        }
        let slot = row.slot as u32;
        if let Some(label) = &row.first {
            refs.label_ref_at(out, label, table.first_addr(slot))?;
        }
        if let Some(label) = &row.second {
            refs.label_ref_at(out, label, table.second_addr(slot))?;
        }
    }
    Ok(())
}

/// Rewrites the coordinates and handler address of every trigger entry,
/// walking the copied header's own pointers. The row count is fixed by
/// the original file; the unknown half word of each entry keeps its
/// copied bytes.
fn patch_triggers(
    out: &mut Vec<u8>,
    refs: &mut RefTable,
    size_slot: u32,
    rows: &[TriggerRow],
    section: &'static str,
) -> Result<(), EmitError> {
    let size_slot = size_slot as usize;
    let size_ptr =
        word_at_le(out, size_slot).ok_or(EmitError::PatchOutOfRange(size_slot))? as usize;
    let size = word_at_le(out, size_ptr).ok_or(EmitError::PatchOutOfRange(size_ptr))? as i32;

    let expected = size.max(0) as usize;
    if rows.len() != expected {
        return Err(EmitError::TriggerCount {
            section,
            listed: rows.len(),
            expected,
        });
    }
    if expected == 0 {
        return Ok(());
    }

    let entries =
        word_at_le(out, size_slot + 4).ok_or(EmitError::PatchOutOfRange(size_slot + 4))? as usize;
    for (i, row) in rows.iter().enumerate() {
        let at = entries + i * 8;
        if at + 8 > out.len() {
            return Err(EmitError::PatchOutOfRange(at));
        }
        if !fits_byte(row.x) || !fits_byte(row.y) {
            return Err(EmitError::TriggerRange { x: row.x, y: row.y });
        }
        out[at] = row.x as u8;
        out[at + 1] = row.y as u8;
        refs.label_ref_at(out, &row.label, (at + 4) as u32)?;
    }
    Ok(())
}

fn fits_byte(v: i64) -> bool {
    (i8::MIN as i64..=u8::MAX as i64).contains(&v)
}

/// Appends the strings, each 8-aligned, then on the US layout the
/// address table and its header backfill. String ids count up in listed
/// order no matter what the rows claim.
fn encode_texts(
    out: &mut Vec<u8>,
    refs: &mut RefTable,
    region: Region,
    table: &CharTable,
    ctx: &ParseContext,
) -> Result<(), EmitError> {
    if let Some(declared) = ctx.declared_texts {
        if declared as usize != ctx.texts.len() {
            warn!(
                "text section declares {declared:#x} strings but lists {}",
                ctx.texts.len()
            );
        }
    }

    let mut pointers = Vec::with_capacity(ctx.texts.len());
    for (i, row) in ctx.texts.iter().enumerate() {
        if row.index != i as i64 {
            warn!("text {} is listed out of order as {}", i, row.index);
        }
        out.pad_to(RUN_ALIGN);
        refs.define_text(out, i);
        pointers.push(out.len() as u32);
        encode_string(out, &row.content, table)?;
    }

    let slot = match region.text_table_slot() {
        Some(slot) => slot as usize,
        None => return Ok(()),
    };
    let table_addr = out.len() as u32;
    out.push_u32_le(pointers.len() as u32);
    for pointer in pointers {
        out.push_u32_le(pointer);
    }
    if slot + 4 > out.len() {
        return Err(EmitError::PatchOutOfRange(slot));
    }
    patch_u32_le(out, slot, table_addr);
    Ok(())
}

/// Encodes one instruction line: the marker and opcode first, then
/// whatever operand layout the opcode wants. Half word operands are
/// little endian; the check half of the stricter opcodes is written
/// big endian, the way the decoder reads it back.
fn encode_ins(
    out: &mut Vec<u8>,
    refs: &mut RefTable,
    name: &str,
    args: &[Arg],
) -> Result<(), EmitError> {
    let op = opcodes::opcode_for(name)
        .ok_or_else(|| EmitError::UnknownMnemonic(name.to_string()))?;
    let mut ops = Operands::new(name, args);

    out.push_u8(INS_MARKER);
    out.push_u8(op);

    match op {
        OPCODE_RET => {
            out.push_u16_le(0);
            out.pad_to(RUN_ALIGN);
        }

        OPCODE_JUMP => {
            out.push_u16_be(0);
            refs.label_ref_here(out, ops.label()?);
        }

        OPCODE_JUMP_IF => {
            out.push_u16_le(ops.short()?);
            refs.label_ref_here(out, ops.label()?);
        }

        OPCODE_BATTLE | OPCODE_OPEN_SHOP_MENU | OPCODE_WAIT | OPCODE_CLR_CHAR
        | OPCODE_SCREEN_FX | OPCODE_PLAY_SONG | OPCODE_PLAY_SFX | OPCODE_FOLLOW_CHAR
        | OPCODE_CLR_EMOTE => {
            out.push_u16_le(ops.short()?);
        }

        OPCODE_LD_WORLD_MAP | OPCODE_LD_FILE | OPCODE_TP_CHAR => {
            out.push_u16_le(ops.short()?);
            out.push_u32_le(ops.word()?);
        }

        OPCODE_LD_3D_MAP | OPCODE_PLAN_CHAR_MOV => {
            for _ in 0..6 {
                out.push_u8(ops.byte()?);
            }
        }

        OPCODE_GIVE_ITEM => {
            out.push_u16_le(ops.short()?);
            out.push_u32_le(ops.word()?);
        }

        OPCODE_PLAY_MV => {
            out.push_u8(ops.movie()?);
            out.push_u8(ops.byte()?);
        }

        OPCODE_MONEY_CHECK => {
            out.push_u16_be(0);
            out.push_u32_le(ops.word()?);
            refs.label_ref_here(out, ops.label()?);
        }

        OPCODE_MONEY_TRANSFER => {
            let direction = ops.ordinal(tables::MONEY_DIRECTION, "money direction")?;
            out.push_u16_le(direction as u16);
            out.push_u32_le(ops.word()?);
        }

        // open_save_menu's half word is padding rather than a check,
        // but it encodes the same.
        OPCODE_OPEN_SAVE_MENU | OPCODE_OPEN_DIALOG | OPCODE_CLOSE_DIALOG
        | OPCODE_CLOSE_PORTRAIT | OPCODE_DO_PLANNED_MOVES => {
            out.push_u16_be(0);
        }

        OPCODE_PLAYER_OPTION => {
            out.push_u16_le(ops.short()?);
            refs.label_ref_here(out, ops.label()?);
        }

        OPCODE_LD_TEXT => {
            out.push_u16_be(0);
            refs.text_ref_here(out, ops.text_index()?);
        }

        OPCODE_POSE => {
            out.push_u8(ops.byte()?);
            out.push_u8(ops.pose()?);
            out.push_u8(ops.byte()?);
            out.push_u8(ops.byte()?);
            out.push_u8(ops.ordinal(tables::EVENT_DIRS, "event direction")?);
            out.push_u8(ops.byte()?);
            out.push_u32_le(ops.word()?);
        }

        OPCODE_FX => {
            out.push_u8(ops.byte()?);
            out.push_u8(ops.byte()?);
            out.push_u32_le(ops.word()?);
            out.push_u32_le(ops.word()?);
        }

        OPCODE_LD_PORTRAIT => {
            out.push_u8(ops.ordinal(tables::PORTRAIT_CHARS, "portrait character")?);
            out.push_u8(ops.ordinal(tables::PORTRAIT_ORIENTATION, "portrait orientation")?);
        }

        OPCODE_EMOTE => {
            out.push_u8(ops.byte()?);
            out.push_u8(ops.ordinal(tables::EMOTES, "emote")?);
        }

        OPCODE_FADE_CHAR => {
            out.push_u8(ops.byte()?);
            out.push_u8(ops.byte()?);
        }

        _ if opcodes::is_labelled_unknown(op) => {
            out.push_u16_le(ops.short()?);
            refs.label_ref_here(out, ops.label()?);
        }

        _ => return Err(EmitError::UnknownMnemonic(name.to_string())),
    }

    ops.finish()
}

/// Pulls typed values off an instruction's operand list in order.
struct Operands<'a> {
    name: &'a str,
    args: &'a [Arg],
    next: usize,
}

impl<'a> Operands<'a> {
    fn new(name: &'a str, args: &'a [Arg]) -> Operands<'a> {
        Operands { name, args, next: 0 }
    }

    fn bad(&self, expected: &'static str) -> EmitError {
        EmitError::BadOperands {
            name: self.name.to_string(),
            expected,
        }
    }

    fn next_arg(&mut self, expected: &'static str) -> Result<&'a Arg, EmitError> {
        let arg = self.args.get(self.next);
        self.next += 1;
        arg.ok_or_else(|| self.bad(expected))
    }

    /// A numeric operand, written in hex or in signed decimal.
    fn value(&mut self, expected: &'static str) -> Result<i64, EmitError> {
        match self.next_arg(expected)? {
            Arg::Hex(h) => Ok(*h as i64),
            Arg::Int(i) => Ok(*i),
            _ => Err(self.bad(expected)),
        }
    }

    fn byte(&mut self) -> Result<u8, EmitError> {
        const EXPECTED: &str = "a byte value";
        match self.value(EXPECTED)? {
            v if (i8::MIN as i64..=u8::MAX as i64).contains(&v) => Ok(v as u8),
            _ => Err(self.bad(EXPECTED)),
        }
    }

    fn short(&mut self) -> Result<u16, EmitError> {
        const EXPECTED: &str = "a half word value";
        match self.value(EXPECTED)? {
            v if (i16::MIN as i64..=u16::MAX as i64).contains(&v) => Ok(v as u16),
            _ => Err(self.bad(EXPECTED)),
        }
    }

    fn word(&mut self) -> Result<u32, EmitError> {
        const EXPECTED: &str = "a word value";
        match self.value(EXPECTED)? {
            v if (i32::MIN as i64..=u32::MAX as i64).contains(&v) => Ok(v as u32),
            _ => Err(self.bad(EXPECTED)),
        }
    }

    fn label(&mut self) -> Result<&'a str, EmitError> {
        match self.next_arg("a label")? {
            Arg::Name(n) => Ok(n),
            _ => Err(self.bad("a label")),
        }
    }

    fn movie(&mut self) -> Result<u8, EmitError> {
        match self.next_arg("an MVxx.pmf name")? {
            Arg::Movie(m) => Ok(*m),
            _ => Err(self.bad("an MVxx.pmf name")),
        }
    }

    fn text_index(&mut self) -> Result<usize, EmitError> {
        const EXPECTED: &str = "a text index";
        match self.value(EXPECTED)? {
            v if v >= 0 => Ok(v as usize),
            _ => Err(self.bad(EXPECTED)),
        }
    }

    fn ordinal(
        &mut self,
        table: &'static [&'static str],
        what: &'static str,
    ) -> Result<u8, EmitError> {
        match self.next_arg(what)? {
            Arg::Name(n) => match tables::index_of(table, n) {
                Some(i) => Ok(i as u8),
                None => Err(EmitError::UnknownTableName {
                    table: what,
                    name: n.clone(),
                }),
            },
            _ => Err(self.bad(what)),
        }
    }

    /// Pose bytes outside the named range decode as hex, so both forms
    /// come back in.
    fn pose(&mut self) -> Result<u8, EmitError> {
        const EXPECTED: &str = "a pose name or byte";
        match self.next_arg(EXPECTED)? {
            Arg::Name(n) => match tables::index_of(tables::POSES, n) {
                Some(i) => Ok(i as u8),
                None => Err(EmitError::UnknownTableName {
                    table: "pose",
                    name: n.clone(),
                }),
            },
            Arg::Hex(h) if *h <= u8::MAX as u32 => Ok(*h as u8),
            Arg::Int(i) if (0..=u8::MAX as i64).contains(i) => Ok(*i as u8),
            _ => Err(self.bad(EXPECTED)),
        }
    }

    fn finish(self) -> Result<(), EmitError> {
        if self.next >= self.args.len() {
            Ok(())
        } else {
            Err(self.bad("no further operands"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chartable::CharTable;
    use crate::refs::RefTable;

    fn ins(name: &str, args: &[Arg]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut refs = RefTable::default();
        encode_ins(&mut out, &mut refs, name, args).unwrap();
        out
    }

    #[test]
    fn ret_pads_its_run_to_eight_bytes() {
        let mut out = vec![0u8; 4];
        let mut refs = RefTable::default();
        encode_ins(&mut out, &mut refs, "ret", &[]).unwrap();
        assert_eq!(out, [0, 0, 0, 0, 0xff, 0x21, 0x00, 0x00]);

        // A ret off the boundary pulls the run up to the next one.
        let mut out = vec![0u8; 2];
        encode_ins(&mut out, &mut refs, "ret", &[]).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(&out[2..6], [0xff, 0x21, 0x00, 0x00]);
    }

    #[test]
    fn operand_layouts_match_the_decoder() {
        assert_eq!(ins("battle", &[Arg::Hex(0x0102)]), [0xff, 0x28, 0x02, 0x01]);
        assert_eq!(
            ins("ld_file", &[Arg::Hex(1), Arg::Hex(0x644)]),
            [0xff, 0x2b, 0x01, 0x00, 0x44, 0x06, 0x00, 0x00]
        );
        assert_eq!(
            ins("give_item", &[Arg::Hex(0x20), Arg::Int(-1)]),
            [0xff, 0x3c, 0x20, 0x00, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            ins("play_MV", &[Arg::Movie(0x0b), Arg::Hex(1)]),
            [0xff, 0x2d, 0x0b, 0x01]
        );
        assert_eq!(
            ins("fade_char", &[Arg::Int(-1), Arg::Int(-5)]),
            [0xff, 0x76, 0xff, 0xfb]
        );
        assert_eq!(ins("follow_char", &[Arg::Int(-2)]), [0xff, 0x78, 0xfe, 0xff]);
        assert_eq!(
            ins("money_transfer", &[Arg::Name("REMOVE".into()), Arg::Int(500)]),
            [0xff, 0x3f, 0x01, 0x00, 0xf4, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            ins(
                "pose",
                &[
                    Arg::Hex(2),
                    Arg::Hex(0x7f),
                    Arg::Hex(0x10),
                    Arg::Hex(0x20),
                    Arg::Name("SE".into()),
                    Arg::Hex(0),
                    Arg::Hex(0),
                ],
            ),
            [0xff, 0x64, 0x02, 0x7f, 0x10, 0x20, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn jump_writes_a_placeholder_until_the_label_lands() {
        let mut out = Vec::new();
        let mut refs = RefTable::default();
        encode_ins(
            &mut out,
            &mut refs,
            "jump",
            &[Arg::Name("LABEL_0".into())],
        )
        .unwrap();
        assert_eq!(out, [0xff, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        refs.define_label(&mut out, "LABEL_0");
        assert_eq!(&out[4..8], [0x08, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn bad_operand_shapes_are_rejected() {
        let mut out = Vec::new();
        let mut refs = RefTable::default();

        let err = encode_ins(&mut out, &mut refs, "warp", &[]).unwrap_err();
        assert!(matches!(err, EmitError::UnknownMnemonic(name) if name == "warp"));

        let err = encode_ins(&mut out, &mut refs, "battle", &[]).unwrap_err();
        assert!(matches!(err, EmitError::BadOperands { name, .. } if name == "battle"));

        let err = encode_ins(
            &mut out,
            &mut refs,
            "emote",
            &[Arg::Int(1), Arg::Name("smirk".into())],
        )
        .unwrap_err();
        assert!(matches!(err, EmitError::UnknownTableName { table: "emote", .. }));

        let err = encode_ins(
            &mut out,
            &mut refs,
            "ret",
            &[Arg::Int(1)],
        )
        .unwrap_err();
        assert!(matches!(err, EmitError::BadOperands { .. }));
    }

    #[test]
    fn trigger_rows_must_match_the_original_count() {
        let table = CharTable::parse("0041=A\n").unwrap();
        let mut original = vec![0u8; 0x1000];
        patch_u32_le(&mut original, 0x38, 0x200);
        patch_u32_le(&mut original, 0x200, 1); // one position entry
        patch_u32_le(&mut original, 0x3c, 0x210);
        patch_u32_le(&mut original, 0x48, 0x204);
        patch_u32_le(&mut original, 0x4c, 0x218);
        patch_u32_le(&mut original, 0x64, 0xc00);

        let mut ctx = ParseContext::new();
        ctx.code.push(Stmt::Ins {
            name: "ret".into(),
            args: Vec::new(),
        });
        let err = assemble(ctx, &original, Region::Us, &table).unwrap_err();
        assert!(matches!(
            err,
            EmitError::TriggerCount {
                section: "positions",
                listed: 0,
                expected: 1,
            }
        ));
    }

    #[test]
    fn undefined_labels_fail_the_assembly() {
        let table = CharTable::parse("0041=A\n").unwrap();
        let mut original = vec![0u8; 0x1000];
        patch_u32_le(&mut original, 0x38, 0x200);
        patch_u32_le(&mut original, 0x48, 0x204);
        patch_u32_le(&mut original, 0x64, 0xc00);

        let mut ctx = ParseContext::new();
        ctx.code.push(Stmt::Ins {
            name: "jump".into(),
            args: vec![Arg::Name("LABEL_9".into())],
        });
        let err = assemble(ctx, &original, Region::Us, &table).unwrap_err();
        assert!(matches!(err, EmitError::UndefinedLabels(names) if names == ["LABEL_9"]));
    }
}
