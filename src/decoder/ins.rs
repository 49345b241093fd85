//! Renders one instruction per call, moving the cursor past whatever
//! the instruction occupies. Operand layouts vary per opcode: embedded
//! shorts are little endian, the FF marker pair and the check short of
//! the stricter opcodes are big endian.

use log::warn;

use crate::bytecode::io::ReadExt;
use crate::bytecode::opcodes::{self, *};
use crate::bytecode::INS_MARKER;
use crate::tables;
use crate::text::Render;

use super::{DecodeError, Decoder};

/// Low byte of the FF1B pair that opens an encoded string.
const CHARACTER_NAME_BYTE: u8 = 0x1b;

fn ordinal(
    table: &'static [&'static str],
    index: usize,
    what: &'static str,
) -> Result<&'static str, DecodeError> {
    table
        .get(index)
        .copied()
        .ok_or(DecodeError::UnknownOrdinal {
            what,
            value: index as u32,
        })
}

impl Decoder<'_> {
    /// Decodes the instruction at the cursor into a listing line. An
    /// empty return means the run ended here or padding was skipped;
    /// `self.last` tells the two apart.
    pub(super) fn instruction_line(&mut self, past_text: bool) -> Result<String, DecodeError> {
        let mut b = self.cur.read_u8()?;

        // In files with a string table, code ends where the first
        // string starts.
        if !past_text {
            if let Some(first) = self.texts.first_address() {
                if self.cur.position() as u32 >= first {
                    self.last = true;
                    return Ok(String::new());
                }
            }
        }

        if b != INS_MARKER {
            // Walk over alignment padding. The run goes on only if the
            // first non-zero byte is another instruction marker.
            let tries = self.cur.get_ref().len() as u64 - self.cur.position();
            let mut seen = 0u64;
            loop {
                b = self.cur.read_u8()?;
                if b != 0 {
                    break;
                }
                seen += 1;
                if seen == tries - 1 {
                    break;
                }
            }
            if b != INS_MARKER {
                self.last = true;
            }
            self.cur.set_position(self.cur.position() - 1);
            return Ok(String::new());
        }

        let op = self.cur.read_u8()?;

        // FF1B is not an instruction but the start of an inline string.
        if op == CHARACTER_NAME_BYTE {
            self.last = true;
            return Ok(String::new());
        }

        *self.counts.entry(op).or_insert(0) += 1;

        match op {
            OPCODE_RET => {
                let _pad = self.cur.read_u16_le()?;
                if past_text {
                    self.last = true;
                }
                Ok("\tret\n".to_string())
            }

            OPCODE_JUMP => {
                self.check("jump", op)?;
                let label = self.label_arg()?;
                Ok(format!("\tjump\t{}\n", label))
            }

            OPCODE_JUMP_IF => {
                let condition = self.short_hex()?;
                let label = self.label_arg()?;
                Ok(format!(
                    "\tjump_if\t{},{}\t// the parameter's exact meaning is unknown, but it might be related to game flags\n",
                    condition, label
                ))
            }

            OPCODE_BATTLE => {
                let id = self.cur.read_u16_le()?;
                Ok(format!(
                    "\tbattle\t0x{:04x}\t// {}\n",
                    id,
                    tables::battle_description(id)
                ))
            }

            OPCODE_LD_WORLD_MAP => {
                let param = self.short_hex()?;
                let addr = self.int_hex()?;
                Ok(format!(
                    "\tld_world_map\t{},{}\t// loads a world map\n",
                    param, addr
                ))
            }

            OPCODE_OPEN_SHOP_MENU => {
                let id = self.cur.read_u16_le()?;
                Ok(format!(
                    "\topen_shop_menu\t0x{:04x}\t// opens shop menu: {}\n",
                    id,
                    tables::shop_description(id)
                ))
            }

            OPCODE_LD_FILE => {
                let param = self.short_hex()?;
                let addr = self.int_hex()?;
                Ok(format!(
                    "\tld_file\t{},{}\t// loads another event file\n",
                    param, addr
                ))
            }

            OPCODE_LD_3D_MAP => {
                let map_id = self.byte_hex()?;
                let unknown = self.byte_hex()?;
                let x = self.byte_hex()?;
                let y = self.byte_hex()?;
                let direction = self.byte_hex()?;
                let last = self.byte_hex()?;
                Ok(format!(
                    "\tld_3d_map\t{},{},{},{},{},{}\t// ld_3d_map <map ID>,<unknown>,<X>,<Y>,<direction (0|1|2|3 -> E|W|S|N)>, <unknown>\n",
                    map_id, unknown, x, y, direction, last
                ))
            }

            OPCODE_GIVE_ITEM => {
                let item = self.short_hex()?;
                let quantity = self.cur.read_u32_le()? as i32;
                Ok(format!(
                    "\tgive_item\t{},{}\t// give_item <item_id>,<quantity>\n",
                    item, quantity
                ))
            }

            OPCODE_PLAY_MV => {
                let movie = self.cur.read_u8()?;
                let flag = self.byte_hex()?;
                Ok(format!(
                    "\tplay_MV\tMV{:02x}.pmf,{}\t// second parameter is some kind of flag?\n",
                    movie, flag
                ))
            }

            OPCODE_MONEY_CHECK => {
                self.check("money_check", op)?;
                let fee = self.cur.read_u32_le()? as i32;
                let label = self.label_arg()?;
                Ok(format!(
                    "\tmoney_check\t{},{}\t// money_check <fee, label when not enough money>\n",
                    fee, label
                ))
            }

            OPCODE_MONEY_TRANSFER => {
                let direction = self.cur.read_u16_le()?;
                let quantity = self.cur.read_u32_le()? as i32;
                let direction =
                    ordinal(tables::MONEY_DIRECTION, direction as usize, "money direction")?;
                Ok(format!(
                    "\tmoney_transfer\t{},{}\t// money_transfer <ADD or REMOVE>,<quantity>\n",
                    direction, quantity
                ))
            }

            OPCODE_OPEN_SAVE_MENU => Ok("\topen_save_menu\n".to_string()),

            OPCODE_WAIT => {
                let ticks = self.short_hex()?;
                Ok(format!("\twait\t{}\t// value in ticks \n", ticks))
            }

            OPCODE_PLAYER_OPTION => {
                let param = self.short_hex()?;
                let label = self.label_arg()?;
                Ok(format!(
                    "\tplayer_option\t{},{}\t// player_option <option num?>,<label>\n",
                    param, label
                ))
            }

            OPCODE_LD_TEXT => {
                self.check("ld_text", op)?;
                let address = self.cur.read_u32_le()?;
                let idx = match self.texts.index_of(address) {
                    Some(idx) => idx,
                    // Some scripts use strings the table does not
                    // list, so pick those up by address here.
                    None => {
                        let idx = self.texts.append(
                            &mut self.cur,
                            address,
                            self.table,
                            Render::RoundTrip,
                        )?;
                        warn!("the text table skips the string at {address:#x}, listed as {idx}");
                        idx
                    }
                };
                Ok(format!(
                    "\tld_text\t{}\t// idx of text in .text section\n",
                    idx
                ))
            }

            OPCODE_OPEN_DIALOG => {
                self.check("open_dialog", op)?;
                Ok("\topen_dialog\t// opens dialog box graphic\n".to_string())
            }

            OPCODE_CLOSE_DIALOG => {
                self.check("close_dialog", op)?;
                Ok("\tclose_dialog\t// closes dialog box graphic\n".to_string())
            }

            OPCODE_POSE => {
                let character = self.cur.read_u8()?;
                let pose = self.cur.read_u8()?;
                let pose = match tables::POSES.get(pose as usize) {
                    Some(name) => (*name).to_string(),
                    None => format!("0x{:02x}", pose),
                };
                let x = self.byte_hex()?;
                let y = self.byte_hex()?;
                let direction =
                    ordinal(tables::EVENT_DIRS, self.cur.read_u8()? as usize, "event direction")?;
                let unknown1 = self.byte_hex()?;
                let unknown2 = self.int_hex()?;
                Ok(format!(
                    "\tpose\t0x{:02x},{},{},{},{},{},{}\t// pose <character ID>,<pose>,<X>,<Y>,<direction>,<unknown>,<unknown>\n",
                    character, pose, x, y, direction, unknown1, unknown2
                ))
            }

            OPCODE_FX => {
                let kind = self.byte_hex()?;
                let param = self.byte_hex()?;
                let first = self.int_hex()?;
                let second = self.int_hex()?;
                Ok(format!(
                    "\tfx\t{},{},{},{}\t// makes effect happen, like lightning. No idea of the specifics\n",
                    kind, param, first, second
                ))
            }

            OPCODE_CLR_CHAR => {
                let id = self.short_hex()?;
                Ok(format!(
                    "\tclr_char\t{}\t// this clears the character numbered in the parameter\n",
                    id
                ))
            }

            OPCODE_LD_PORTRAIT => {
                let who = ordinal(
                    tables::PORTRAIT_CHARS,
                    self.cur.read_u8()? as usize,
                    "portrait character",
                )?;
                let side = ordinal(
                    tables::PORTRAIT_ORIENTATION,
                    self.cur.read_u8()? as usize,
                    "portrait orientation",
                )?;
                Ok(format!("\tld_portrait\t{},{}\n", who, side))
            }

            OPCODE_CLOSE_PORTRAIT => {
                self.check("close_portrait", op)?;
                Ok("\tclose_portrait\t// closes portrait graphic\n".to_string())
            }

            OPCODE_EMOTE => {
                let character = self.cur.read_u8()? as i8;
                let emote = ordinal(tables::EMOTES, self.cur.read_u8()? as usize, "emote")?;
                Ok(format!(
                    "\temote\t{},{}\t// first parameter = character ID (dependent on scene)\n",
                    character, emote
                ))
            }

            OPCODE_SCREEN_FX => {
                let id = self.cur.read_u16_le()?;
                Ok(format!(
                    "\tscreen_fx\t0x{:04x}\t// does an effect that fills the full screen. In this case, {}\n",
                    id,
                    tables::screen_effect_description(id)
                ))
            }

            OPCODE_PLAN_CHAR_MOV => {
                let character = self.byte_hex()?;
                let trajectory = self.byte_hex()?;
                let speed = self.byte_hex()?;
                let dest_dir = self.byte_hex()?;
                let fifth = self.byte_hex()?;
                let sixth = self.byte_hex()?;
                Ok(format!(
                    "\tplan_char_mov\t{},{},{},{},{},{}\t// plan_char_mov\t<character ID>,<trajectory idx>,<speed>,<direction_at_destination>,...\n",
                    character, trajectory, speed, dest_dir, fifth, sixth
                ))
            }

            OPCODE_FADE_CHAR => {
                let id = self.cur.read_u8()? as i8;
                let speed = self.cur.read_u8()? as i8;
                Ok(format!(
                    "\tfade_char\t{},{}\t// fades character with ID in first param with speed in second param\n",
                    id, speed
                ))
            }

            OPCODE_FOLLOW_CHAR => {
                let id = self.cur.read_u16_le()? as i16;
                Ok(format!(
                    "\tfollow_char\t{}\t// sets camera to follow character. parameter = character ID (dependent on scene)\n",
                    id
                ))
            }

            OPCODE_CLR_EMOTE => {
                let id = self.cur.read_u16_le()? as i16;
                Ok(format!(
                    "\tclr_emote\t{}\t// clears the emote of the character in the parameter\n",
                    id
                ))
            }

            OPCODE_DO_PLANNED_MOVES => {
                self.check("do_planned_moves", op)?;
                Ok("\tdo_planned_moves\t// executes the previously planned character movements\n"
                    .to_string())
            }

            OPCODE_TP_CHAR => {
                let param = self.short_hex()?;
                let addr = self.int_hex()?;
                Ok(format!(
                    "\ttp_char\t{},{}\t// sets position/direction of a character, specifics of parameters are unknown\n",
                    param, addr
                ))
            }

            OPCODE_PLAY_SONG => {
                let id = self.short_hex()?;
                Ok(format!(
                    "\tplay_song\t{}\t// plays the song whose ID is in the parameter\n",
                    id
                ))
            }

            OPCODE_PLAY_SFX => {
                let id = self.cur.read_u16_le()?;
                Ok(format!(
                    "\tplay_sfx\t0x{:04x}\t// plays sfx: {}\n",
                    id,
                    tables::sfx_description(id)
                ))
            }

            _ if opcodes::is_labelled_unknown(op) => {
                let param = self.cur.read_u16_le()?;
                let label = self.label_arg()?;
                Ok(format!(
                    "\t{}\t0x{:04x},{}\t// unknown, but uses a label\n",
                    opcodes::labelled_unknown_name(op),
                    param,
                    label
                ))
            }

            // No known shape. Keep the raw words so the listing still
            // re-encodes byte for byte.
            _ => {
                let mut line = format!("\tunknown|ff{:02x}", op);
                line.push_str(&format!("{:02x}", self.cur.read_u8()?));
                line.push_str(&format!("{:02x}", self.cur.read_u8()?));
                for _ in 0..opcodes::opaque_words(op) {
                    line.push_str(&format!(",{:08x}", self.cur.read_u32_be()?));
                }
                line.push('\n');
                Ok(line)
            }
        }
    }

    /// Reads the big endian check short that some opcodes carry and
    /// rejects the instruction when it is not zero.
    fn check(&mut self, name: &'static str, opcode: u8) -> Result<(), DecodeError> {
        let check = self.cur.read_u16_be()?;
        if check != 0 {
            return Err(DecodeError::BadCheck {
                name,
                opcode,
                check,
            });
        }
        Ok(())
    }

    /// Reads a code address and returns the label standing for it,
    /// creating one on first sight.
    fn label_arg(&mut self) -> Result<String, DecodeError> {
        let address = self.cur.read_u32_le()?;
        Ok(self.labels.id_for(address).to_string())
    }

    fn byte_hex(&mut self) -> Result<String, DecodeError> {
        Ok(format!("0x{:02x}", self.cur.read_u8()?))
    }

    fn short_hex(&mut self) -> Result<String, DecodeError> {
        Ok(format!("0x{:04x}", self.cur.read_u16_le()?))
    }

    fn int_hex(&mut self) -> Result<String, DecodeError> {
        Ok(format!("0x{:08x}", self.cur.read_u32_le()?))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, DecodeError};
    use crate::bytecode::io::patch_u32_le;
    use crate::bytecode::Region;
    use crate::chartable::CharTable;

    fn table() -> CharTable {
        CharTable::parse("0041=A\n").unwrap()
    }

    /// Wraps a code run so it decodes at 0xc00, past the header tables.
    fn file_with_code(code: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; 0x1000];
        patch_u32_le(&mut data, 0x38, 0x200);
        patch_u32_le(&mut data, 0x48, 0x204);
        patch_u32_le(&mut data, 0x64, 0xc00);
        data[0xc00..0xc00 + code.len()].copy_from_slice(code);
        // Plant a non-zero byte so the run cannot skip past the end.
        data[0xc00 + code.len()] = 0x01;
        data
    }

    fn listing_for(code: &[u8]) -> String {
        decode(&file_with_code(code), Region::Us, &table())
            .unwrap()
            .listing
    }

    #[test]
    fn jump_renders_its_target_label() {
        let code = [
            0xff, 0x22, 0x00, 0x00, 0x08, 0x0c, 0x00, 0x00, // jump 0xc08
            0xff, 0x21, 0x00, 0x00, // ret
        ];
        let listing = listing_for(&code);
        assert!(listing.contains("\tjump\tLABEL_0\n"));
        assert!(listing.contains("\nLABEL_0:\n\tret\n"));
    }

    #[test]
    fn jump_with_dirty_check_is_rejected() {
        let code = [0xff, 0x22, 0x00, 0x01, 0x08, 0x0c, 0x00, 0x00];
        let err = decode(&file_with_code(&code), Region::Us, &table()).unwrap_err();
        match err {
            DecodeError::BadCheck { name, check, .. } => {
                assert_eq!(name, "jump");
                assert_eq!(check, 0x0001);
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn battle_is_annotated_from_the_id() {
        let code = [
            0xff, 0x28, 0x01, 0x00, // battle 0x0001
            0xff, 0x21, 0x00, 0x00,
        ];
        let listing = listing_for(&code);
        assert!(listing.contains("\tbattle\t0x0001\t// "));
    }

    #[test]
    fn pose_falls_back_to_hex_for_unnamed_poses() {
        let code = [
            0xff, 0x64, 0x02, 0x7f, // character 2, pose 0x7f (no name)
            0x10, 0x20, 0x01, 0x00, // x, y, direction SE, unknown
            0x00, 0x00, 0x00, 0x00, // final word
            0xff, 0x21, 0x00, 0x00,
        ];
        let listing = listing_for(&code);
        assert!(listing.contains("\tpose\t0x02,0x7f,0x10,0x20,SE,0x00,0x00000000\t// pose"));
    }

    #[test]
    fn emote_ordinal_out_of_range_errors() {
        let code = [0xff, 0x69, 0x01, 0x63, 0xff, 0x21, 0x00, 0x00];
        let err = decode(&file_with_code(&code), Region::Us, &table()).unwrap_err();
        match err {
            DecodeError::UnknownOrdinal { what, value } => {
                assert_eq!(what, "emote");
                assert_eq!(value, 0x63);
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn signed_operands_render_in_decimal() {
        let code = [
            0xff, 0x76, 0xff, 0xfb, // fade_char -1, -5
            0xff, 0x78, 0xfe, 0xff, // follow_char -2
            0xff, 0x21, 0x00, 0x00,
        ];
        let listing = listing_for(&code);
        assert!(listing.contains("\tfade_char\t-1,-5\t// fades"));
        assert!(listing.contains("\tfollow_char\t-2\t// sets camera"));
    }

    #[test]
    fn movie_name_carries_the_file_number() {
        let code = [0xff, 0x2d, 0x0b, 0x01, 0xff, 0x21, 0x00, 0x00];
        let listing = listing_for(&code);
        assert!(listing.contains("\tplay_MV\tMV0b.pmf,0x01\t// second parameter"));
    }

    #[test]
    fn unmapped_opcode_becomes_an_opaque_blob() {
        let code = [
            0xff, 0x3d, 0x12, 0x34, // mapped but shapeless, one extra word
            0xab, 0xcd, 0xef, 0x01, 0xff, 0x21, 0x00, 0x00,
        ];
        let listing = listing_for(&code);
        assert!(listing.contains("\tunknown|ff3d1234,abcdef01\n"));
    }

    #[test]
    fn open_save_menu_reads_no_operand_short() {
        // The padding short after open_save_menu stays in the stream,
        // so the run continues over it to the ret.
        let code = [0xff, 0x4b, 0x00, 0x00, 0xff, 0x21, 0x00, 0x00];
        let listing = listing_for(&code);
        assert!(listing.contains("\topen_save_menu\n\tret\n"));
    }
}
