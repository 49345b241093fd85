//! The opcode vocabulary and its text mnemonics.
//!
//! A cell is four bytes: the 0xFF marker, the opcode, and two payload
//! bytes. Opcodes past the payload pull more words from the stream. Only
//! part of the vocabulary has been reverse engineered; opcodes known to
//! take a code address get an `unk_cmd_XX` mnemonic, and the rest are
//! kept as raw word blobs.

/// Padding between instruction runs.
pub const OPCODE_NOTHING: u8 = 0x00;

/// Ends an instruction run.
pub const OPCODE_RET: u8 = 0x21;

/// Unconditional jump to a code address.
pub const OPCODE_JUMP: u8 = 0x22;

/// Conditional jump. The condition half word is not understood.
pub const OPCODE_JUMP_IF: u8 = 0x26;

/// Starts one of the scripted battles.
pub const OPCODE_BATTLE: u8 = 0x28;

pub const OPCODE_LD_WORLD_MAP: u8 = 0x29;
pub const OPCODE_OPEN_SHOP_MENU: u8 = 0x2A;
pub const OPCODE_LD_FILE: u8 = 0x2B;
pub const OPCODE_LD_3D_MAP: u8 = 0x2C;
pub const OPCODE_PLAY_MV: u8 = 0x2D;
pub const OPCODE_GIVE_ITEM: u8 = 0x3C;

/// Branches when the party cannot pay a fee.
pub const OPCODE_MONEY_CHECK: u8 = 0x3E;

pub const OPCODE_MONEY_TRANSFER: u8 = 0x3F;
pub const OPCODE_OPEN_SAVE_MENU: u8 = 0x4B;
pub const OPCODE_WAIT: u8 = 0x4D;

/// Presents a choice and branches on it.
pub const OPCODE_PLAYER_OPTION: u8 = 0x54;

/// Loads a dialogue string by address.
pub const OPCODE_LD_TEXT: u8 = 0x55;

pub const OPCODE_OPEN_DIALOG: u8 = 0x60;
pub const OPCODE_CLOSE_DIALOG: u8 = 0x61;
pub const OPCODE_POSE: u8 = 0x64;
pub const OPCODE_FX: u8 = 0x65;
pub const OPCODE_CLR_CHAR: u8 = 0x66;
pub const OPCODE_LD_PORTRAIT: u8 = 0x67;
pub const OPCODE_CLOSE_PORTRAIT: u8 = 0x68;
pub const OPCODE_EMOTE: u8 = 0x69;
pub const OPCODE_SCREEN_FX: u8 = 0x6C;
pub const OPCODE_PLAN_CHAR_MOV: u8 = 0x6E;
pub const OPCODE_FADE_CHAR: u8 = 0x76;
pub const OPCODE_FOLLOW_CHAR: u8 = 0x78;
pub const OPCODE_CLR_EMOTE: u8 = 0x7A;
pub const OPCODE_DO_PLANNED_MOVES: u8 = 0x7B;
pub const OPCODE_TP_CHAR: u8 = 0x7C;
pub const OPCODE_PLAY_SONG: u8 = 0x80;
pub const OPCODE_PLAY_SFX: u8 = 0x81;

/// Opcodes with unknown behavior that demonstrably take a code address,
/// so their operand must be relocated like any jump target.
const LABELLED_UNKNOWNS: [u8; 11] = [
    0x2F, 0x30, 0x3A, 0x3B, 0x44, 0x45, 0x47, 0x58, 0x59, 0x5A, 0x87,
];

/// Mnemonic of a fixed-name opcode. Labelled unknowns and opaque opcodes
/// have no entry here.
pub fn mnemonic(code: u8) -> Option<&'static str> {
    let name = match code {
        OPCODE_RET => "ret",
        OPCODE_JUMP => "jump",
        OPCODE_JUMP_IF => "jump_if",
        OPCODE_BATTLE => "battle",
        OPCODE_LD_WORLD_MAP => "ld_world_map",
        OPCODE_OPEN_SHOP_MENU => "open_shop_menu",
        OPCODE_LD_FILE => "ld_file",
        OPCODE_LD_3D_MAP => "ld_3d_map",
        OPCODE_PLAY_MV => "play_MV",
        OPCODE_GIVE_ITEM => "give_item",
        OPCODE_MONEY_CHECK => "money_check",
        OPCODE_MONEY_TRANSFER => "money_transfer",
        OPCODE_OPEN_SAVE_MENU => "open_save_menu",
        OPCODE_WAIT => "wait",
        OPCODE_PLAYER_OPTION => "player_option",
        OPCODE_LD_TEXT => "ld_text",
        OPCODE_OPEN_DIALOG => "open_dialog",
        OPCODE_CLOSE_DIALOG => "close_dialog",
        OPCODE_POSE => "pose",
        OPCODE_FX => "fx",
        OPCODE_CLR_CHAR => "clr_char",
        OPCODE_LD_PORTRAIT => "ld_portrait",
        OPCODE_CLOSE_PORTRAIT => "close_portrait",
        OPCODE_EMOTE => "emote",
        OPCODE_SCREEN_FX => "screen_fx",
        OPCODE_PLAN_CHAR_MOV => "plan_char_mov",
        OPCODE_FADE_CHAR => "fade_char",
        OPCODE_FOLLOW_CHAR => "follow_char",
        OPCODE_CLR_EMOTE => "clr_emote",
        OPCODE_DO_PLANNED_MOVES => "do_planned_moves",
        OPCODE_TP_CHAR => "tp_char",
        OPCODE_PLAY_SONG => "play_song",
        OPCODE_PLAY_SFX => "play_sfx",
        _ => return None,
    };
    Some(name)
}

/// True for opcodes rendered as `unk_cmd_XX` with a label operand.
pub fn is_labelled_unknown(code: u8) -> bool {
    LABELLED_UNKNOWNS.contains(&code)
}

/// Mnemonic of a labelled unknown, `unk_cmd_XX` with upper case hex.
pub fn labelled_unknown_name(code: u8) -> String {
    format!("unk_cmd_{code:02X}")
}

/// Opcode for a mnemonic, covering both fixed names and `unk_cmd_XX`.
pub fn opcode_for(name: &str) -> Option<u8> {
    if let Some(suffix) = name.strip_prefix("unk_cmd_") {
        return u8::from_str_radix(suffix, 16)
            .ok()
            .filter(|code| is_labelled_unknown(*code));
    }
    let code = match name {
        "ret" => OPCODE_RET,
        "jump" => OPCODE_JUMP,
        "jump_if" => OPCODE_JUMP_IF,
        "battle" => OPCODE_BATTLE,
        "ld_world_map" => OPCODE_LD_WORLD_MAP,
        "open_shop_menu" => OPCODE_OPEN_SHOP_MENU,
        "ld_file" => OPCODE_LD_FILE,
        "ld_3d_map" => OPCODE_LD_3D_MAP,
        "play_MV" => OPCODE_PLAY_MV,
        "give_item" => OPCODE_GIVE_ITEM,
        "money_check" => OPCODE_MONEY_CHECK,
        "money_transfer" => OPCODE_MONEY_TRANSFER,
        "open_save_menu" => OPCODE_OPEN_SAVE_MENU,
        "wait" => OPCODE_WAIT,
        "player_option" => OPCODE_PLAYER_OPTION,
        "ld_text" => OPCODE_LD_TEXT,
        "open_dialog" => OPCODE_OPEN_DIALOG,
        "close_dialog" => OPCODE_CLOSE_DIALOG,
        "pose" => OPCODE_POSE,
        "fx" => OPCODE_FX,
        "clr_char" => OPCODE_CLR_CHAR,
        "ld_portrait" => OPCODE_LD_PORTRAIT,
        "close_portrait" => OPCODE_CLOSE_PORTRAIT,
        "emote" => OPCODE_EMOTE,
        "screen_fx" => OPCODE_SCREEN_FX,
        "plan_char_mov" => OPCODE_PLAN_CHAR_MOV,
        "fade_char" => OPCODE_FADE_CHAR,
        "follow_char" => OPCODE_FOLLOW_CHAR,
        "clr_emote" => OPCODE_CLR_EMOTE,
        "do_planned_moves" => OPCODE_DO_PLANNED_MOVES,
        "tp_char" => OPCODE_TP_CHAR,
        "play_song" => OPCODE_PLAY_SONG,
        "play_sfx" => OPCODE_PLAY_SFX,
        _ => return None,
    };
    Some(code)
}

/// Number of extra payload words an opaque opcode drags behind its cell.
pub fn opaque_words(code: u8) -> usize {
    match code {
        0x3D | 0x79 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics_round_trip() {
        for code in 0u8..=0xFF {
            if let Some(name) = mnemonic(code) {
                assert_eq!(opcode_for(name), Some(code), "{name}");
            }
        }
    }

    #[test]
    fn labelled_unknown_names_round_trip() {
        for code in LABELLED_UNKNOWNS {
            let name = labelled_unknown_name(code);
            assert!(name.starts_with("unk_cmd_"));
            assert_eq!(opcode_for(&name), Some(code), "{name}");
        }
        assert_eq!(labelled_unknown_name(0x2F), "unk_cmd_2F");
    }

    #[test]
    fn unlisted_unk_cmd_is_rejected() {
        assert_eq!(opcode_for("unk_cmd_99"), None);
        assert_eq!(opcode_for("unk_cmd_xx"), None);
    }

    #[test]
    fn opaque_word_counts() {
        assert_eq!(opaque_words(0x3D), 1);
        assert_eq!(opaque_words(0x79), 1);
        assert_eq!(opaque_words(0x24), 0);
        assert_eq!(opaque_words(0x8A), 0);
    }
}
