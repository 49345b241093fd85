//! Turns dialogue code streams into text and back.
//!
//! A string is a run of big endian half words: glyph codes resolved
//! through the [`CharTable`], and control codes in the 0xFF00 range.
//! Control codes surface as `(*NAME*)` or `(*NAME,param*)` escapes, a
//! glyph missing from the table as `{XXXX}`, and both forms encode back
//! to the exact half words they came from.

use std::io::{self, Cursor};

use thiserror::Error;

use crate::bytecode::io::{ReadExt, WriteExt};
use crate::chartable::CharTable;
use crate::tables;

/// Terminates every string.
pub const CODE_END: u16 = 0xFF01;
/// Waits for a button press.
pub const CODE_AWAITING_INPUT: u16 = 0xFF02;
pub const CODE_LINE_BREAK: u16 = 0xFF03;
/// Clears the box and keeps printing.
pub const CODE_CONTINUE: u16 = 0xFF04;
/// Pauses for its parameter in ticks.
pub const CODE_WAIT: u16 = 0xFF05;
/// Older color selector, parameterized like [`CODE_SET_COLOR`].
pub const CODE_LEGACY_SET_COLOR: u16 = 0xFF06;
pub const CODE_PLAYER_FIRST_NAME: u16 = 0xFF07;
pub const CODE_PLAYER_NICKNAME: u16 = 0xFF08;
/// Presents the option set named by its parameter.
pub const CODE_SHOW_OPTIONS: u16 = 0xFF0E;
pub const CODE_PLAYER_LAST_NAME: u16 = 0xFF0F;
pub const CODE_COIN_NUMBER: u16 = 0xFF11;
pub const CODE_SET_COLOR: u16 = 0xFF18;
pub const CODE_PRINT_ICON: u16 = 0xFF19;
pub const CODE_PRINT_VALUE: u16 = 0xFF1A;
/// Prints the speaking character's name, highlighted.
pub const CODE_CHARACTER_NAME: u16 = 0xFF1B;

const MARKERS: &[(u16, &str)] = &[
    (CODE_END, "END"),
    (CODE_AWAITING_INPUT, "AWAITING_INPUT"),
    (CODE_LINE_BREAK, "LINE_BREAK"),
    (CODE_CONTINUE, "CONTINUE"),
    (CODE_WAIT, "WAIT"),
    (CODE_LEGACY_SET_COLOR, "LEGACY_SET_COLOR"),
    (CODE_PLAYER_FIRST_NAME, "PLAYER_FIRST_NAME"),
    (CODE_PLAYER_NICKNAME, "PLAYER_NICKNAME"),
    (CODE_SHOW_OPTIONS, "SHOW_OPTIONS"),
    (CODE_PLAYER_LAST_NAME, "PLAYER_LAST_NAME"),
    (CODE_COIN_NUMBER, "COIN_NUMBER"),
    (CODE_SET_COLOR, "SET_COLOR"),
    (CODE_PRINT_ICON, "PRINT_ICON"),
    (CODE_PRINT_VALUE, "PRINT_VALUE"),
    (CODE_CHARACTER_NAME, "CHARACTER_NAME"),
];

/// Single letter names for the color parameters.
const COLOR_LETTERS: &[(u16, char)] = &[
    (0x0000, '_'),
    (0x0001, 'W'),
    (0x0002, 'B'),
    (0x0003, 'P'),
    (0x0004, 'G'),
    (0x0005, 'Y'),
    (0x0007, 'R'),
];

const ANSI_RESET: &str = "\u{1B}[0m";
const ANSI_BLUE: &str = "\u{1B}[34m";
const ANSI_PINK: &str = "\u{1B}[35m";
const ANSI_YELLOW: &str = "\u{1B}[33m";
const ANSI_RED: &str = "\u{1B}[31m";

/// Color used for character names in display renders.
const CHARACTER_NAME_COLOR: &str = ANSI_YELLOW;

fn marker_name(code: u16) -> Option<&'static str> {
    MARKERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn marker_code(name: &str) -> Option<u16> {
    MARKERS
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

fn color_letter(code: u16) -> Option<char> {
    COLOR_LETTERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, letter)| *letter)
}

fn color_code(letter: char) -> Option<u16> {
    COLOR_LETTERS
        .iter()
        .find(|(_, l)| *l == letter)
        .map(|(code, _)| *code)
}

fn ansi_color(code: u16) -> Option<&'static str> {
    match code {
        0x0000 => Some(ANSI_RESET),
        0x0002 => Some(ANSI_BLUE),
        0x0003 => Some(ANSI_PINK),
        0x0005 => Some(ANSI_YELLOW),
        0x0007 => Some(ANSI_RED),
        _ => None,
    }
}

/// How dialogue codes surface in a decoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Escape every control code so the string encodes back losslessly.
    RoundTrip,
    /// Resolve breaks and colors for reading in a terminal.
    Display,
}

#[derive(Debug, Error)]
pub enum TextError {
    #[error("Character {0} is not usable.")]
    Unmappable(char),

    #[error("unknown text marker {0:?}")]
    UnknownMarker(String),

    #[error("text marker opened with (* but never closed")]
    UnclosedMarker,

    #[error("marker {name} has a bad parameter {param:?}")]
    BadMarkerParam { name: String, param: String },

    #[error("bad raw glyph escape {0:?}")]
    BadEscape(String),
}

/// Reads the string starting at `address` and renders it between quotes.
///
/// The cursor position is restored afterwards. In round trip mode any
/// option sets shown get a trailing `//` annotation listing the choices,
/// placed after the closing quote.
pub fn decode_string(
    cur: &mut Cursor<&[u8]>,
    address: u32,
    table: &CharTable,
    mode: Render,
) -> io::Result<String> {
    let backup = cur.position();
    cur.set_position(address.into());

    let mut out = String::from("\"");
    let mut options_comment = String::new();
    let mut name_color_set = false;

    loop {
        let data = cur.read_u16_be()?;
        if data == CODE_END {
            break;
        }
        match data {
            CODE_AWAITING_INPUT
            | CODE_PLAYER_FIRST_NAME
            | CODE_PLAYER_NICKNAME
            | CODE_PLAYER_LAST_NAME
            | CODE_COIN_NUMBER => push_marker(&mut out, data),

            CODE_LINE_BREAK => {
                if name_color_set {
                    if mode == Render::Display {
                        out.push_str(ANSI_RESET);
                    }
                    name_color_set = false;
                }
                match mode {
                    Render::Display => out.push('\n'),
                    Render::RoundTrip => push_marker(&mut out, data),
                }
            }

            CODE_CONTINUE => match mode {
                Render::Display => out.push_str("\n\n"),
                Render::RoundTrip => push_marker(&mut out, data),
            },

            CODE_WAIT | CODE_PRINT_VALUE => {
                let param = cur.read_u16_le()?;
                push_marker_param(&mut out, data, param as i16);
            }

            CODE_SHOW_OPTIONS => {
                let param = cur.read_u16_le()?;
                push_marker_param(&mut out, data, param as i16);
                if let Some(set) = tables::option_set(param) {
                    options_comment.push_str("\t// Shows options: |");
                    for option in set {
                        options_comment.push('"');
                        options_comment.push_str(option);
                        options_comment.push('"');
                        options_comment.push('|');
                    }
                }
            }

            CODE_SET_COLOR | CODE_LEGACY_SET_COLOR => {
                let param = cur.read_u16_le()?;
                match mode {
                    Render::Display => {
                        if let Some(ansi) = ansi_color(param) {
                            out.push_str(ansi);
                        }
                    }
                    Render::RoundTrip => match color_letter(param) {
                        Some(letter) => {
                            let name = marker_name(data).unwrap_or("SET_COLOR");
                            out.push_str("(*");
                            out.push_str(name);
                            out.push(',');
                            out.push(letter);
                            out.push_str("*)");
                        }
                        // Colors outside the letter set fall back to the
                        // numeric form, which encodes back equally well.
                        None => push_marker_param(&mut out, data, param as i16),
                    },
                }
            }

            CODE_PRINT_ICON => {
                let param = cur.read_u16_le()?;
                match mode {
                    Render::Display => match param {
                        0 => out.push('\u{1F9F4}'),
                        3 => out.push('\u{1F511}'),
                        _ => out.push('\u{2753}'),
                    },
                    Render::RoundTrip => push_marker_param(&mut out, data, param as i16),
                }
            }

            CODE_CHARACTER_NAME => {
                match mode {
                    Render::Display => out.push_str(CHARACTER_NAME_COLOR),
                    Render::RoundTrip => push_marker(&mut out, data),
                }
                name_color_set = true;
            }

            _ => match table.text_for(data) {
                Some(text) => out.push_str(text),
                None => out.push_str(&format!("{{{data:04X}}}")),
            },
        }
    }

    out.push('"');
    out.push_str(&options_comment);

    cur.set_position(backup);
    Ok(out)
}

fn push_marker(out: &mut String, code: u16) {
    if let Some(name) = marker_name(code) {
        out.push_str("(*");
        out.push_str(name);
        out.push_str("*)");
    }
}

fn push_marker_param(out: &mut String, code: u16, param: i16) {
    if let Some(name) = marker_name(code) {
        out.push_str("(*");
        out.push_str(name);
        out.push(',');
        out.push_str(&param.to_string());
        out.push_str("*)");
    }
}

/// Encodes the unquoted text of one string, terminator included.
pub fn encode_string(out: &mut Vec<u8>, text: &str, table: &CharTable) -> Result<(), TextError> {
    let mut rest = text;
    loop {
        if let Some(after) = rest.strip_prefix("(*") {
            let end = after.find("*)").ok_or(TextError::UnclosedMarker)?;
            encode_marker(out, &after[..end])?;
            rest = &after[end + 2..];
            continue;
        }
        if let Some(after) = rest.strip_prefix('{') {
            let end = after
                .find('}')
                .ok_or_else(|| TextError::BadEscape(after.chars().take(8).collect()))?;
            let digits = &after[..end];
            let code = u16::from_str_radix(digits, 16)
                .map_err(|_| TextError::BadEscape(digits.to_string()))?;
            out.push_u16_be(code);
            rest = &after[end + 1..];
            continue;
        }
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        out.push_u16_be(glyph_code(table, c)?);
        rest = &rest[c.len_utf8()..];
    }
    out.push_u16_be(CODE_END);
    Ok(())
}

fn encode_marker(out: &mut Vec<u8>, body: &str) -> Result<(), TextError> {
    if let Some(code) = marker_code(body) {
        out.push_u16_be(code);
        return Ok(());
    }
    let (name, param) = body
        .split_once(',')
        .ok_or_else(|| TextError::UnknownMarker(body.to_string()))?;
    let code = marker_code(name).ok_or_else(|| TextError::UnknownMarker(body.to_string()))?;
    out.push_u16_be(code);

    let bad_param = || TextError::BadMarkerParam {
        name: name.to_string(),
        param: param.to_string(),
    };
    match name {
        "WAIT" | "SHOW_OPTIONS" | "PRINT_VALUE" | "PRINT_ICON" => {
            let value: i16 = param.parse().map_err(|_| bad_param())?;
            out.push_u16_le(value as u16);
        }
        "SET_COLOR" | "LEGACY_SET_COLOR" => {
            let letter = param.chars().next().ok_or_else(bad_param)?;
            match color_code(letter) {
                Some(value) => out.push_u16_le(value),
                // Numeric fallback, the counterpart of the decode side.
                None => {
                    let value: i16 = param.parse().map_err(|_| bad_param())?;
                    out.push_u16_le(value as u16);
                }
            }
        }
        _ => return Err(TextError::UnknownMarker(body.to_string())),
    }
    Ok(())
}

fn glyph_code(table: &CharTable, c: char) -> Result<u16, TextError> {
    if let Some(code) = table.code_for_char(c) {
        return Ok(code);
    }
    fold_char(c)
        .and_then(|folded| table.code_for_char(folded))
        .ok_or(TextError::Unmappable(c))
}

/// Folds full width compatibility forms onto their plain table glyphs.
fn fold_char(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '),
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFF01 + 0x21),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CharTable {
        CharTable::parse("0000= \n0001=A\n0002=B\n0003=!\n").unwrap()
    }

    fn decode(bytes: &[u8], mode: Render) -> String {
        let mut cur = Cursor::new(bytes);
        decode_string(&mut cur, 0, &table(), mode).unwrap()
    }

    fn encode(text: &str) -> Vec<u8> {
        let mut out = Vec::new();
        encode_string(&mut out, text, &table()).unwrap();
        out
    }

    #[test]
    fn plain_glyphs_round_trip() {
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xFF, 0x01];
        assert_eq!(decode(&bytes, Render::RoundTrip), "\"A B\"");
        assert_eq!(encode("A B"), bytes);
    }

    #[test]
    fn markers_escape_and_encode_back() {
        let bytes = [
            0x00, 0x01, // A
            0xFF, 0x03, // line break
            0xFF, 0x05, 0x2C, 0x01, // wait 300, little endian param
            0xFF, 0x02, // awaiting input
            0xFF, 0x01,
        ];
        let text = decode(&bytes, Render::RoundTrip);
        assert_eq!(text, "\"A(*LINE_BREAK*)(*WAIT,300*)(*AWAITING_INPUT*)\"");
        assert_eq!(encode("A(*LINE_BREAK*)(*WAIT,300*)(*AWAITING_INPUT*)"), bytes);
    }

    #[test]
    fn display_mode_resolves_breaks_and_colors() {
        let bytes = [
            0xFF, 0x1B, // character name
            0x00, 0x01, // A
            0xFF, 0x03, // line break resets the name color
            0xFF, 0x18, 0x07, 0x00, // set color red
            0x00, 0x02, // B
            0xFF, 0x01,
        ];
        let text = decode(&bytes, Render::Display);
        assert_eq!(text, "\"\u{1B}[33mA\u{1B}[0m\n\u{1B}[31mB\"");
    }

    #[test]
    fn color_letters_round_trip() {
        let bytes = [0xFF, 0x18, 0x05, 0x00, 0x00, 0x01, 0xFF, 0x01];
        let text = decode(&bytes, Render::RoundTrip);
        assert_eq!(text, "\"(*SET_COLOR,Y*)A\"");
        assert_eq!(encode("(*SET_COLOR,Y*)A"), bytes);
    }

    #[test]
    fn unmapped_color_takes_the_numeric_form() {
        let bytes = [0xFF, 0x06, 0x06, 0x00, 0xFF, 0x01];
        let text = decode(&bytes, Render::RoundTrip);
        assert_eq!(text, "\"(*LEGACY_SET_COLOR,6*)\"");
        assert_eq!(encode("(*LEGACY_SET_COLOR,6*)"), bytes);
    }

    #[test]
    fn unknown_glyphs_become_raw_escapes() {
        let bytes = [0x01, 0x99, 0xFF, 0x01];
        let text = decode(&bytes, Render::RoundTrip);
        assert_eq!(text, "\"{0199}\"");
        assert_eq!(encode("{0199}"), bytes);
    }

    #[test]
    fn show_options_annotates_the_line() {
        let bytes = [0xFF, 0x0E, 0x00, 0x00, 0xFF, 0x01];
        let text = decode(&bytes, Render::RoundTrip);
        assert_eq!(
            text,
            "\"(*SHOW_OPTIONS,0*)\"\t// Shows options: |\"Yes\"|\"No\"|"
        );
    }

    #[test]
    fn full_width_input_folds_to_table_glyphs() {
        // Full width exclamation folds onto the plain one.
        assert_eq!(encode("\u{FF01}"), [0x00, 0x03, 0xFF, 0x01]);
        assert_eq!(encode("\u{3000}"), [0x00, 0x00, 0xFF, 0x01]);
    }

    #[test]
    fn unusable_character_is_reported() {
        let mut out = Vec::new();
        let err = encode_string(&mut out, "π", &table()).unwrap_err();
        assert!(matches!(err, TextError::Unmappable('π')));
    }

    #[test]
    fn marker_errors() {
        let mut out = Vec::new();
        assert!(matches!(
            encode_string(&mut out, "(*NO_SUCH_MARKER*)", &table()),
            Err(TextError::UnknownMarker(_))
        ));
        assert!(matches!(
            encode_string(&mut out, "(*WAIT,xyz*)", &table()),
            Err(TextError::BadMarkerParam { .. })
        ));
        assert!(matches!(
            encode_string(&mut out, "(*WAIT,3", &table()),
            Err(TextError::UnclosedMarker)
        ));
        assert!(matches!(
            encode_string(&mut out, "{12", &table()),
            Err(TextError::BadEscape(_))
        ));
    }
}
