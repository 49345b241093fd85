//! The custom text encoding table.
//!
//! Dialogue is not ASCII; every printable glyph is a half word looked up
//! in a table file of `XXXX=glyph` lines. `#` starts a comment, which
//! forces two escapes: a line `0041` with no value means `=` and a line
//! `0054` with no value means `#`, since neither glyph can appear to the
//! right of the separator.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("bad glyph code {code:?} on table line {line}")]
    BadCode { code: String, line: usize },
}

/// Two way map between glyph codes and the text they stand for.
#[derive(Debug, Default)]
pub struct CharTable {
    by_code: HashMap<u16, String>,
    by_text: HashMap<String, u16>,
}

impl CharTable {
    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(src: &str) -> Result<Self, TableError> {
        let mut table = CharTable::default();
        for (number, raw) in src.lines().enumerate() {
            let line = strip_comment(raw);
            if line.is_empty() {
                continue;
            }

            let (code_part, value) = match line.split_once('=') {
                Some((code_part, value)) => (code_part, Some(value)),
                None => (line, None),
            };
            let code = u16::from_str_radix(code_part, 16).map_err(|_| TableError::BadCode {
                code: code_part.to_string(),
                line: number + 1,
            })?;

            let text = match value {
                // A blank value is kept verbatim so a glyph can map to a
                // space; anything else sheds the surrounding whitespace.
                Some(value) if value.trim().is_empty() => value.to_string(),
                Some(value) => value.trim().to_string(),
                None if code == 0x41 => "=".to_string(),
                None if code == 0x54 => "#".to_string(),
                None => continue,
            };

            table.by_code.insert(code, text.clone());
            // The first line naming a glyph wins the reverse direction.
            table.by_text.entry(text).or_insert(code);
        }
        Ok(table)
    }

    /// Text a glyph code prints as.
    pub fn text_for(&self, code: u16) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    /// Glyph code printing exactly `text`.
    pub fn code_for(&self, text: &str) -> Option<u16> {
        self.by_text.get(text).copied()
    }

    /// Glyph code for a single character.
    pub fn code_for_char(&self, c: char) -> Option<u16> {
        let mut buf = [0u8; 4];
        self.code_for(c.encode_utf8(&mut buf))
    }
}

/// Cuts a table line down to its content: a line opening with `#` is all
/// comment, otherwise everything from the first interior `#` on goes.
fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    match line.find('#') {
        Some(at) => &line[..at],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_comments() {
        let table = CharTable::parse(
            "# glyph table\n0000= \n0001=A\n001B=a  # lower case zone\n\n0035=0\n",
        )
        .unwrap();
        assert_eq!(table.text_for(0x0001), Some("A"));
        assert_eq!(table.text_for(0x001B), Some("a"));
        assert_eq!(table.text_for(0x0035), Some("0"));
        assert_eq!(table.code_for("A"), Some(0x0001));
    }

    #[test]
    fn blank_value_keeps_the_space() {
        let table = CharTable::parse("0000= \n").unwrap();
        assert_eq!(table.text_for(0x0000), Some(" "));
        assert_eq!(table.code_for_char(' '), Some(0x0000));
    }

    #[test]
    fn separator_and_comment_glyphs_use_bare_lines() {
        let table = CharTable::parse("0041\n0054\n").unwrap();
        assert_eq!(table.text_for(0x0041), Some("="));
        assert_eq!(table.text_for(0x0054), Some("#"));
        assert_eq!(table.code_for_char('='), Some(0x0041));
        assert_eq!(table.code_for_char('#'), Some(0x0054));
    }

    #[test]
    fn first_line_wins_the_reverse_lookup() {
        let table = CharTable::parse("0010=~\n0020=~\n").unwrap();
        assert_eq!(table.text_for(0x0010), Some("~"));
        assert_eq!(table.text_for(0x0020), Some("~"));
        assert_eq!(table.code_for("~"), Some(0x0010));
    }

    #[test]
    fn bad_code_reports_the_line() {
        let err = CharTable::parse("0001=A\nzz=B\n").unwrap_err();
        match err {
            TableError::BadCode { code, line } => {
                assert_eq!(code, "zz");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
