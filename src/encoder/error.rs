use thiserror::Error;

use crate::refs::RefError;
use crate::text::TextError;

/// Errors out of the listing lexer and parser.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid token at line {}:{}", .0.line + 1, .0.col + 1)]
    LexError(lexgen_util::Loc),

    #[error("Syntax error")]
    SyntaxError,

    #[error("Fatal syntax error")]
    ParseFail,

    #[error("Fatal parse error: stack overflow")]
    ParseStackOverflow,
}

/// Errors raised while assembling a parsed listing over the bytes of
/// the original file.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("'{0}' is not an instruction")]
    UnknownMnemonic(String),

    #[error("bad operands for '{name}': expected {expected}")]
    BadOperands { name: String, expected: &'static str },

    #[error("'{name}' is not a known {table} name")]
    UnknownTableName { table: &'static str, name: String },

    #[error("talk slot {0} does not exist")]
    TalkSlot(i64),

    #[error("the {section} section lists {listed} rows but the original holds {expected}")]
    TriggerCount {
        section: &'static str,
        listed: usize,
        expected: usize,
    },

    #[error("trigger coordinates ({x},{y}) do not fit in a byte")]
    TriggerRange { x: i64, y: i64 },

    #[error("header patch at {0:#x} falls outside the copied bytes")]
    PatchOutOfRange(usize),

    #[error("the original file is too short to carry a header")]
    ShortOriginal,

    #[error("entry address {0:#x} lies beyond the end of the original file")]
    EntryBeyondFile(u32),

    #[error("no entry address: the header slot is vacant and the listing has no addr line")]
    NoEntry,

    #[error("labels referenced but never defined: {}", .0.join(", "))]
    UndefinedLabels(Vec<String>),

    #[error("text ids referenced but never listed: {0:?}")]
    UndefinedTexts(Vec<usize>),

    #[error("{0}")]
    Ref(#[from] RefError),

    #[error("{0}")]
    Text(#[from] TextError),
}

/// Either half of the encode pipeline failing.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0}")]
    Listing(#[from] ListingError),

    #[error("{0}")]
    Emit(#[from] EmitError),
}
