use pomelo::pomelo;

use super::ast::{Arg, Stmt, TalkRow, TextRow, TriggerRow};
use super::error::ListingError;

/// Everything a listing declares, collected section by section while
/// the parser runs. The emitter turns this into bytes.
#[derive(Debug)]
pub struct ParseContext {
    /// The listing is the `EMPTY` placeholder file.
    pub empty: bool,

    /// The `addr` line. Only consulted when the original header has no
    /// entry address of its own.
    pub entry: Option<u32>,

    pub songs: Vec<u16>,
    pub talks: Vec<TalkRow>,
    pub talks2: Vec<TalkRow>,
    pub positions: Vec<TriggerRow>,
    pub interactables: Vec<TriggerRow>,
    pub code: Vec<Stmt>,

    /// The string count on the `section .text` line.
    pub declared_texts: Option<u32>,
    pub texts: Vec<TextRow>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self {
            empty: false,
            entry: None,
            songs: Vec::new(),
            talks: Vec::new(),
            talks2: Vec::new(),
            positions: Vec::new(),
            interactables: Vec::new(),
            code: Vec::new(),
            declared_texts: None,
            texts: Vec::new(),
        }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

pomelo! {
    %include { use super::*; }

    %extra_argument ParseContext;

    // token types

    %type Name String;
    %type Int i64;
    %type Hex u32;
    %type Str String;
    %type Movie u8;
    %type Blob Vec<u32>;

    // errors

    %error ListingError;

    %syntax_error { Err(ListingError::SyntaxError) }

    %parse_fail { ListingError::ParseFail }
    %stack_overflow { ListingError::ParseStackOverflow }

    // grammar

    file ::= opt_breaks KwEmpty breaks { extra.empty = true; };
    file ::= opt_breaks header sections;

    breaks ::= Break;
    breaks ::= breaks Break;

    opt_breaks ::= ;
    opt_breaks ::= breaks;

    header ::= KwAddr Hex(a) breaks { extra.entry = Some(a); };

    sections ::= bgm talk talk2 positions interactables code opt_text;

    bgm ::= KwSection SecBgm breaks bgm_rows;
    bgm_rows ::= bgm_row;
    bgm_rows ::= bgm_rows bgm_row;
    bgm_row ::= Hex(id) breaks { extra.songs.push(id as u16); };

    talk ::= KwSection SecTalk breaks talk_rows;
    talk_rows ::= ;
    talk_rows ::= talk_rows talk_row;
    talk_row ::= Int(slot) talk_half(first) Comma talk_half(second) breaks {
        extra.talks.push(TalkRow { slot, first, second });
    };

    talk2 ::= KwSection SecTalk2 breaks talk2_rows;
    talk2_rows ::= ;
    talk2_rows ::= talk2_rows talk2_row;
    talk2_row ::= Int(slot) talk_half(first) Comma talk_half(second) breaks {
        extra.talks2.push(TalkRow { slot, first, second });
    };

    %type talk_half Option<String>;
    talk_half ::= Name(n) { if n == "_" { None } else { Some(n) } };

    positions ::= KwSection SecPositions breaks position_rows;
    position_rows ::= ;
    position_rows ::= position_rows position_row;
    position_row ::= Int(x) Int(y) Name(label) breaks {
        extra.positions.push(TriggerRow { x, y, label });
    };

    interactables ::= KwSection SecInteractables breaks interactable_rows;
    interactable_rows ::= ;
    interactable_rows ::= interactable_rows interactable_row;
    interactable_row ::= Int(x) Int(y) Name(label) breaks {
        extra.interactables.push(TriggerRow { x, y, label });
    };

    code ::= KwSection SecCode breaks stmts;
    stmts ::= ;
    stmts ::= stmts stmt;

    stmt ::= Name(n) Colon breaks { extra.code.push(Stmt::Label(n)); };
    stmt ::= Name(n) breaks { extra.code.push(Stmt::Ins { name: n, args: Vec::new() }); };
    stmt ::= Name(n) args(a) breaks { extra.code.push(Stmt::Ins { name: n, args: a }); };
    stmt ::= Blob(words) breaks { extra.code.push(Stmt::Opaque(words)); };

    %type args Vec<Arg>;
    args ::= arg(a) { vec![a] };
    args ::= args(mut v) Comma arg(a) { v.push(a); v };

    %type arg Arg;
    arg ::= Hex(h) { Arg::Hex(h) };
    arg ::= Int(i) { Arg::Int(i) };
    arg ::= Name(n) { Arg::Name(n) };
    arg ::= Movie(m) { Arg::Movie(m) };

    opt_text ::= ;
    opt_text ::= text;

    text ::= KwSection SecText Hex(count) breaks text_rows { extra.declared_texts = Some(count); };
    text_rows ::= ;
    text_rows ::= text_rows text_row;
    text_row ::= Int(index) Colon Str(content) breaks {
        extra.texts.push(TextRow { index, content });
    };
}

pub use parser::*;
