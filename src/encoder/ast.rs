//! What a parsed listing is made of, one level above the token stream.

/// One line of the `.code` section.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `NAME:` on a line of its own. Defines `NAME` at the next
    /// 8-aligned position of the output.
    Label(String),

    /// An instruction line, mnemonic first.
    Ins { name: String, args: Vec<Arg> },

    /// An `unknown|...` line carrying raw words, marker included.
    Opaque(Vec<u32>),
}

/// A single instruction operand.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A `0x` literal.
    Hex(u32),

    /// A signed decimal literal.
    Int(i64),

    /// A bare name: a label, or an enum operand like `still` or `ADD`.
    Name(String),

    /// The file number out of an `MVxx.pmf` movie name.
    Movie(u8),
}

/// One `.talk` or `.talk2` row. A `None` half was `_` in the listing
/// and keeps whatever address the original header holds there.
#[derive(Debug, Clone)]
pub struct TalkRow {
    pub slot: i64,
    pub first: Option<String>,
    pub second: Option<String>,
}

/// One `.positions` or `.interactables` row.
#[derive(Debug, Clone)]
pub struct TriggerRow {
    pub x: i64,
    pub y: i64,
    pub label: String,
}

/// One `.text` row: the listed index and the quoted content.
#[derive(Debug, Clone)]
pub struct TextRow {
    pub index: i64,
    pub content: String,
}
