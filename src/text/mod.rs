//! Dialogue strings: the half word code stream and its text surface.

pub mod codec;
pub mod list;

pub use codec::{decode_string, encode_string, Render, TextError};
pub use list::{TextEntry, TextList};
