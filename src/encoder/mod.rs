//! Turns an edited listing back into an event file.
//!
//! The listing grammar is lexed and parsed with the same machinery as
//! any other little language: [`lexer`] tokenizes the section rows,
//! [`parser`] collects them into a [`ParseContext`], and [`emitter`]
//! assembles that over the bytes of the original file. The original is
//! required because a listing only carries what is editable; everything
//! else is copied through.

mod ast;
mod emitter;
pub mod error;
mod frontend;
mod lexer;
mod parser;

pub use ast::{Arg, Stmt, TalkRow, TextRow, TriggerRow};

pub use lexer::Lexer;

pub use parser::ParseContext;
pub use parser::Parser;

pub use emitter::assemble;

pub use error::{EmitError, EncodeError, ListingError};

pub use frontend::parse_listing;

use crate::bytecode::Region;
use crate::chartable::CharTable;

/// Encodes `listing` over `original`. Returns `None` when the listing
/// is the `EMPTY` placeholder, which stands for a file with no flow
/// script and nothing to write back.
pub fn encode(
    listing: &str,
    original: &[u8],
    region: Region,
    table: &CharTable,
) -> Result<Option<Vec<u8>>, EncodeError> {
    let ctx = parse_listing(listing)?;
    if ctx.empty {
        return Ok(None);
    }
    Ok(Some(assemble(ctx, original, region, table)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::io::{patch_u32_le, word_at_le};
    use crate::bytecode::{Region, SECTOR_SIZE};
    use crate::chartable::CharTable;

    fn table() -> CharTable {
        CharTable::parse("0000= \n0041\n000C=B\n0020=i\n0023=y\n0018=e\n").unwrap()
    }

    /// An original whose header carries the usual table pointers and an
    /// entry address of 0xc00.
    fn original() -> Vec<u8> {
        let mut data = vec![0u8; 0x1000];
        patch_u32_le(&mut data, 0x34, 0xd00);
        patch_u32_le(&mut data, 0x38, 0x200);
        patch_u32_le(&mut data, 0x48, 0x204);
        patch_u32_le(&mut data, 0x64, 0xc00);
        data
    }

    #[test]
    fn empty_listing_encodes_to_nothing() {
        let out = encode("EMPTY\n", &original(), Region::Us, &table()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn code_lands_at_the_original_entry() {
        let listing = "addr\t0x00000000\n\n\
                       section\t.bgm\n\t0x17\n\t0x00\n\n\
                       section\t.talk\n\n\
                       section\t.talk2\n\n\
                       section\t.positions\n\n\
                       section\t.interactables\n\n\
                       section\t.code\n\
                       \tret\n";
        let out = encode(listing, &original(), Region::Us, &table())
            .unwrap()
            .unwrap();
        // The addr line loses to the header entry slot.
        assert_eq!(&out[0xc00..0xc04], [0xff, 0x21, 0x00, 0x00]);
        assert_eq!(&out[0x02..0x06], [0x17, 0x00, 0x00, 0x00]);
        assert_eq!(out.len() % SECTOR_SIZE, 0);
    }

    #[test]
    fn strings_and_table_follow_the_code() {
        let listing = "addr\t0x00000000\n\n\
                       section\t.bgm\n\t0x00\n\n\
                       section\t.talk\n\n\
                       section\t.talk2\n\n\
                       section\t.positions\n\n\
                       section\t.interactables\n\n\
                       section\t.code\n\
                       \tld_text\t0\n\
                       \tret\n\n\
                       section\t.text\t0x1\n\
                       \t000:\"Bye\"\n";
        let out = encode(listing, &original(), Region::Us, &table())
            .unwrap()
            .unwrap();
        // ld_text at 0xc00 holds the address of the string, which
        // lands 8-aligned after the ret.
        let string_addr = word_at_le(&out, 0xc04).unwrap();
        assert_eq!(string_addr, 0xc10);
        assert_eq!(&out[0xc10..0xc18], [0x00, 0x0c, 0x00, 0x23, 0x00, 0x18, 0xff, 0x01]);
        // The text table goes last and the header points at it.
        let table_addr = word_at_le(&out, 0x34).unwrap();
        assert_eq!(word_at_le(&out, table_addr as usize), Some(1));
        assert_eq!(word_at_le(&out, table_addr as usize + 4), Some(string_addr));
    }
}
