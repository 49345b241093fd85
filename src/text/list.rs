//! The per file list of dialogue strings.
//!
//! Builds with a relocated table point at the strings: a count word then
//! one address word per string, all little endian. Scripts may also
//! reference strings the table missed; those get appended as they are
//! discovered so every `ld_text` operand resolves to an index.

use std::io::{self, Cursor};

use crate::bytecode::io::ReadExt;
use crate::chartable::CharTable;

use super::codec::{self, Render};

/// One dialogue string and the address its codes start at.
#[derive(Debug, Clone)]
pub struct TextEntry {
    pub address: u32,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct TextList {
    entries: Vec<TextEntry>,
}

impl TextList {
    /// Reads the table at `table_addr` and decodes every string it
    /// points at. The cursor position is restored afterwards.
    pub fn read(
        cur: &mut Cursor<&[u8]>,
        table_addr: u32,
        table: &CharTable,
        mode: Render,
    ) -> io::Result<TextList> {
        let backup = cur.position();
        cur.set_position(table_addr.into());

        let count = cur.read_u32_le()?;
        let mut addresses = Vec::new();
        for _ in 0..count {
            addresses.push(cur.read_u32_le()?);
        }

        let mut list = TextList::default();
        for address in addresses {
            let content = codec::decode_string(cur, address, table, mode)?;
            list.entries.push(TextEntry { address, content });
        }

        cur.set_position(backup);
        Ok(list)
    }

    /// Decodes the string at `address` and appends it, returning its
    /// index. Used for strings scripts reference past the table.
    pub fn append(
        &mut self,
        cur: &mut Cursor<&[u8]>,
        address: u32,
        table: &CharTable,
        mode: Render,
    ) -> io::Result<usize> {
        let content = codec::decode_string(cur, address, table, mode)?;
        self.entries.push(TextEntry { address, content });
        Ok(self.entries.len() - 1)
    }

    /// Index of the entry whose codes start at `address`.
    pub fn index_of(&self, address: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.address == address)
    }

    /// Address of the first listed string, the floor of the data area.
    pub fn first_address(&self) -> Option<u32> {
        self.entries.first().map(|e| e.address)
    }

    pub fn entries(&self) -> &[TextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_table_and_appends_orphans() {
        let table = CharTable::parse("0001=A\n0002=B\n0003=C\n").unwrap();

        // Two strings at 0x10 and 0x18, an unlisted one at 0x20, and the
        // relocated table at 0x28.
        let mut data = vec![0u8; 0x34];
        data[0x10..0x14].copy_from_slice(&[0x00, 0x01, 0xFF, 0x01]);
        data[0x18..0x1C].copy_from_slice(&[0x00, 0x02, 0xFF, 0x01]);
        data[0x20..0x24].copy_from_slice(&[0x00, 0x03, 0xFF, 0x01]);
        data[0x28..0x2C].copy_from_slice(&[0x02, 0x00, 0x00, 0x00]);
        data[0x2C..0x30].copy_from_slice(&[0x10, 0x00, 0x00, 0x00]);
        data[0x30..0x34].copy_from_slice(&[0x18, 0x00, 0x00, 0x00]);

        let mut cur = Cursor::new(&data[..]);
        cur.set_position(0x4);
        let mut list = TextList::read(&mut cur, 0x28, &table, Render::RoundTrip).unwrap();
        assert_eq!(cur.position(), 0x4);

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].content, "\"A\"");
        assert_eq!(list.entries()[1].content, "\"B\"");
        assert_eq!(list.first_address(), Some(0x10));
        assert_eq!(list.index_of(0x18), Some(1));
        assert_eq!(list.index_of(0x20), None);

        let idx = list
            .append(&mut cur, 0x20, &table, Render::RoundTrip)
            .unwrap();
        assert_eq!(idx, 2);
        assert_eq!(list.entries()[2].content, "\"C\"");
        assert_eq!(list.index_of(0x20), Some(2));
    }

    #[test]
    fn empty_table_reads_empty() {
        let table = CharTable::parse("0001=A\n").unwrap();
        let data = [0u8; 8];
        let mut cur = Cursor::new(&data[..]);
        let list = TextList::read(&mut cur, 0, &table, Render::RoundTrip).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.first_address(), None);
    }
}
