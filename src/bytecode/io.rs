//! Scalar plumbing for readers and byte buffers.
//!
//! Operand words inside instruction cells are little endian while check
//! words and dialogue codes are big endian, so every width gets a helper
//! in both orders.

use std::io;

/// Scalar reads over any [`io::Read`].
pub trait ReadExt: io::Read {
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from(buf[0]) | (u16::from(buf[1]) << 8))
    }

    fn read_u16_be(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok((u16::from(buf[0]) << 8) | u16::from(buf[1]))
    }

    fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from(buf[0])
            | (u32::from(buf[1]) << 8)
            | (u32::from(buf[2]) << 16)
            | (u32::from(buf[3]) << 24))
    }

    fn read_u32_be(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok((u32::from(buf[0]) << 24)
            | (u32::from(buf[1]) << 16)
            | (u32::from(buf[2]) << 8)
            | u32::from(buf[3]))
    }
}

impl<R: io::Read> ReadExt for R {}

/// Scalar appends onto a byte buffer being assembled in memory.
pub trait WriteExt {
    fn push_u8(&mut self, value: u8);
    fn push_u16_le(&mut self, value: u16);
    fn push_u16_be(&mut self, value: u16);
    fn push_u32_le(&mut self, value: u32);
    fn push_u32_be(&mut self, value: u32);

    /// Appends zeros until the length is a multiple of `align`.
    fn pad_to(&mut self, align: usize);
}

impl WriteExt for Vec<u8> {
    fn push_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn push_u16_le(&mut self, value: u16) {
        self.push(value as u8);
        self.push((value >> 8) as u8);
    }

    fn push_u16_be(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn push_u32_le(&mut self, value: u32) {
        self.push(value as u8);
        self.push((value >> 8) as u8);
        self.push((value >> 16) as u8);
        self.push((value >> 24) as u8);
    }

    fn push_u32_be(&mut self, value: u32) {
        self.push((value >> 24) as u8);
        self.push((value >> 16) as u8);
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pad_to(&mut self, align: usize) {
        while self.len() % align != 0 {
            self.push(0);
        }
    }
}

/// Overwrites a little endian word inside an already assembled buffer.
/// The caller checks that `at + 4` is in bounds.
pub fn patch_u32_le(buf: &mut [u8], at: usize, value: u32) {
    buf[at] = value as u8;
    buf[at + 1] = (value >> 8) as u8;
    buf[at + 2] = (value >> 16) as u8;
    buf[at + 3] = (value >> 24) as u8;
}

/// Overwrites a little endian half word inside an assembled buffer.
pub fn patch_u16_le(buf: &mut [u8], at: usize, value: u16) {
    buf[at] = value as u8;
    buf[at + 1] = (value >> 8) as u8;
}

/// Reads a little endian word straight out of a byte slice.
pub fn word_at_le(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(
        u32::from(bytes[0])
            | (u32::from(bytes[1]) << 8)
            | (u32::from(bytes[2]) << 16)
            | (u32::from(bytes[3]) << 24),
    )
}
