/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io;

use crate::traits::{BitRead, BitWrite};

/// A [`BitRead`](crate::traits::BitRead) over an owned byte buffer, with
/// the same byte/bit cursor semantics as
/// [`FileReader`](crate::impls::FileReader).
#[derive(Debug, Clone)]
pub struct MemReader {
    name: String,
    data: Vec<u8>,
    /// Index of the first unconsumed byte.
    pos: usize,
    /// Number of bits of `data[pos]` already served, in `0..8`.
    bit_pos: u8,
}

impl MemReader {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            pos: 0,
            bit_pos: 0,
        }
    }

    fn eof() -> io::Error {
        io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected end of buffer")
    }
}

impl BitRead for MemReader {
    #[inline(always)]
    fn file_name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn has_next_byte(&self) -> bool {
        self.pos < self.data.len()
    }

    #[inline(always)]
    fn has_next_bit(&self) -> bool {
        self.pos < self.data.len()
    }

    fn read_next_byte(&mut self) -> io::Result<u8> {
        if self.bit_pos != 0 {
            // Discard the rest of the partially served byte.
            self.pos += 1;
            self.bit_pos = 0;
        }

        let byte = *self.data.get(self.pos).ok_or_else(Self::eof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_next_bit(&mut self) -> io::Result<bool> {
        let byte = *self.data.get(self.pos).ok_or_else(Self::eof)?;
        let bit = (byte >> (7 - self.bit_pos)) & 1 == 1;

        if self.bit_pos == 7 {
            self.bit_pos = 0;
            self.pos += 1;
        } else {
            self.bit_pos += 1;
        }

        Ok(bit)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.pos = 0;
        self.bit_pos = 0;
        Ok(())
    }
}

/// A [`BitWrite`](crate::traits::BitWrite) collecting each opened file as a
/// `(name, bytes)` pair.
#[derive(Debug, Default)]
pub struct MemWriter {
    files: Vec<(String, Vec<u8>)>,
    open: bool,
    buffer_byte: u8,
    bit_pos: u8,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The files written so far, in open order.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    pub fn into_files(self) -> Vec<(String, Vec<u8>)> {
        self.files
    }

    fn current(&mut self) -> io::Result<&mut Vec<u8>> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "no open file"));
        }
        Ok(&mut self.files.last_mut().expect("open implies a last file").1)
    }
}

impl BitWrite for MemWriter {
    fn open_file(&mut self, name: &str) -> io::Result<()> {
        debug_assert!(!self.open, "previous file was not closed");
        self.files.push((name.to_owned(), Vec::new()));
        self.open = true;
        self.buffer_byte = 0;
        self.bit_pos = 0;
        Ok(())
    }

    fn close_file(&mut self) -> io::Result<()> {
        if self.open {
            self.flush()?;
        }
        self.open = false;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.current()?.push(byte);
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.buffer_byte |= 1 << (7 - self.bit_pos);
        }

        self.bit_pos += 1;

        if self.bit_pos == 8 {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.bit_pos != 0 {
            let byte = self.buffer_byte;
            self.buffer_byte = 0;
            self.bit_pos = 0;
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mem_reader_cursor() {
        let mut reader = MemReader::new("mem", vec![0b1100_0000, 0x17]);
        assert_eq!(reader.file_name(), "mem");

        assert!(reader.read_next_bit().unwrap());
        assert!(reader.read_next_bit().unwrap());
        // Mid-byte byte read skips to the next byte.
        assert_eq!(reader.read_next_byte().unwrap(), 0x17);
        assert!(!reader.has_next_byte());
        assert!(reader.read_next_byte().is_err());

        reader.reset().unwrap();
        assert_eq!(reader.read_next_byte().unwrap(), 0b1100_0000);
        assert_eq!(reader.read_next_byte().unwrap(), 0x17);
    }

    #[test]
    fn test_mem_writer_collects_files() {
        let mut writer = MemWriter::new();

        writer.open_file("first").unwrap();
        writer.write_bits(0b101, 3).unwrap();
        writer.close_file().unwrap();

        writer.open_file("second").unwrap();
        writer.write_byte(0x42).unwrap();
        writer.close_file().unwrap();

        let files = writer.into_files();
        assert_eq!(
            files,
            vec![
                ("first".to_owned(), vec![0b1010_0000]),
                ("second".to_owned(), vec![0x42]),
            ]
        );
    }

    #[test]
    fn test_round_trip_bits() {
        let mut writer = MemWriter::new();
        writer.open_file("bits").unwrap();
        for i in 0..27 {
            writer.write_bit(i % 3 == 0).unwrap();
        }
        writer.close_file().unwrap();

        let (_, data) = writer.into_files().pop().unwrap();
        let mut reader = MemReader::new("bits", data);
        for i in 0..27 {
            assert_eq!(reader.read_next_bit().unwrap(), i % 3 == 0);
        }
        // The padding bits are zero.
        for _ in 27..32 {
            assert!(!reader.read_next_bit().unwrap());
        }
        assert!(!reader.has_next_bit());
    }
}
