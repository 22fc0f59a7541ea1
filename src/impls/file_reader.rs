/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::traits::BitRead;

/// A [`BitRead`] over a file.
///
/// The byte and bit views share one cursor: bits are served MSB-first from
/// an internal one-byte buffer, and reading a byte while that buffer is
/// partially consumed discards its remaining bits. The end-of-input
/// predicates are driven by the file length captured at open time.
#[derive(Debug)]
pub struct FileReader {
    file: BufReader<File>,
    file_name: String,
    file_len: u64,
    /// Bytes fully consumed so far, through either view.
    bytes_consumed: u64,
    buffer_byte: u8,
    /// Number of bits of `buffer_byte` already served, in `0..8`.
    bit_pos: u8,
}

impl FileReader {
    /// Open the file at `path`, capturing its base name.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "file name is not valid UTF-8")
            })?
            .to_owned();

        Ok(Self {
            file: BufReader::new(file),
            file_name,
            file_len,
            bytes_consumed: 0,
            buffer_byte: 0,
            bit_pos: 0,
        })
    }

    fn next_byte(&mut self) -> io::Result<u8> {
        let mut buffer = [0u8; 1];
        self.file.read_exact(&mut buffer)?;
        Ok(buffer[0])
    }
}

impl BitRead for FileReader {
    #[inline(always)]
    fn file_name(&self) -> &str {
        &self.file_name
    }

    #[inline(always)]
    fn has_next_byte(&self) -> bool {
        self.bytes_consumed < self.file_len
    }

    #[inline(always)]
    fn has_next_bit(&self) -> bool {
        self.bytes_consumed < self.file_len
    }

    fn read_next_byte(&mut self) -> io::Result<u8> {
        let byte = self.next_byte()?;
        self.bytes_consumed += 1;

        if self.bit_pos != 0 {
            // The partially served byte is behind the file cursor already;
            // account for it and drop its remaining bits.
            self.bytes_consumed += 1;
            self.bit_pos = 0;
            self.buffer_byte = 0;
        }

        Ok(byte)
    }

    fn read_next_bit(&mut self) -> io::Result<bool> {
        if self.bit_pos == 0 {
            self.buffer_byte = self.next_byte()?;
        }

        let bit = (self.buffer_byte >> (7 - self.bit_pos)) & 1 == 1;

        if self.bit_pos == 7 {
            self.bit_pos = 0;
            self.bytes_consumed += 1;
        } else {
            self.bit_pos += 1;
        }

        Ok(bit)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.bytes_consumed = 0;
        self.buffer_byte = 0;
        self.bit_pos = 0;
        Ok(())
    }
}
