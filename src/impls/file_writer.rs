/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::traits::BitWrite;

/// A [`BitWrite`] creating files under a directory fixed at construction.
///
/// Bits accumulate MSB-first in a one-byte buffer that is written out when
/// full; [`flush`](BitWrite::flush) emits a partially filled buffer padded
/// with zeros on the right.
#[derive(Debug)]
pub struct FileWriter {
    directory: PathBuf,
    file: Option<BufWriter<File>>,
    buffer_byte: u8,
    /// Number of bits currently held in `buffer_byte`, in `0..8`.
    bit_pos: u8,
}

impl FileWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            file: None,
            buffer_byte: 0,
            bit_pos: 0,
        }
    }

    fn current(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no open file"))
    }
}

impl BitWrite for FileWriter {
    fn open_file(&mut self, name: &str) -> io::Result<()> {
        debug_assert!(self.file.is_none(), "previous file was not closed");
        let file = File::create(self.directory.join(name))?;
        self.file = Some(BufWriter::new(file));
        self.buffer_byte = 0;
        self.bit_pos = 0;
        Ok(())
    }

    fn close_file(&mut self) -> io::Result<()> {
        if self.file.is_some() {
            self.flush()?;
        }
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.current()?.write_all(&[byte])
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
