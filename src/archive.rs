/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The archive drivers: compression and decompression of whole archives.

An archive is a continuous MSB-first bit stream made of one self-describing
section per input file, with no padding between sections; only the very
last byte is zero-padded on the right. Each section carries, in 9-bit
header words, the number of coded symbols, the symbols themselves in
canonical order, and the count of symbols per code length starting from
length 1; then the coded file name terminated by
[`FILE_NAME_END`](crate::codes::FILE_NAME_END), and the coded payload
terminated by [`ONE_MORE_FILE`](crate::codes::ONE_MORE_FILE) or, for the
last section, [`ARCHIVE_END`](crate::codes::ARCHIVE_END).

[`compress`] consumes each input twice: a first pass tabulates the symbol
frequencies, and after a [reset](crate::traits::BitRead::reset) a second
pass emits the coded payload. [`decompress`] rebuilds the canonical code
trie of each section from its header and decodes one symbol at a time by
walking the trie. Both close the output writer on success and on failure.

*/

use log::debug;

use crate::codes::huffman::{build_codes, limit_lengths, to_canonical, SymbolWithCode};
use crate::codes::{
    Symbol, ALPHABET_LEN, ARCHIVE_END, FILE_NAME_END, HEADER_WORD_BITS, HuffmanCode, ONE_MORE_FILE,
};
use crate::error::{Error, Result};
use crate::traits::{BitRead, BitWrite};
use crate::trie::BinaryTrie;

/// Compress `inputs`, in order, into a single archive named `archive_name`
/// under the writer's directory.
pub fn compress<R: BitRead, W: BitWrite>(
    inputs: Vec<R>,
    writer: &mut W,
    archive_name: &str,
) -> Result<()> {
    writer.open_file(archive_name)?;

    let count = inputs.len();
    let mut outcome = Ok(());

    // Each input is consumed exhaustively and dropped before the next one.
    for (index, mut reader) in inputs.into_iter().enumerate() {
        outcome = append_file(&mut reader, writer, index + 1 == count);
        if outcome.is_err() {
            break;
        }
    }

    release(writer, outcome)
}

/// Decompress the archive presented by `reader`, recreating each archived
/// file under the writer's directory.
pub fn decompress<R: BitRead, W: BitWrite>(reader: &mut R, writer: &mut W) -> Result<()> {
    let outcome = loop {
        let trie = match restore_trie(reader) {
            Ok(trie) => trie,
            Err(e) => break Err(e),
        };
        match extract_file(reader, writer, &trie) {
            Ok(true) => {}
            Ok(false) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    release(writer, outcome)
}

/// Close the writer whatever the outcome was; a close failure surfaces
/// only if the run itself succeeded.
fn release<W: BitWrite>(writer: &mut W, outcome: Result<()>) -> Result<()> {
    let closed = writer.close_file();
    outcome?;
    closed?;
    Ok(())
}

/// Encode one input as an archive section: tabulate, build, canonicalise,
/// then emit header, name, payload, and terminator.
fn append_file<R: BitRead, W: BitWrite>(
    reader: &mut R,
    writer: &mut W,
    is_last: bool,
) -> Result<()> {
    let frequencies = count_frequencies(reader)?;

    let mut codes = build_codes(&frequencies);
    limit_lengths(&mut codes);
    let canonical = to_canonical(&mut codes);

    write_header(writer, &canonical)?;

    let name = reader.file_name().to_owned();
    for byte in name.bytes() {
        write_code(writer, codes[byte as usize])?;
    }
    write_code(writer, codes[FILE_NAME_END as usize])?;

    reader.reset()?;
    let mut payload_len = 0u64;
    while reader.has_next_byte() {
        let byte = reader.read_next_byte()?;
        write_code(writer, codes[byte as usize])?;
        payload_len += 1;
    }

    let terminator = if is_last { ARCHIVE_END } else { ONE_MORE_FILE };
    write_code(writer, codes[terminator as usize])?;

    debug!("archived {} ({} bytes, {} coded symbols)", name, payload_len, canonical.len());
    Ok(())
}

/// Tabulate the symbol frequencies of one input: its name bytes, its
/// payload bytes, and one occurrence of each control symbol. Leaves the
/// reader consumed.
fn count_frequencies<R: BitRead>(reader: &mut R) -> Result<[u64; ALPHABET_LEN]> {
    let mut frequencies = [0u64; ALPHABET_LEN];

    frequencies[FILE_NAME_END as usize] = 1;
    frequencies[ONE_MORE_FILE as usize] = 1;
    frequencies[ARCHIVE_END as usize] = 1;

    for byte in reader.file_name().to_owned().bytes() {
        frequencies[byte as usize] += 1;
    }

    while reader.has_next_byte() {
        frequencies[reader.read_next_byte()? as usize] += 1;
    }

    Ok(frequencies)
}

/// Emit the section header: `|S|`, the symbols in canonical order, and the
/// per-length symbol counts for lengths 1, 2, …, all as 9-bit words.
fn write_header<W: BitWrite>(writer: &mut W, canonical: &[SymbolWithCode]) -> Result<()> {
    writer.write_bits(canonical.len() as u64, HEADER_WORD_BITS)?;

    for entry in canonical {
        writer.write_bits(entry.symbol as u64, HEADER_WORD_BITS)?;
    }

    // Counts per length; stepping over unused lengths emits a zero count.
    let mut length_cursor = 1u8;
    let mut run = 0u64;

    for entry in canonical {
        while entry.code.len > length_cursor {
            writer.write_bits(run, HEADER_WORD_BITS)?;
            run = 0;
            length_cursor += 1;
        }
        run += 1;
    }

    if run > 0 {
        writer.write_bits(run, HEADER_WORD_BITS)?;
    }

    Ok(())
}

fn write_code<W: BitWrite>(writer: &mut W, code: HuffmanCode) -> Result<()> {
    debug_assert!(code.len > 0, "symbol has no code");
    writer.write_bits(code.code as u64, code.len as usize)?;
    Ok(())
}

/// Read one 9-bit MSB-first header word.
fn read_header_word<R: BitRead>(reader: &mut R) -> Result<u16> {
    let mut word = 0u16;

    for _ in 0..HEADER_WORD_BITS {
        if !reader.has_next_bit() {
            return Err(Error::InvalidFormat("bit stream ended inside a header field"));
        }
        word = (word << 1) | reader.read_next_bit()? as u16;
    }

    Ok(word)
}

/// Rebuild the canonical code trie from a section header.
fn restore_trie<R: BitRead>(reader: &mut R) -> Result<BinaryTrie<Symbol>> {
    let symbol_count = read_header_word(reader)? as usize;

    let mut alphabet = Vec::with_capacity(symbol_count);
    for _ in 0..symbol_count {
        let symbol = read_header_word(reader)?;
        if symbol as usize >= ALPHABET_LEN {
            return Err(Error::InvalidFormat("symbol identifier out of range"));
        }
        alphabet.push(symbol);
    }

    let mut trie = BinaryTrie::default();
    let mut len = 1usize;
    let mut code = 0u64;
    let mut restored = 0usize;

    while restored < symbol_count {
        if len > HEADER_WORD_BITS {
            return Err(Error::InvalidFormat("code length above the 9-bit limit"));
        }

        let count = read_header_word(reader)?;
        for _ in 0..count {
            if restored == symbol_count {
                return Err(Error::InvalidFormat("length counts exceed the symbol count"));
            }
            if code >> len != 0 {
                return Err(Error::InvalidFormat("too many codes for their length"));
            }

            let path = HuffmanCode {
                code: code as u16,
                len: len as u8,
            }
            .to_path();
            trie.insert(alphabet[restored], path);

            code += 1;
            restored += 1;
        }

        code <<= 1;
        len += 1;
    }

    Ok(trie)
}

/// Decode one file section past its header. Returns true when the section
/// was terminated by [`ONE_MORE_FILE`], false on [`ARCHIVE_END`].
fn extract_file<R: BitRead, W: BitWrite>(
    reader: &mut R,
    writer: &mut W,
    trie: &BinaryTrie<Symbol>,
) -> Result<bool> {
    let mut name_bytes = Vec::new();

    loop {
        match read_symbol(reader, trie)? {
            FILE_NAME_END => break,
            symbol if symbol < 256 => name_bytes.push(symbol as u8),
            _ => return Err(Error::InvalidFormat("unexpected control symbol in a file name")),
        }
    }

    let name = String::from_utf8(name_bytes)
        .map_err(|_| Error::InvalidFormat("file name is not valid UTF-8"))?;
    writer.open_file(&name)?;

    let mut payload_len = 0u64;
    let more = loop {
        match read_symbol(reader, trie)? {
            ONE_MORE_FILE => break true,
            ARCHIVE_END => break false,
            symbol if symbol < 256 => {
                writer.write_byte(symbol as u8)?;
                payload_len += 1;
            }
            _ => return Err(Error::InvalidFormat("unexpected control symbol in a payload")),
        }
    };

    writer.close_file()?;
    debug!("restored {} ({} bytes)", name, payload_len);
    Ok(more)
}

/// Decode one symbol by walking the trie: left on 0, right on 1, until a
/// valued node is reached.
fn read_symbol<R: BitRead>(reader: &mut R, trie: &BinaryTrie<Symbol>) -> Result<Symbol> {
    let mut traverser = trie.traverser();

    loop {
        if let Some(&symbol) = traverser.value() {
            return Ok(symbol);
        }

        if !reader.has_next_bit() {
            return Err(Error::InvalidFormat("bit stream ended inside a code"));
        }

        if reader.read_next_bit()? {
            if !traverser.can_go_right() {
                return Err(Error::CorruptTrie("code requires a missing right branch"));
            }
            traverser.go_right();
        } else {
            if !traverser.can_go_left() {
                return Err(Error::CorruptTrie("code requires a missing left branch"));
            }
            traverser.go_left();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::impls::{MemReader, MemWriter};

    fn pack(inputs: &[(&str, &[u8])]) -> Vec<u8> {
        let readers: Vec<MemReader> = inputs
            .iter()
            .map(|(name, data)| MemReader::new(*name, *data))
            .collect();

        let mut writer = MemWriter::new();
        compress(readers, &mut writer, "archive").unwrap();

        let mut files = writer.into_files();
        assert_eq!(files.len(), 1);
        files.pop().unwrap().1
    }

    fn unpack(archive: Vec<u8>) -> Result<Vec<(String, Vec<u8>)>> {
        let mut reader = MemReader::new("archive", archive);
        let mut writer = MemWriter::new();
        decompress(&mut reader, &mut writer)?;
        Ok(writer.into_files())
    }

    #[test]
    fn test_round_trip() {
        let inputs: &[(&str, &[u8])] = &[
            ("a.txt", b"the quick brown fox jumps over the lazy dog"),
            ("b.bin", &[0, 1, 2, 3, 254, 255]),
            ("empty", b""),
        ];

        let restored = unpack(pack(inputs)).unwrap();

        assert_eq!(restored.len(), inputs.len());
        for ((name, data), (input_name, input_data)) in restored.iter().zip(inputs) {
            assert_eq!(name, input_name);
            assert_eq!(data, input_data);
        }
    }

    #[test]
    fn test_deterministic_archive() {
        let inputs: &[(&str, &[u8])] = &[("x", b"abracadabra"), ("y", b"mississippi")];
        assert_eq!(pack(inputs), pack(inputs));
    }

    #[test]
    fn test_truncated_header() {
        let archive = pack(&[("f", b"payload")]);

        // Cutting the stream anywhere must yield InvalidFormat, not a panic.
        for keep in 0..archive.len() - 1 {
            let result = unpack(archive[..keep].to_vec());
            assert!(
                matches!(result, Err(Error::InvalidFormat(_))),
                "truncation to {} bytes was not detected",
                keep
            );
        }
    }

    #[test]
    fn test_out_of_range_symbol() {
        // |S| = 1, then the symbol 0b111111111 = 511.
        let mut writer = MemWriter::new();
        writer.open_file("bad").unwrap();
        writer.write_bits(1, HEADER_WORD_BITS).unwrap();
        writer.write_bits(511, HEADER_WORD_BITS).unwrap();
        writer.close_file().unwrap();
        let archive = writer.into_files().pop().unwrap().1;

        let result = unpack(archive);
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }
}
