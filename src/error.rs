/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The error type shared by the archive codec.

use core::fmt::{Display, Formatter};

/// Convenience alias used throughout the codec.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while encoding or decoding an archive.
///
/// All format checks performed by the decoder report either
/// [`InvalidFormat`](Error::InvalidFormat) (the bit stream ended inside a
/// field, or a field holds an out-of-range value) or
/// [`CorruptTrie`](Error::CorruptTrie) (the reconstructed code trie cannot
/// resolve the bits that follow). I/O failures from the underlying
/// collaborators are propagated untouched.
#[derive(Debug)]
pub enum Error {
    /// The bit stream ended before a complete field could be read, or a
    /// field holds a value outside its domain.
    InvalidFormat(&'static str),
    /// Decoding required a trie edge that does not exist, or landed on a
    /// node carrying no symbol.
    CorruptTrie(&'static str),
    /// An error bubbled up from a reader or writer.
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidFormat(msg) => write!(f, "invalid archive format: {}", msg),
            Error::CorruptTrie(msg) => write!(f, "corrupt code trie: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}
