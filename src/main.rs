/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line front-end for the archiver.
//!
//! Exits 0 on success and on the help path, 1 on any usage, I/O, or
//! format error.

use anyhow::{bail, ensure, Context, Result};
use std::fs::create_dir_all;
use std::path::PathBuf;
use structopt::StructOpt;

use huffarc::archive::{compress, decompress};
use huffarc::impls::{FileReader, FileWriter};

/// A multi-file archiver based on canonical Huffman codes
#[derive(Debug, StructOpt)]
#[structopt(name = "huffarc")]
struct Opt {
    /// Compress the given files into this archive
    #[structopt(short = "c", long = "compress", value_name = "archive")]
    compress: Option<String>,

    /// Decompress this archive
    #[structopt(short = "d", long = "decompress", value_name = "archive")]
    decompress: Option<String>,

    /// Directory the archive or the restored files are written into
    #[structopt(short = "o", long = "output", parse(from_os_str), default_value = ".")]
    output: PathBuf,

    /// The files to compress
    #[structopt(parse(from_os_str))]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    match (opt.compress, opt.decompress) {
        (Some(_), Some(_)) => bail!("-c and -d cannot be combined"),

        (Some(archive_name), None) => {
            ensure!(!opt.files.is_empty(), "there are no files to compress");

            let mut readers = Vec::with_capacity(opt.files.len());
            for path in &opt.files {
                readers.push(
                    FileReader::open(path)
                        .with_context(|| format!("cannot open {}", path.display()))?,
                );
            }

            create_dir_all(&opt.output)?;
            let mut writer = FileWriter::new(&opt.output);
            compress(readers, &mut writer, &archive_name)
                .with_context(|| format!("cannot compress into {}", archive_name))?;
        }

        (None, Some(archive_name)) => {
            ensure!(
                opt.files.is_empty(),
                "decompression takes no input files"
            );

            let mut reader = FileReader::open(&archive_name)
                .with_context(|| format!("cannot open {}", archive_name))?;

            create_dir_all(&opt.output)?;
            let mut writer = FileWriter::new(&opt.output);
            decompress(&mut reader, &mut writer)
                .with_context(|| format!("cannot decompress {}", archive_name))?;
        }

        (None, None) => {
            // No command: print the usage text and exit 0.
            Opt::clap().print_long_help()?;
            println!();
        }
    }

    Ok(())
}
