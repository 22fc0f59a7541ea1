/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use huffarc::archive::{compress, decompress};
use huffarc::error::Error;
use huffarc::impls::{FileReader, FileWriter, MemReader, MemWriter};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

fn pack(inputs: &[(&str, &[u8])]) -> Vec<u8> {
    let readers: Vec<MemReader> = inputs
        .iter()
        .map(|(name, data)| MemReader::new(*name, *data))
        .collect();

    let mut writer = MemWriter::new();
    compress(readers, &mut writer, "archive").unwrap();
    writer.into_files().pop().unwrap().1
}

fn unpack(archive: Vec<u8>) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut reader = MemReader::new("archive", archive);
    let mut writer = MemWriter::new();
    decompress(&mut reader, &mut writer)?;
    Ok(writer.into_files())
}

fn check_round_trip(inputs: &[(&str, &[u8])]) -> Vec<u8> {
    let archive = pack(inputs);
    let restored = unpack(archive.clone()).unwrap();

    assert_eq!(restored.len(), inputs.len());
    for ((name, data), (input_name, input_data)) in restored.iter().zip(inputs) {
        assert_eq!(name, input_name);
        assert_eq!(data, input_data);
    }

    archive
}

#[test]
fn test_single_byte_file() {
    check_round_trip(&[("T", &[0x54])]);
}

#[test]
fn test_three_files_one_empty() {
    check_round_trip(&[("first", &[0xaa, 0xbb]), ("second", &[0xff]), ("third", &[])]);
}

#[test]
fn test_uniform_random_payload() {
    let mut rng = SmallRng::seed_from_u64(0);
    let payload: Vec<u8> = (0..4096).map(|_| rng.random()).collect();

    let archive = check_round_trip(&[("random.bin", &payload)]);

    // Uniform bytes are incompressible; the section overhead stays small.
    assert!(archive.len() <= payload.len() + 400);
}

#[test]
fn test_constant_payload_shrinks() {
    let payload = [0u8; 512];
    let archive = check_round_trip(&[("zeros", &payload)]);
    assert!(archive.len() < payload.len());
}

#[test]
fn test_multi_byte_name() {
    check_round_trip(&[("résumé.txt", b"curriculum vitae")]);
}

#[test]
fn test_truncated_archive() {
    let mut archive = pack(&[("T", &[0x54])]);
    archive.pop();

    match unpack(archive) {
        Err(Error::InvalidFormat(_)) => {}
        other => panic!("expected InvalidFormat, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_deterministic_bytes() {
    let inputs: &[(&str, &[u8])] = &[("a", b"some repeated text, some repeated text"), ("b", &[7; 100])];
    assert_eq!(pack(inputs), pack(inputs));
}

#[test]
fn test_skewed_frequencies_round_trip() {
    // Fibonacci-distributed byte counts would push the natural code past
    // 9 bits; the encoder has to rebalance and still round-trip.
    let mut payload = Vec::new();
    let mut a = 1u64;
    let mut b = 1u64;
    for byte in 0..14u8 {
        payload.extend(std::iter::repeat(byte).take(a as usize));
        let next = a + b;
        a = b;
        b = next;
    }

    check_round_trip(&[("skew.bin", &payload)]);
}

#[test]
fn test_many_files() {
    let payloads: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| {
            (
                format!("file_{}", i),
                (0..i * 37).map(|j| (i * j) as u8).collect(),
            )
        })
        .collect();

    let inputs: Vec<(&str, &[u8])> = payloads
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();

    check_round_trip(&inputs);
}

#[test]
fn test_file_backed_round_trip() {
    let dir = std::env::temp_dir().join("huffarc_test_archive");
    let restored_dir = dir.join("restored");
    std::fs::create_dir_all(&restored_dir).unwrap();

    let mut rng = SmallRng::seed_from_u64(42);
    let payload: Vec<u8> = (0..10_000).map(|_| rng.random_range(0..16) as u8 * 17).collect();
    std::fs::write(dir.join("payload.bin"), &payload).unwrap();
    std::fs::write(dir.join("notes.txt"), b"file-backed round trip").unwrap();

    {
        let readers = vec![
            FileReader::open(dir.join("payload.bin")).unwrap(),
            FileReader::open(dir.join("notes.txt")).unwrap(),
        ];
        let mut writer = FileWriter::new(&dir);
        compress(readers, &mut writer, "archive.huf").unwrap();
    }

    {
        let mut reader = FileReader::open(dir.join("archive.huf")).unwrap();
        let mut writer = FileWriter::new(&restored_dir);
        decompress(&mut reader, &mut writer).unwrap();
    }

    assert_eq!(std::fs::read(restored_dir.join("payload.bin")).unwrap(), payload);
    assert_eq!(
        std::fs::read(restored_dir.join("notes.txt")).unwrap(),
        b"file-backed round trip"
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
