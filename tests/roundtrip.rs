//! Test the bzstream public interface.
use std::io::{Read, Write};

use bzstream::tools::crc::{do_crc, do_stream_crc};
use bzstream::{compress, decompress, BzDecoder, BzEncoder, ErrorKind};

/// Pseudo-random bytes from a simple linear congruential generator.
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            (state >> 16) as u8
        })
        .collect()
}

/// Text made of random words, so it compresses but is not trivially repetitive.
fn words(len: usize) -> Vec<u8> {
    const WORDS: [&str; 12] = [
        "peter", "piper", "picked", "a", "peck", "of", "pickled", "peppers", "where's", "the",
        "bzip2", "block",
    ];
    let mut out = Vec::with_capacity(len + 16);
    for r in noise(len, 42) {
        if out.len() >= len {
            break;
        }
        out.extend_from_slice(WORDS[r as usize % WORDS.len()].as_bytes());
        out.push(if r % 7 == 0 { b'\n' } else { b' ' });
    }
    out.truncate(len);
    out
}

/// Assert that a roundtrip of compression and decompression results in the same data.
fn roundtrip(data: &[u8], block_size: u32) {
    let packed = compress(data, block_size).expect("Could not compress data");
    let unpacked = decompress(&packed).expect("Could not decompress data");
    assert_eq!(unpacked.len(), data.len());
    assert!(unpacked == data);
}

#[test]
fn empty_test() {
    let packed = compress(b"", 9).unwrap();
    let mut expect = b"BZh9".to_vec();
    expect.extend_from_slice(&[0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0, 0, 0, 0]);
    assert_eq!(packed, expect);
    roundtrip(b"", 9);
    roundtrip(b"", 1);
}

#[test]
fn small_inputs_test() {
    roundtrip(b"x", 9);
    roundtrip(b"AAAAAAAAAA", 1);
    roundtrip(b"abracadabra", 5);
    roundtrip(&[0, 0, 0, 0, 0], 1);
    roundtrip(&[255; 4], 1);
}

#[test]
fn text_test() {
    roundtrip(&words(5_000), 1);
    roundtrip(&words(250_000), 9);
}

#[test]
fn noise_test() {
    roundtrip(&noise(70_000, 1), 1);
}

#[test]
fn every_byte_value_test() {
    let data = (0..=255_u8).cycle().take(20_000).collect::<Vec<u8>>();
    roundtrip(&data, 1);
}

#[test]
fn runs_test() {
    // Runs of every length around the RLE1 limits
    let mut data = vec![];
    for len in 1..600 {
        data.extend(std::iter::repeat((len % 251) as u8).take(len));
    }
    roundtrip(&data, 1);
}

#[test]
fn repetitive_block_is_randomised_test() {
    let data = vec![b'x'; 400_000];
    let mut enc = BzEncoder::new(Vec::new(), 1).unwrap();
    enc.write_all(&data).unwrap();
    assert_eq!(enc.blocks_randomised(), 0);
    enc.try_finish().unwrap();
    assert!(enc.blocks_randomised() >= 1);
    let packed = enc.finish().unwrap();
    assert_eq!(decompress(&packed).unwrap(), data);
}

#[test]
fn repetitive_pattern_test() {
    let data = b"abc".repeat(40_000);
    roundtrip(&data, 9);
    roundtrip(&data, 1);
}

#[test]
fn multi_block_crc_test() {
    // No two neighbouring bytes are equal, so every RLE1 run is one byte long and a level 1
    // block holds exactly 99981 bytes.
    let mut data = noise(350_000, 7);
    for i in 1..data.len() {
        if data[i] == data[i - 1] {
            data[i] = data[i].wrapping_add(1);
        }
    }
    let packed = compress(&data, 1).unwrap();

    let mut dec = BzDecoder::new(&packed[..]);
    let mut out = vec![];
    dec.read_to_end(&mut out).unwrap();
    assert!(out == data);
    assert_eq!(dec.block_size(), 1);

    let combined = data
        .chunks(99_981)
        .fold(0, |crc, block| do_stream_crc(crc, do_crc(block)));
    assert_eq!(dec.combined_crc(), combined);
}

#[test]
fn streaming_write_test() {
    // Writing in odd sized pieces gives the same stream as one big write
    let data = words(120_000);
    let mut enc = BzEncoder::new(Vec::new(), 1).unwrap();
    for chunk in data.chunks(777) {
        enc.write_all(chunk).unwrap();
    }
    let packed = enc.finish().unwrap();
    assert_eq!(packed, compress(&data, 1).unwrap());
}

#[test]
fn small_reads_test() {
    let data = words(30_000);
    let packed = compress(&data, 2).unwrap();
    let mut dec = BzDecoder::new(&packed[..]);
    let mut out = vec![];
    let mut buf = [0_u8; 7];
    loop {
        let n = dec.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert!(out == data);
    assert_eq!(dec.read_byte().unwrap(), None);
}

#[test]
fn work_factor_test() {
    let data = words(50_000);
    let mut enc = BzEncoder::new(Vec::new(), 1)
        .unwrap()
        .with_work_factor(1)
        .unwrap();
    enc.write_all(&data).unwrap();
    let packed = enc.finish().unwrap();
    assert_eq!(decompress(&packed).unwrap(), data);
}

#[test]
fn bit_flip_test() {
    let data = words(20_000);
    let packed = compress(&data, 1).unwrap();
    let middle = packed.len() / 2;
    for byte in middle..middle + 4 {
        for bit in 0..8 {
            let mut bad = packed.clone();
            bad[byte] ^= 1 << bit;
            assert!(
                decompress(&bad).is_err(),
                "flip of bit {} in byte {} went unnoticed",
                bit,
                byte
            );
        }
    }
}

#[test]
fn stored_crc_test() {
    let mut packed = compress(&words(1_000), 1).unwrap();
    // The block crc follows the stream header and the block magic
    packed[10] ^= 0x40;
    assert_eq!(decompress(&packed).unwrap_err().kind(), ErrorKind::Integrity);

    let mut packed = compress(b"", 1).unwrap();
    packed[13] = 1;
    assert_eq!(decompress(&packed).unwrap_err().kind(), ErrorKind::Integrity);
}

#[test]
fn bad_headers_test() {
    assert_eq!(decompress(b"BZ").unwrap_err().kind(), ErrorKind::UnexpectedEnd);
    assert_eq!(decompress(b"PK\x03\x04").unwrap_err().kind(), ErrorKind::Format);
    assert_eq!(
        decompress(b"BZh9\x31\x41\x59\x26\x53\x58").unwrap_err().kind(),
        ErrorKind::Format
    );
}

#[test]
fn truncated_test() {
    let packed = compress(&words(10_000), 1).unwrap();
    let err = decompress(&packed[..packed.len() / 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEnd);

    // Read reports it as an io error of the matching kind
    let mut dec = BzDecoder::new(&packed[..packed.len() - 3]);
    let mut out = vec![];
    let err = dec.read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn invalid_block_size_test() {
    for size in [0, 10, 100] {
        let err = compress(b"data", size).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
