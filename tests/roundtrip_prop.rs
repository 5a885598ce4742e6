//! Round-trip property tests against the `flate2` reference decoder.

use std::io::Read;

use proptest::prelude::*;
use streamflate::{compress_to_vec, CompressOptions, Compressor};

fn inflate_zlib(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .unwrap();
    out
}

fn inflate_raw(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .unwrap();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_zlib_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        max_probes in 1u16..512,
        greedy_parsing in any::<bool>(),
    ) {
        let options = CompressOptions {
            max_probes,
            greedy_parsing,
            ..CompressOptions::default()
        };
        let compressed = compress_to_vec(&data, &options).unwrap();
        prop_assert_eq!(inflate_zlib(&compressed), data);
    }

    #[test]
    fn prop_raw_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        max_probes in 1u16..512,
    ) {
        let options = CompressOptions {
            max_probes,
            zlib_wrapper: false,
            ..CompressOptions::default()
        };
        let compressed = compress_to_vec(&data, &options).unwrap();
        prop_assert_eq!(inflate_raw(&compressed), data);
    }

    #[test]
    fn prop_chunked_matches_one_shot(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk_size in 1usize..300,
    ) {
        let one_shot = compress_to_vec(&data, &CompressOptions::default()).unwrap();
        let mut compressor = Compressor::new(Vec::new());
        for chunk in data.chunks(chunk_size) {
            compressor.write(chunk).unwrap();
        }
        compressor.finish().unwrap();
        prop_assert_eq!(compressor.into_sink(), one_shot);
    }

    #[test]
    fn prop_repetitive_input_shrinks(
        pattern in proptest::collection::vec(any::<u8>(), 1..32),
        reps in 100usize..400,
    ) {
        let data: Vec<u8> = pattern
            .iter()
            .cycle()
            .take(pattern.len() * reps)
            .copied()
            .collect();
        let compressed = compress_to_vec(&data, &CompressOptions::default()).unwrap();
        prop_assert_eq!(inflate_zlib(&compressed), data.clone());
        prop_assert!(compressed.len() < data.len());
    }
}
