//! Shared corpus utilities for compression benchmarks.
//!
//! All generators are deterministic so results stay comparable across
//! runs and machines.

/// Pseudo-text: repeated dictionary words, compresses like real prose.
pub fn text_like(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "stream", "window", "buffer", "block", "symbol", "length", "distance", "probe", "chain",
        "flush", "the", "of", "and", "a",
    ];
    let mut out = Vec::with_capacity(len + 16);
    let mut x: u32 = 0x2545_F491;
    while out.len() < len {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.extend_from_slice(WORDS[(x >> 24) as usize % WORDS.len()].as_bytes());
        out.push(b' ');
    }
    out.truncate(len);
    out
}

/// Long runs: the best case for match finding.
pub fn zero_runs(len: usize) -> Vec<u8> {
    vec![0; len]
}

/// LCG noise: the worst case, essentially incompressible.
pub fn noise(len: usize) -> Vec<u8> {
    let mut x: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (x >> 24) as u8
        })
        .collect()
}
