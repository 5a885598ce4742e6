//! Streaming DEFLATE compression (RFC 1951) with optional zlib framing
//! (RFC 1950).
//!
//! [`Compressor`] accepts input in arbitrary chunks and pushes compressed
//! bytes to a [`Sink`]. Output is a sequence of dynamic-Huffman blocks:
//! a block is emitted whenever the 24 KiB token buffer fills and once
//! more at [`Compressor::finish`], which marks the final block, pads to a
//! byte boundary, and (for zlib) appends the big-endian Adler-32 of the
//! input.

use crate::adler32::adler32_update;
use crate::bits::BitSink;
use crate::error::{Error, Result};
use crate::huffman::HuffmanTable;
use crate::lz77::{Dictionary, LzCodeBuffer, Token, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH};
use crate::sink::{Sink, SliceSink};
use crate::tables::{
    CODE_LENGTH_ORDER, LARGE_DIST_EXTRA, LARGE_DIST_SYM, LEN_EXTRA, LEN_SYM, SMALL_DIST_EXTRA,
    SMALL_DIST_SYM,
};

/// Literal/length alphabet size (symbols 0-287; 286+ never coded).
const LIT_LEN_SYMBOLS: usize = 288;
/// Distance alphabet size (symbols 0-31; 30+ never coded).
const DIST_SYMBOLS: usize = 32;
/// Code-length alphabet size (RFC 1951 §3.2.7).
const CODE_LENGTH_SYMBOLS: usize = 19;

/// End-of-block symbol in the literal/length alphabet.
const END_OF_BLOCK: usize = 256;

/// Code size cap for the literal/length and distance alphabets.
const BLOCK_CODE_SIZE_LIMIT: u8 = 15;
/// Code size cap for the code-length alphabet.
const CODE_LENGTH_CODE_SIZE_LIMIT: u8 = 7;

/// Matches at least this long are committed immediately, never deferred.
const IMMEDIATE_COMMIT_LENGTH: usize = 64;

/// A minimum-length match at or beyond this distance costs more to code
/// than three literals and is discarded.
const SHORT_MATCH_MAX_DISTANCE: usize = 12 * 1024;

/// Compression session options.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Hash-chain probes per match search, clamped to 1..=4095. More
    /// probes compress better and run slower. At 0 or 1 the match finder
    /// never fires and output is Huffman-coded literals only.
    pub max_probes: u16,
    /// Commit every match as found instead of deferring one byte for a
    /// possibly longer match starting at the next position.
    pub greedy_parsing: bool,
    /// Emit the 2-byte zlib header and trailing Adler-32 around the raw
    /// DEFLATE stream.
    pub zlib_wrapper: bool,
    /// Skip clearing the hash head table in [`Compressor::reset`].
    /// Restart is faster, but streams started this way may differ (while
    /// remaining valid) between otherwise identical sessions.
    pub skip_hash_clear: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_probes: 100,
            greedy_parsing: false,
            zlib_wrapper: true,
            skip_hash_clear: false,
        }
    }
}

impl CompressOptions {
    /// Speed-focused preset: greedy parsing, minimal match search.
    pub fn fast() -> Self {
        Self {
            max_probes: 8,
            greedy_parsing: true,
            ..Self::default()
        }
    }

    /// Balanced preset (the default): lazy parsing, 100 probes.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Highest compression preset; slowest.
    pub fn max_compression() -> Self {
        Self {
            max_probes: 4095,
            ..Self::default()
        }
    }
}

/// Streaming DEFLATE/zlib compressor.
///
/// All working buffers are allocated once at construction; compression
/// itself allocates nothing. Feed data with [`write`](Self::write) and
/// complete the stream with [`finish`](Self::finish); a finished
/// compressor rejects further input but can start a new stream via
/// [`reset`](Self::reset).
#[derive(Debug)]
pub struct Compressor<S: Sink> {
    max_probes: u32,
    greedy_parsing: bool,
    zlib_wrapper: bool,
    skip_hash_clear: bool,
    bits: BitSink<S>,
    dict: Dictionary,
    lz: LzCodeBuffer,
    lit_len: HuffmanTable<LIT_LEN_SYMBOLS>,
    dist: HuffmanTable<DIST_SYMBOLS>,
    code_length: HuffmanTable<CODE_LENGTH_SYMBOLS>,
    saved_lit: u8,
    saved_match_dist: usize,
    saved_match_len: usize,
    adler: u32,
    total_in: u64,
    finished: bool,
}

impl<S: Sink> Compressor<S> {
    /// Create a compressor with default options (zlib framing, lazy
    /// parsing, 100 probes).
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, CompressOptions::default())
    }

    /// Create a compressor with explicit options.
    pub fn with_options(sink: S, options: CompressOptions) -> Self {
        let mut compressor = Self {
            max_probes: options.max_probes.clamp(1, 4095) as u32,
            greedy_parsing: options.greedy_parsing,
            zlib_wrapper: options.zlib_wrapper,
            skip_hash_clear: options.skip_hash_clear,
            bits: BitSink::new(sink),
            dict: Dictionary::new(),
            lz: LzCodeBuffer::new(),
            lit_len: HuffmanTable::new(),
            dist: HuffmanTable::new(),
            code_length: HuffmanTable::new(),
            saved_lit: 0,
            saved_match_dist: 0,
            saved_match_len: 0,
            adler: 1,
            total_in: 0,
            finished: false,
        };
        compressor.start_stream();
        compressor
    }

    /// Compress a chunk of input. Output reaches the sink as 4 KiB runs;
    /// some input stays buffered in the dictionary until the next call or
    /// [`finish`](Self::finish).
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::StreamFinished);
        }
        if !self.bits.is_ok() {
            return Err(Error::SinkRejected);
        }
        if self.zlib_wrapper {
            self.adler = adler32_update(self.adler, data);
        }
        self.total_in += data.len() as u64;
        self.compress_stream(data, false);
        if self.bits.is_ok() {
            Ok(())
        } else {
            Err(Error::SinkRejected)
        }
    }

    /// Complete the stream: drain the remaining lookahead, emit the final
    /// block (marked BFINAL, padded to a byte boundary), append the
    /// Adler-32 when zlib framing is on, and flush everything to the
    /// sink. The compressor then rejects further input.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::StreamFinished);
        }
        self.finished = true;
        if !self.bits.is_ok() {
            return Err(Error::SinkRejected);
        }

        self.compress_stream(&[], true);
        if self.saved_match_len > 0 {
            let (len, dist) = (self.saved_match_len, self.saved_match_dist);
            self.record_match(len, dist);
            self.saved_match_len = 0;
        }
        self.flush_block(true);
        if self.zlib_wrapper {
            let mut adler = self.adler;
            for _ in 0..4 {
                self.bits.put_bits((adler >> 24) & 0xFF, 8);
                adler <<= 8;
            }
        }
        self.bits.drain();
        if self.bits.is_ok() {
            Ok(())
        } else {
            Err(Error::SinkRejected)
        }
    }

    /// Begin a new stream into `sink`, returning the previous sink.
    ///
    /// With [`CompressOptions::skip_hash_clear`] set, stale hash heads
    /// survive the reset; every match is still bounded by the new
    /// stream's own history.
    pub fn reset(&mut self, sink: S) -> S {
        let old = self.bits.reset(sink);
        self.dict.reset(!self.skip_hash_clear);
        self.lz.clear();
        self.saved_lit = 0;
        self.saved_match_dist = 0;
        self.saved_match_len = 0;
        self.adler = 1;
        self.total_in = 0;
        self.finished = false;
        self.start_stream();
        old
    }

    /// Consume the compressor and return its sink.
    pub fn into_sink(self) -> S {
        self.bits.into_sink()
    }

    /// Total uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    fn start_stream(&mut self) {
        if self.zlib_wrapper {
            // CMF: deflate, 32 KiB window. FLG: check bits only.
            self.bits.put_bits(0x78, 8);
            self.bits.put_bits(0x01, 8);
        }
    }

    /// Feed `src` through the dictionary and parse while a full
    /// lookahead is available (or to exhaustion when `finishing`).
    fn compress_stream(&mut self, mut src: &[u8], finishing: bool) {
        while !src.is_empty() || (finishing && self.dict.lookahead_size > 0) {
            src = self.dict.fill(src);
            if !finishing && self.dict.lookahead_size < MAX_MATCH_LENGTH {
                break;
            }
            self.parse_one();
        }
    }

    /// One step of the lazy/greedy parser: emit a literal or match and
    /// advance the lookahead.
    fn parse_one(&mut self) {
        let pos = self.dict.lookahead_pos;
        let mut len_to_move = 1;

        // A deferred match sets the bar: only a strictly longer match at
        // this position can displace it.
        let min_len_to_beat = if self.saved_match_len > 0 {
            self.saved_match_len
        } else {
            MIN_MATCH_LENGTH - 1
        };
        let (mut cur_match_dist, mut cur_match_len) = self.dict.find_match(
            pos,
            self.dict.dict_size,
            self.dict.lookahead_size,
            0,
            min_len_to_beat,
            self.max_probes,
        );

        if cur_match_len == MIN_MATCH_LENGTH && cur_match_dist >= SHORT_MATCH_MAX_DISTANCE {
            cur_match_dist = 0;
            cur_match_len = 0;
        }

        if self.saved_match_len > 0 {
            if cur_match_len > self.saved_match_len {
                self.record_literal(self.saved_lit);
                if cur_match_len >= IMMEDIATE_COMMIT_LENGTH {
                    self.record_match(cur_match_len, cur_match_dist);
                    self.saved_match_len = 0;
                    len_to_move = cur_match_len;
                } else {
                    self.saved_lit = self.dict.byte_at(pos);
                    self.saved_match_dist = cur_match_dist;
                    self.saved_match_len = cur_match_len;
                }
            } else {
                let (len, dist) = (self.saved_match_len, self.saved_match_dist);
                self.record_match(len, dist);
                // The deferred literal's position already consumed one byte.
                len_to_move = len - 1;
                self.saved_match_len = 0;
            }
        } else if cur_match_dist == 0 {
            self.record_literal(self.dict.byte_at(pos));
        } else if self.greedy_parsing || cur_match_len >= IMMEDIATE_COMMIT_LENGTH {
            self.record_match(cur_match_len, cur_match_dist);
            len_to_move = cur_match_len;
        } else {
            self.saved_lit = self.dict.byte_at(pos);
            self.saved_match_dist = cur_match_dist;
            self.saved_match_len = cur_match_len;
        }

        self.dict.advance(len_to_move);
    }

    fn record_literal(&mut self, lit: u8) {
        self.lz.push_literal(lit);
        if self.lz.is_nearly_full() {
            self.flush_block(false);
        }
    }

    fn record_match(&mut self, length: usize, distance: usize) {
        self.lz.push_match(length, distance);
        if self.lz.is_nearly_full() {
            self.flush_block(false);
        }
    }

    /// Emit the buffered tokens as one dynamic block: pass 1 tallies
    /// symbol frequencies and builds the Huffman tables, pass 2 writes
    /// the block header and the coded token stream.
    fn flush_block(&mut self, last_block: bool) {
        let sealed = self.lz.seal();

        self.lit_len.reset_counts();
        self.dist.reset_counts();
        for token in self.lz.tokens(sealed) {
            match token {
                Token::Literal(lit) => {
                    self.lit_len.counts[lit as usize] += 1;
                }
                Token::Match { length, distance } => {
                    let len_idx = length as usize - MIN_MATCH_LENGTH;
                    self.lit_len.counts[LEN_SYM[len_idx] as usize] += 1;
                    let d = distance as usize - 1;
                    if d < 512 {
                        self.dist.counts[SMALL_DIST_SYM[d] as usize] += 1;
                    } else {
                        self.dist.counts[LARGE_DIST_SYM[d >> 8] as usize] += 1;
                    }
                }
            }
        }
        self.lit_len.counts[END_OF_BLOCK] += 1;

        self.start_dynamic_block(last_block);

        for token in self.lz.tokens(sealed) {
            match token {
                Token::Literal(lit) => {
                    let sym = lit as usize;
                    self.bits
                        .put_bits(self.lit_len.codes[sym] as u32, self.lit_len.sizes[sym] as u32);
                }
                Token::Match { length, distance } => {
                    let len_idx = length as usize - MIN_MATCH_LENGTH;
                    let sym = LEN_SYM[len_idx] as usize;
                    self.bits
                        .put_bits(self.lit_len.codes[sym] as u32, self.lit_len.sizes[sym] as u32);
                    let extra = LEN_EXTRA[len_idx] as u32;
                    self.bits
                        .put_bits(len_idx as u32 & ((1 << extra) - 1), extra);

                    let d = distance as usize - 1;
                    let (sym, extra) = if d < 512 {
                        (SMALL_DIST_SYM[d] as usize, SMALL_DIST_EXTRA[d] as u32)
                    } else {
                        (LARGE_DIST_SYM[d >> 8] as usize, LARGE_DIST_EXTRA[d >> 8] as u32)
                    };
                    self.bits
                        .put_bits(self.dist.codes[sym] as u32, self.dist.sizes[sym] as u32);
                    self.bits.put_bits(d as u32 & ((1 << extra) - 1), extra);
                }
            }
        }
        self.bits.put_bits(
            self.lit_len.codes[END_OF_BLOCK] as u32,
            self.lit_len.sizes[END_OF_BLOCK] as u32,
        );

        if last_block {
            self.bits.align_to_byte();
        }
        self.lz.clear();
    }

    /// Build all three Huffman tables and write the dynamic block header:
    /// BFINAL/BTYPE, HLIT/HDIST/HCLEN, the swizzled code-length-alphabet
    /// sizes, and the RLE-packed literal/length + distance code sizes.
    fn start_dynamic_block(&mut self, last_block: bool) {
        self.lit_len.optimize(BLOCK_CODE_SIZE_LIMIT);
        self.dist.optimize(BLOCK_CODE_SIZE_LIMIT);

        let mut num_lit_codes = 286;
        while num_lit_codes > 257 && self.lit_len.sizes[num_lit_codes - 1] == 0 {
            num_lit_codes -= 1;
        }
        let mut num_dist_codes = 30;
        while num_dist_codes > 1 && self.dist.sizes[num_dist_codes - 1] == 0 {
            num_dist_codes -= 1;
        }

        let total_code_sizes = num_lit_codes + num_dist_codes;
        let mut code_sizes_to_pack = [0u8; LIT_LEN_SYMBOLS + DIST_SYMBOLS];
        code_sizes_to_pack[..num_lit_codes].copy_from_slice(&self.lit_len.sizes[..num_lit_codes]);
        code_sizes_to_pack[num_lit_codes..total_code_sizes]
            .copy_from_slice(&self.dist.sizes[..num_dist_codes]);

        // RLE-pack the concatenated code sizes into the 19-symbol
        // alphabet, tallying its frequencies as we go.
        let mut packed = [0u8; LIT_LEN_SYMBOLS + DIST_SYMBOLS];
        let mut num_packed = 0usize;
        let mut repeat_count = 0usize;
        let mut zero_count = 0usize;
        let mut prev_code_size = 0xFFu8;
        self.code_length.reset_counts();

        for &code_size in &code_sizes_to_pack[..total_code_sizes] {
            if code_size == 0 {
                flush_rle_prev(
                    &mut self.code_length.counts,
                    &mut packed,
                    &mut num_packed,
                    &mut repeat_count,
                    prev_code_size,
                );
                zero_count += 1;
                if zero_count == 138 {
                    flush_rle_zero(
                        &mut self.code_length.counts,
                        &mut packed,
                        &mut num_packed,
                        &mut zero_count,
                    );
                }
            } else {
                flush_rle_zero(
                    &mut self.code_length.counts,
                    &mut packed,
                    &mut num_packed,
                    &mut zero_count,
                );
                if code_size != prev_code_size {
                    flush_rle_prev(
                        &mut self.code_length.counts,
                        &mut packed,
                        &mut num_packed,
                        &mut repeat_count,
                        prev_code_size,
                    );
                    self.code_length.counts[code_size as usize] += 1;
                    packed[num_packed] = code_size;
                    num_packed += 1;
                } else {
                    repeat_count += 1;
                    if repeat_count == 6 {
                        flush_rle_prev(
                            &mut self.code_length.counts,
                            &mut packed,
                            &mut num_packed,
                            &mut repeat_count,
                            prev_code_size,
                        );
                    }
                }
            }
            prev_code_size = code_size;
        }
        if repeat_count > 0 {
            flush_rle_prev(
                &mut self.code_length.counts,
                &mut packed,
                &mut num_packed,
                &mut repeat_count,
                prev_code_size,
            );
        } else {
            flush_rle_zero(
                &mut self.code_length.counts,
                &mut packed,
                &mut num_packed,
                &mut zero_count,
            );
        }

        self.code_length.optimize(CODE_LENGTH_CODE_SIZE_LIMIT);

        self.bits.put_bits(last_block as u32, 1);
        self.bits.put_bits(2, 2);
        self.bits.put_bits((num_lit_codes - 257) as u32, 5);
        self.bits.put_bits((num_dist_codes - 1) as u32, 5);

        let mut num_bit_lengths = 0;
        for i in (0..CODE_LENGTH_SYMBOLS).rev() {
            if self.code_length.sizes[CODE_LENGTH_ORDER[i]] != 0 {
                num_bit_lengths = i + 1;
                break;
            }
        }
        let num_bit_lengths = num_bit_lengths.max(4);
        self.bits.put_bits((num_bit_lengths - 4) as u32, 4);
        for &sym in &CODE_LENGTH_ORDER[..num_bit_lengths] {
            self.bits.put_bits(self.code_length.sizes[sym] as u32, 3);
        }

        let mut i = 0;
        while i < num_packed {
            let code = packed[i] as usize;
            i += 1;
            debug_assert!(code < CODE_LENGTH_SYMBOLS);
            self.bits.put_bits(
                self.code_length.codes[code] as u32,
                self.code_length.sizes[code] as u32,
            );
            if code >= 16 {
                let extra_bits = [2, 3, 7][code - 16];
                self.bits.put_bits(packed[i] as u32, extra_bits);
                i += 1;
            }
        }
    }
}

/// Flush a pending run of repeated nonzero code sizes: symbol 16 for runs
/// of 3..=6, literal repetition below that.
fn flush_rle_prev(
    counts: &mut [u16; CODE_LENGTH_SYMBOLS],
    packed: &mut [u8],
    num_packed: &mut usize,
    repeat_count: &mut usize,
    prev_code_size: u8,
) {
    if *repeat_count == 0 {
        return;
    }
    if *repeat_count < 3 {
        counts[prev_code_size as usize] += *repeat_count as u16;
        while *repeat_count > 0 {
            packed[*num_packed] = prev_code_size;
            *num_packed += 1;
            *repeat_count -= 1;
        }
    } else {
        counts[16] += 1;
        packed[*num_packed] = 16;
        packed[*num_packed + 1] = (*repeat_count - 3) as u8;
        *num_packed += 2;
        *repeat_count = 0;
    }
}

/// Flush a pending run of zero code sizes: symbol 18 for runs of 11..=138,
/// symbol 17 for 3..=10, literal zeros below that.
fn flush_rle_zero(
    counts: &mut [u16; CODE_LENGTH_SYMBOLS],
    packed: &mut [u8],
    num_packed: &mut usize,
    zero_count: &mut usize,
) {
    if *zero_count == 0 {
        return;
    }
    if *zero_count < 3 {
        counts[0] += *zero_count as u16;
        while *zero_count > 0 {
            packed[*num_packed] = 0;
            *num_packed += 1;
            *zero_count -= 1;
        }
    } else if *zero_count <= 10 {
        counts[17] += 1;
        packed[*num_packed] = 17;
        packed[*num_packed + 1] = (*zero_count - 3) as u8;
        *num_packed += 2;
        *zero_count = 0;
    } else {
        counts[18] += 1;
        packed[*num_packed] = 18;
        packed[*num_packed + 1] = (*zero_count - 11) as u8;
        *num_packed += 2;
        *zero_count = 0;
    }
}

/// Compress a whole buffer into a fresh `Vec`.
pub fn compress_to_vec(data: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    let sink = Vec::with_capacity((data.len() / 2).max(32));
    let mut compressor = Compressor::with_options(sink, options.clone());
    compressor.write(data)?;
    compressor.finish()?;
    Ok(compressor.into_sink())
}

/// Compress a whole buffer into a caller-provided slice, returning the
/// number of bytes written. Fails with [`Error::SinkRejected`] when the
/// slice is too small.
pub fn compress_to_slice(data: &[u8], out: &mut [u8], options: &CompressOptions) -> Result<usize> {
    let mut compressor = Compressor::with_options(SliceSink::new(out), options.clone());
    compressor.write(data)?;
    compressor.finish()?;
    Ok(compressor.into_sink().len())
}
