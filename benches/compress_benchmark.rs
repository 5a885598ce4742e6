//! Benchmarks for streamflate compression.
//!
//! Compare against the `flate2` crate on the same corpora.

mod corpus;

use std::io::Write;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use streamflate::{compress_to_vec, CompressOptions};

fn corpus_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("text", corpus::text_like(256 * 1024)),
        ("zeros", corpus::zero_runs(256 * 1024)),
        ("noise", corpus::noise(256 * 1024)),
    ]
}

fn compression_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Zlib Compression");

    for (name, data) in corpus_entries() {
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("streamflate", name), &data, |b, data| {
            b.iter(|| compress_to_vec(black_box(data), &CompressOptions::default()).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("flate2", name), &data, |b, data| {
            b.iter(|| {
                let mut encoder =
                    flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(black_box(data)).unwrap();
                encoder.finish().unwrap()
            });
        });
    }

    group.finish();
}

fn probe_budget_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Probe Budgets");
    let data = corpus::text_like(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for max_probes in [1u16, 8, 100, 1024, 4095] {
        let options = CompressOptions {
            max_probes,
            ..CompressOptions::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(max_probes),
            &options,
            |b, options| {
                b.iter(|| compress_to_vec(black_box(&data), options).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, compression_benchmark, probe_budget_benchmark);
criterion_main!(benches);
