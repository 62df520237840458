mod utils;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mimalloc::MiMalloc;
use sora_codec::{encode, encode_generated_ranges, encode_original_scopes};
use utils::*;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn benchmark_encode(c: &mut Criterion) {
    #[rustfmt::skip]
    let cases = [
        ("small", minified_mappings(10, 50)),
        ("large", minified_mappings(200, 2_000)),
    ];
    for (name, mappings) in cases {
        let mut bg = c.benchmark_group(format!("encode({name})"));
        bg.bench_with_input("mappings", &mappings, |b, input| {
            b.iter(|| black_box(encode(input).unwrap()))
        });
    }

    let scopes = nested_scopes(2_000, 10);
    let ranges = inlined_ranges(2_000, 10);
    let mut bg = c.benchmark_group("encode(scopes)");
    bg.bench_with_input("originalScopes", &scopes, |b, input| {
        b.iter(|| black_box(encode_original_scopes(input).unwrap()))
    });
    bg.bench_with_input("generatedRanges", &ranges, |b, input| {
        b.iter(|| black_box(encode_generated_ranges(input).unwrap()))
    });
}

criterion_group!(encode_benches, benchmark_encode);
criterion_main!(encode_benches);
