//! Criterion benchmarks for the tourism ranker.
//!
//! Measures ranking time across batch sizes with a mix of record shapes so
//! every extractor and the identifier fallback are exercised.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package barri-scorer
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::hint::black_box;

use barri_core::{DecodedRecord, decode_value};
use barri_scorer::TourismRanker;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};

/// Seed for deterministic batch generation.
const BENCHMARK_SEED: u64 = 42;

/// Batch sizes to benchmark. Barcelona has 73 neighbourhoods.
const BATCH_SIZES: &[u64] = &[73, 730, 7_300];

/// Build a batch cycling through direct, nested, monthly and empty records.
fn generate_batch(size: u64, seed: u64) -> Vec<DecodedRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let records: Vec<Value> = (0..size)
        .map(|index| {
            let id = format!("{index:03}");
            match index.rem_euclid(4) {
                0 => json!({ "codi_barri": id, "turisme_percentatge_districte": rng.gen_range(1.0..100.0) }),
                1 => json!({
                    "codi_barri": id,
                    "turisme_mensual": { "turisme_percentatge_districte": format!("{:.1}%", rng.gen_range(1.0..100.0)) },
                }),
                2 => json!({
                    "codi_barri": id,
                    "turisme_mensual": {
                        "turistes_absolut_districte_simulat": {
                            "gener": rng.gen_range(100..9_000),
                            "juliol": rng.gen_range(100..9_000),
                        },
                    },
                }),
                _ => json!({ "codi_barri": id }),
            }
        })
        .collect();
    match decode_value(Value::Array(records)) {
        Ok(batch) => batch,
        Err(err) => panic!("generated batch must be an array: {err}"),
    }
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let ranker = TourismRanker::default();

    for &size in BATCH_SIZES {
        let batch = generate_batch(size, BENCHMARK_SEED);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("records", size), &batch, |b, batch| {
            b.iter(|| black_box(ranker.rank(black_box(batch))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
