//! Column hashing benchmark: xxhash64 vs murmur3 across types and tiers
//!
//! Simulates the hash-partitioning step of a shuffle:
//!   SELECT pmod(hash(k1, k2, ...), n) FROM t
//!
//! Measures:
//!   - Rows/sec per column type (int, long, double, string, decimal)
//!   - Rows/sec per instruction-set tier for a mixed multi-column key
//!   - Constant broadcast cost vs a materialized column
//!
//! Workload parameters:
//!   - Rows: batch size
//!   - Null fraction: share of null rows in nullable columns
//!   - String length: upper bound of random string payloads

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use std::time::Duration;

use sparkhash::{
    CpuCapabilities, Column, ColumnData, ColumnWithType, DataType, Decimal128,
    ExecutionContext, HashAlgorithm, SparkAnyHash, SparkMurmurHash3_32, SparkXxHash64,
    StringColumn, Tier,
};

// How long to record measurements for.
const MEASURE_DURATION_SECS: u64 = 10;

const ROWS: usize = 65_536;

struct HashWorkload {
    int32: ColumnWithType,
    int64_nullable: ColumnWithType,
    float64: ColumnWithType,
    string: ColumnWithType,
    decimal_wide: ColumnWithType,
    constant: ColumnWithType,
}

impl HashWorkload {
    /// Generate one batch of every column kind.
    ///
    /// - `rows`: batch size
    /// - `null_fraction`: share of nulls in the nullable column
    /// - `max_string_len`: exclusive upper bound of string lengths
    fn generate(rows: usize, null_fraction: f64, max_string_len: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let ints: Vec<i32> = (0..rows).map(|_| rng.random()).collect();
        let longs: Vec<Option<i64>> = (0..rows)
            .map(|_| (!rng.random_bool(null_fraction)).then(|| rng.random()))
            .collect();
        let doubles: Vec<f64> = (0..rows).map(|_| rng.random()).collect();
        let strings: StringColumn = (0..rows)
            .map(|_| {
                let len = rng.random_range(0..max_string_len);
                (0..len)
                    .map(|_| rng.random_range(b'a'..=b'z'))
                    .collect::<Vec<u8>>()
            })
            .collect();
        // Half of the decimals need the canonical big-endian path.
        let decimals: Vec<Decimal128> = (0..rows)
            .map(|_| Decimal128(rng.random::<i128>() >> rng.random_range(0..128_u32)))
            .collect();

        Self {
            int32: ColumnWithType::new("i", DataType::Int32, ColumnData::from(ints)),
            int64_nullable: ColumnWithType::new(
                "l",
                DataType::nullable(DataType::Int64),
                Column::from_options(longs),
            ),
            float64: ColumnWithType::new("d", DataType::Float64, ColumnData::from(doubles)),
            string: ColumnWithType::new("s", DataType::String, ColumnData::from(strings)),
            decimal_wide: ColumnWithType::new(
                "dec",
                DataType::Decimal128 {
                    precision: 38,
                    scale: 6,
                },
                ColumnData::from(decimals),
            ),
            constant: ColumnWithType::new(
                "c",
                DataType::String,
                Column::constant(
                    ColumnData::from(["spark"].into_iter().collect::<StringColumn>()),
                    rows,
                ),
            ),
        }
    }

    fn single_columns(&self) -> [(&'static str, &ColumnWithType); 5] {
        [
            ("Int32", &self.int32),
            ("Nullable(Int64)", &self.int64_nullable),
            ("Float64", &self.float64),
            ("String", &self.string),
            ("Decimal128", &self.decimal_wide),
        ]
    }

    fn mixed_key(&self) -> Vec<ColumnWithType> {
        vec![
            self.int32.clone(),
            self.string.clone(),
            self.int64_nullable.clone(),
            self.decimal_wide.clone(),
        ]
    }
}

fn bench_hash<H: HashAlgorithm>(
    function: &SparkAnyHash<H>,
    arguments: &[ColumnWithType],
    rows: usize,
) -> usize {
    match function.execute(arguments, rows) {
        Ok(hashes) => hashes.len(),
        Err(err) => panic!("hash workload failed: {err}"),
    }
}

fn bench_column_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_type");
    group.measurement_time(Duration::from_secs(MEASURE_DURATION_SECS));

    let workload = HashWorkload::generate(ROWS, 0.1, 32, 42);
    let context = ExecutionContext::detect();
    let xx = SparkAnyHash::<SparkXxHash64>::new(&context);
    let mm = SparkAnyHash::<SparkMurmurHash3_32>::new(&context);

    for (label, column) in workload.single_columns() {
        group.throughput(Throughput::Elements(ROWS as u64));
        let arguments = std::slice::from_ref(column);

        group.bench_with_input(BenchmarkId::new("xxhash64", label), arguments, |b, args| {
            b.iter(|| bench_hash(&xx, black_box(args), ROWS))
        });

        group.bench_with_input(BenchmarkId::new("murmur3", label), arguments, |b, args| {
            b.iter(|| bench_hash(&mm, black_box(args), ROWS))
        });
    }

    group.finish();
}

fn bench_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("tier");
    group.measurement_time(Duration::from_secs(MEASURE_DURATION_SECS));

    let workload = HashWorkload::generate(ROWS, 0.1, 32, 7);
    let arguments = workload.mixed_key();
    let cpu = CpuCapabilities::detect();

    // Only tiers this machine can run.
    for tier in Tier::ALL.into_iter().filter(|&t| cpu.supports(t)) {
        let context = ExecutionContext::detect().with_max_tier(tier);
        let xx = SparkAnyHash::<SparkXxHash64>::new(&context);
        let mm = SparkAnyHash::<SparkMurmurHash3_32>::new(&context);

        group.throughput(Throughput::Elements(ROWS as u64));

        group.bench_with_input(BenchmarkId::new("xxhash64", tier), &arguments, |b, args| {
            b.iter(|| bench_hash(&xx, black_box(args), ROWS))
        });

        group.bench_with_input(BenchmarkId::new("murmur3", tier), &arguments, |b, args| {
            b.iter(|| bench_hash(&mm, black_box(args), ROWS))
        });
    }

    group.finish();
}

fn bench_string_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_length");
    group.measurement_time(Duration::from_secs(MEASURE_DURATION_SECS));

    let xx = SparkAnyHash::<SparkXxHash64>::new(&ExecutionContext::detect());

    // Short keys sit in the tail loop, long ones in the block loop.
    for &max_len in &[4, 16, 64, 256] {
        let workload = HashWorkload::generate(ROWS, 0.0, max_len, 42);
        group.throughput(Throughput::Elements(ROWS as u64));

        group.bench_with_input(
            BenchmarkId::new("xxhash64", max_len),
            std::slice::from_ref(&workload.string),
            |b, args| b.iter(|| bench_hash(&xx, black_box(args), ROWS)),
        );
    }

    group.finish();
}

fn bench_constant_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("constant");
    group.measurement_time(Duration::from_secs(MEASURE_DURATION_SECS));

    let workload = HashWorkload::generate(ROWS, 0.0, 16, 42);
    let mm = SparkAnyHash::<SparkMurmurHash3_32>::new(&ExecutionContext::detect());
    group.throughput(Throughput::Elements(ROWS as u64));

    // Uniform seeds: the broadcast hashes once.
    group.bench_with_input(
        BenchmarkId::new("const_first", ROWS),
        std::slice::from_ref(&workload.constant),
        |b, args| b.iter(|| bench_hash(&mm, black_box(args), ROWS)),
    );

    // Distinct seeds: one hash per row.
    let after_int = vec![workload.int32.clone(), workload.constant.clone()];
    group.bench_with_input(
        BenchmarkId::new("const_after_int", ROWS),
        &after_int,
        |b, args| b.iter(|| bench_hash(&mm, black_box(args), ROWS)),
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_column_types,
    bench_tiers,
    bench_string_length,
    bench_constant_broadcast,
);
criterion_main!(benches);
