use criterion::Throughput;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hdrhistogram::{Histogram, Resolution};

fn record(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");

    group.throughput(Throughput::Elements(1));

    let mut histogram: Histogram =
        Histogram::new(1, 3_600_000_000, Resolution::SignificantFigures(3)).unwrap();

    group.bench_function("record (linear)", |b| {
        b.iter(|| histogram.record(black_box(1)))
    });
    group.bench_function("record (log)", |b| {
        b.iter(|| histogram.record(black_box(3_000_000_000)))
    });

    let mut histogram: Histogram<u32> =
        Histogram::new(1, 16_777_215, Resolution::BucketFactor(16)).unwrap();

    group.bench_function("record (bucket factor)", |b| {
        b.iter(|| histogram.record(black_box(9_000_000)))
    });
}

fn query(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram query");

    let mut histogram: Histogram =
        Histogram::new(1, 3_600_000_000, Resolution::SignificantFigures(3)).unwrap();
    for value in (1..3_600_000_000).step_by(1_000_003) {
        histogram.record(value).unwrap();
    }

    group.bench_function("value at percentile", |b| {
        b.iter(|| histogram.value_at_percentile(black_box(99.9)))
    });
    group.bench_function("percentiles", |b| {
        b.iter(|| histogram.percentiles(black_box(&[50.0, 90.0, 99.0, 99.9])))
    });
    group.bench_function("iter recorded", |b| {
        b.iter(|| histogram.iter_recorded().count())
    });
    group.bench_function("mean", |b| b.iter(|| histogram.mean()));
}

criterion_group!(benches, record, query);
criterion_main!(benches);
