use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use steward::Steward;

fn bench_submit_wait_roundtrip(c: &mut Criterion) {
    let counter = Steward::new(0u64);

    c.bench_function("submit_wait_roundtrip", |b| {
        b.iter(|| {
            counter
                .submit(|n| {
                    *n += 1;
                    *n
                })
                .wait()
                .unwrap()
        });
    });
}

fn bench_submit_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_burst");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("fire_and_forget_1000", |b| {
        let sink = Steward::new(0u64);
        b.iter(|| {
            for i in 0..1_000u64 {
                sink.submit(move |n| *n = black_box(i));
            }
            // One awaited read flushes the burst before the next iteration.
            sink.submit(|n| *n).wait().unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_submit_wait_roundtrip, bench_submit_burst);
criterion_main!(benches);
