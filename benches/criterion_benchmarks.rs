use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxips::engine;
use oxips::ips::Patch;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

fn mutate(base: &[u8], stride: usize) -> Vec<u8> {
    let mut out = base.to_vec();
    for i in (0..out.len()).step_by(stride.max(1)) {
        out[i] = out[i].wrapping_add(1);
    }
    out
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    for size in [64 * 1024usize, 1024 * 1024] {
        let original = gen_data(size, 123);
        for stride in [64usize, 4096] {
            let modified = mutate(&original, stride);
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}k", size / 1024), stride),
                &(&original, &modified),
                |b, (original, modified)| {
                    b.iter(|| engine::create(black_box(original), black_box(modified)).unwrap())
                },
            );
        }
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    for size in [64 * 1024usize, 1024 * 1024] {
        let original = gen_data(size, 123);
        let modified = mutate(&original, 256);
        let patch = engine::create(&original, &modified).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}k", size / 1024)),
            &(&original, &patch),
            |b, (original, patch)| {
                b.iter(|| engine::apply(black_box(original), &[black_box(patch)]).unwrap())
            },
        );
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let original = gen_data(1024 * 1024, 7);
    let modified = mutate(&original, 128);
    let patch = engine::create(&original, &modified).unwrap();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(patch.len() as u64));
    group.bench_function("1m_stride128", |b| {
        b.iter(|| Patch::parse(black_box(&patch)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_create, bench_apply, bench_parse);
criterion_main!(benches);
