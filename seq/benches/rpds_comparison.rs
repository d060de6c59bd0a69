use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rrb_seq::Sequence;

pub fn collect(c: &mut Criterion) {
    let input = vec![0; 10000];
    let mut group = c.benchmark_group("collect");

    group.bench_function("ours 10000", |b| {
        b.iter(|| black_box(input.iter().copied().collect::<Sequence<i32>>()))
    });

    group.bench_function("rpds 10000", |b| {
        b.iter(|| black_box(input.iter().copied().collect::<rpds::Vector<i32>>()))
    });
}

pub fn push_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_back");

    group.bench_function("ours 10000", |b| {
        b.iter(|| {
            let mut seq = Sequence::new();
            for i in 0..10000 {
                seq = seq.append(i);
            }
            black_box(seq)
        })
    });

    group.bench_function("rpds 10000", |b| {
        b.iter(|| {
            let mut vec = rpds::Vector::new();
            for i in 0..10000 {
                vec = vec.push_back(i);
            }
            black_box(vec)
        })
    });
}

pub fn count(c: &mut Criterion) {
    let input = vec![0; 10000];
    let seq: Sequence<u32> = input.iter().copied().collect();
    let rpds: rpds::Vector<u32> = input.iter().copied().collect();
    let mut group = c.benchmark_group("iter");

    group.bench_function("ours 10000", |b| {
        b.iter(|| black_box(seq.iter().count()));
    });

    group.bench_function("rpds 10000", |b| {
        b.iter(|| black_box(rpds.iter().count()));
    });
}

pub fn get(c: &mut Criterion) {
    let input = vec![0; 10000];
    let seq: Sequence<u32> = input.iter().copied().collect();
    let rpds: rpds::Vector<u32> = input.iter().copied().collect();
    let mut group = c.benchmark_group("get");

    group.bench_function("ours 10000", |b| {
        b.iter(|| {
            for i in 0..10000 {
                black_box(seq.get(i));
            }
        });
    });

    group.bench_function("rpds 10000", |b| {
        b.iter(|| {
            for i in 0..10000 {
                black_box(rpds.get(i));
            }
        });
    });
}

criterion_group!(benches, collect, push_back, count, get);
criterion_main!(benches);
