use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rrb_seq::Sequence;

pub fn prepend(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepend");

    group.bench_function("10000", |b| {
        b.iter(|| {
            let mut seq = Sequence::new();
            for i in 0..10000 {
                seq = seq.prepend(i);
            }
            black_box(seq)
        })
    });

    group.bench_function("10000 in place", |b| {
        b.iter(|| {
            let mut seq = Sequence::new();
            for i in 0..10000 {
                seq.push_front(i);
            }
            black_box(seq)
        })
    });
}

pub fn concat(c: &mut Criterion) {
    let left: Sequence<u32> = (0..10000).collect();
    let right: Sequence<u32> = (0..10000).collect();
    let small: Sequence<u32> = (0..20).collect();
    let mut group = c.benchmark_group("concat");

    group.bench_function("10000 + 10000", |b| {
        b.iter(|| black_box(left.concat(&right)))
    });

    group.bench_function("10000 + 20", |b| b.iter(|| black_box(left.concat(&small))));

    group.bench_function("20 + 10000", |b| b.iter(|| black_box(small.concat(&left))));

    group.bench_function("repeated 100 x 20", |b| {
        b.iter(|| {
            let mut acc = Sequence::new();
            for _ in 0..100 {
                acc = acc.concat(&small);
            }
            black_box(acc)
        })
    });
}

pub fn slice(c: &mut Criterion) {
    let input: Sequence<u32> = (0..10000).collect();
    let mut group = c.benchmark_group("slice");

    group.bench_function("100 out of 10k", |b| {
        b.iter(|| black_box(input.slice(5000, 5100)))
    });

    group.bench_function("iter 100 out of 10k", |b| {
        let sliced = input.slice(5000, 5100);
        b.iter(|| black_box(sliced.iter().count()));
    });

    group.bench_function("tail of 10k", |b| b.iter(|| black_box(input.tail())));
}

pub fn update(c: &mut Criterion) {
    let input: Sequence<u32> = (0..10000).collect();
    let mut group = c.benchmark_group("update");

    group.bench_function("every index of 10k", |b| {
        b.iter(|| {
            let mut seq = input.clone();
            for i in 0..10000 {
                seq = seq.update(i, 1);
            }
            black_box(seq)
        })
    });
}

criterion_group!(benches, prepend, concat, slice, update);
criterion_main!(benches);
