use criterion::{criterion_group, criterion_main, Criterion};
use qbc::{lexer::tokenize, parser::parse};
use std::hint::black_box;

static INPUT: &str = include_str!("../data/sample.ns");

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = tokenize(INPUT).unwrap();

    c.bench_function("parser", |b| {
        b.iter(|| {
            let root = parse(black_box(&tokens)).unwrap();
            _ = black_box(root);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
