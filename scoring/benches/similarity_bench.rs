use criterion::{criterion_group, criterion_main, Criterion};
use scoring::{cosine_similarity, TermVector};

fn synthetic(terms: usize, stride: usize) -> TermVector {
    (0..terms).map(|i| (format!("t{}", i * stride), (i % 7 + 1) as u32)).collect()
}

fn bench_cosine(c: &mut Criterion) {
    let large = synthetic(5_000, 1);
    let small = synthetic(50, 3);
    c.bench_function("cosine_large_small", |b| b.iter(|| cosine_similarity(&large, &small)));
    c.bench_function("cosine_small_large", |b| b.iter(|| cosine_similarity(&small, &large)));
    c.bench_function("term_vector_from_text", |b| {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(200);
        b.iter(|| TermVector::from_text(&text))
    });
}

criterion_group!(benches, bench_cosine);
criterion_main!(benches);
