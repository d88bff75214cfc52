use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use prosetyped_engine::common_prefix;
use prosetyped_model::markdown;

fn generate_markdown(sections: usize) -> String {
    (0..sections)
        .map(|i| {
            format!(
                "## Section {i}\n\nSome *emphasis* and **strong** text in paragraph {i}.\n\n- item {i}\n- another `code` item\n\n"
            )
        })
        .collect()
}

fn bench_common_prefix(c: &mut Criterion) {
    let mut group = c.benchmark_group("common_prefix");
    group.sample_size(20);

    for sections in [10, 100] {
        let source = generate_markdown(sections);
        let prev = markdown::parse(&source);
        let identical = markdown::parse(&source);
        let appended = markdown::parse(&format!("{source}Trailing paragraph."));

        group.bench_with_input(BenchmarkId::new("identical", sections), &identical, |b, next| {
            b.iter(|| common_prefix(std::hint::black_box(&prev), next, &[]));
        });
        group.bench_with_input(BenchmarkId::new("appended", sections), &appended, |b, next| {
            b.iter(|| common_prefix(std::hint::black_box(&prev), next, &[]));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_common_prefix);
criterion_main!(benches);
