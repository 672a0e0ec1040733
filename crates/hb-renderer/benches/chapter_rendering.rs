//! Benchmarks for chapter parse and render throughput.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hb_renderer::{HtmlRenderer, parse};

/// Generate a chapter alternating prose with Python/JavaScript pairs.
fn generate_chapter(sections: usize) -> String {
    let mut md = String::with_capacity(sections * 400);
    md.push_str("# Chapter Title\n\n");

    for i in 0..sections {
        md.push_str(&format!("## Section {i}\n\n"));
        md.push_str("Compare the two versions. The **Python** one is shorter.\n\n");
        md.push_str(&format!(
            "```python\ndef step_{i}(items):\n    return [x * {i} for x in items if x > 0]\n```\n\n"
        ));
        md.push_str(&format!(
            "```javascript\nfunction step{i}(items) {{\n  return items.filter((x) => x > 0).map((x) => x * {i});\n}}\n```\n\n"
        ));
    }
    md
}

fn bench_parse(c: &mut Criterion) {
    let markdown = generate_chapter(20);

    c.bench_function("parse_20_sections", |b| {
        b.iter(|| parse(&markdown));
    });
}

fn bench_parse_and_render_varying_sizes(c: &mut Criterion) {
    let renderer = HtmlRenderer::new();
    let mut group = c.benchmark_group("parse_render_by_size");

    for sections in [5, 50, 200] {
        let markdown = generate_chapter(sections);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("sections", sections),
            &markdown,
            |b, md| {
                b.iter(|| parse(md).map(|doc| renderer.render(&doc)));
            },
        );
    }

    group.finish();
}

fn bench_render_compare_vs_plain(c: &mut Criterion) {
    let doc = parse(&generate_chapter(50)).unwrap();
    let compare = HtmlRenderer::new();
    let plain = HtmlRenderer::new().with_code_comparison(false);

    let mut group = c.benchmark_group("code_comparison");
    group.bench_function("enabled", |b| b.iter(|| compare.render(&doc)));
    group.bench_function("disabled", |b| b.iter(|| plain.render(&doc)));
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_parse_and_render_varying_sizes,
    bench_render_compare_vs_plain,
);

criterion_main!(benches);
