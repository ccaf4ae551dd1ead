//! Template benchmarks — tokenizing and structural matching.
//!
//! Measures: template and path tokenizing, matching hits, misses and
//! percent-decoded segments.

use rota::{tokenize_path, tokenize_template, Template};

fn main() {
    divan::main();
}

#[divan::bench(args = ["/", "/abc/{foo}/{bar}", "/ab\\/cd/{qq=de\\}f}/{cd}"])]
fn tokenize_templates(template: &str) -> usize {
    tokenize_template(divan::black_box(template)).len()
}

#[divan::bench(args = ["/", "/abc/def/gh/ij", "/abc/%D0%A1%D0%BE%D0%BB%D1%8C/a+b"])]
fn tokenize_paths(path: &str) -> usize {
    tokenize_path(divan::black_box(path)).len()
}

#[divan::bench]
fn match_hit(bencher: divan::Bencher) {
    let template = Template::parse("/abc/{foo}/{bar}");
    bencher.bench_local(|| template.matches("/abc/def/gh/ij"));
}

#[divan::bench]
fn match_miss(bencher: divan::Bencher) {
    let template = Template::parse("/abc/{name=foo}");
    bencher.bench_local(|| template.matches("/abc/def"));
}

#[divan::bench]
fn match_encoded(bencher: divan::Bencher) {
    let template = Template::parse("/abc/{name}");
    bencher.bench_local(|| template.matches("/abc/%D0%A1%D0%BE%D0%BB%D1%8C"));
}

#[divan::bench(args = [1, 16, 128])]
fn match_long_tail(bencher: divan::Bencher, segments: usize) {
    let template = Template::parse("/a");
    let path = "/a".repeat(segments + 1);
    bencher.bench_local(|| template.matches(&path));
}
