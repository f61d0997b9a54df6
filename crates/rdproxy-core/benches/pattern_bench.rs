//! Criterion benchmarks for pattern rule classification.
//!
//! Classification runs once per session start for every rule set of the
//! policy.  Policies imported from large deployments carry hundreds of rules,
//! so the scan must stay linear in the rule-set length.
//!
//! Run with:
//! ```bash
//! cargo bench --package rdproxy-core --bench pattern_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rdproxy_core::pattern::{
    contains_kbd_or_ocr_pattern, contains_kbd_pattern, contains_ocr_pattern, parse_rules,
};

// ── Rule-set fixture builders ─────────────────────────────────────────────────

/// Builds a rule set of `n` rules cycling through every rule family.
///
/// The only keyboard rule is the last one, the worst case for
/// [`contains_kbd_pattern`].
fn build_rule_set(n: usize) -> String {
    const FAMILIES: &[&str] = &[
        "Bloc-notes",
        "$ocr:regedit",
        "$content,ocr:cmd.exe",
        "$exact-regex,ocr:^powershell$",
        "$ocm:10.10.46.0/24:3389",
    ];
    let mut rules: Vec<String> = (0..n.saturating_sub(1))
        .map(|i| FAMILIES[i % FAMILIES.len()].to_string())
        .collect();
    rules.push("$kbd:format c:".to_string());
    rules.join("\x01")
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_classify_small_policy(c: &mut Criterion) {
    let set = " $kbd:gpedit\x01AT\x01$ocr-kbd:cmd";
    let mut group = c.benchmark_group("classify_small");

    group.bench_function("kbd", |b| b.iter(|| contains_kbd_pattern(black_box(set))));
    group.bench_function("ocr", |b| b.iter(|| contains_ocr_pattern(black_box(set))));
    group.bench_function("kbd_or_ocr", |b| {
        b.iter(|| contains_kbd_or_ocr_pattern(black_box(set)))
    });

    group.finish();
}

fn bench_classify_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_scaling");

    for count in [10usize, 100, 1000] {
        let set = build_rule_set(count);
        group.bench_with_input(BenchmarkId::new("kbd_last_rule", count), &set, |b, set| {
            b.iter(|| contains_kbd_pattern(black_box(set)))
        });
    }

    group.finish();
}

fn bench_parse_rules(c: &mut Criterion) {
    let set = build_rule_set(100);
    c.bench_function("parse_rules_100", |b| b.iter(|| parse_rules(black_box(&set))));
}

criterion_group!(
    benches,
    bench_classify_small_policy,
    bench_classify_scaling,
    bench_parse_rules,
);
criterion_main!(benches);
