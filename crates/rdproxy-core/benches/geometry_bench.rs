//! Criterion benchmarks for [`Rect`] operations on the drawing hot path.
//!
//! While the on-screen display is visible, every module fill is clipped
//! against the banner with [`Rect::subtract`].  A remote desktop can emit
//! thousands of fills per second, so this must stay in the nanosecond range.
//!
//! Run with:
//! ```bash
//! cargo bench --package rdproxy-core --bench geometry_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rdproxy_core::Rect;

fn bench_subtract(c: &mut Criterion) {
    let banner = Rect::new(300, 0, 200, 48);
    let mut group = c.benchmark_group("subtract");

    group.bench_function("disjoint", |b| {
        let fill = Rect::new(0, 300, 64, 64);
        b.iter(|| black_box(fill).subtract(black_box(&banner)))
    });

    group.bench_function("crossing_banner", |b| {
        let fill = Rect::new(250, 0, 300, 100);
        b.iter(|| black_box(fill).subtract(black_box(&banner)))
    });

    group.bench_function("full_screen", |b| {
        let fill = Rect::new(0, 0, 800, 600);
        b.iter(|| black_box(fill).subtract(black_box(&banner)))
    });

    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let screen = Rect::new(0, 0, 1920, 1080);
    c.bench_function("intersect_partial", |b| {
        let r = Rect::new(1800, 1000, 400, 400);
        b.iter(|| black_box(screen).intersect(black_box(&r)))
    });
}

criterion_group!(benches, bench_subtract, bench_intersect);
criterion_main!(benches);
