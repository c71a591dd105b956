//! Benchmarks for scroll recycling and structural changes.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use escalator::clock::ManualClock;
use escalator::updater::FixedMeasurer;
use escalator::{Escalator, EscalatorConfig, RowHeights, Section};

fn grid(rows: usize) -> Escalator {
    let config = EscalatorConfig {
        height: 600.0,
        default_row_height: RowHeights {
            body: Some(20.0),
            ..RowHeights::default()
        },
        ..EscalatorConfig::default()
    };
    let mut grid = Escalator::with_environment(
        config,
        Box::new(FixedMeasurer::default()),
        Box::new(ManualClock::new()),
    )
    .expect("valid config");
    grid.insert_columns(0, 10).expect("insert columns");
    grid.insert_rows(Section::Body, 0, rows)
        .expect("insert rows");
    grid.attach();
    grid
}

/// Small steps recycle a few rows at a time
fn bench_smooth_scroll(c: &mut Criterion) {
    let mut grid = grid(100_000);
    c.bench_function("smooth_scroll_7px", |b| {
        let mut top = 0.0;
        b.iter(|| {
            top = (top + 7.0) % 1_000_000.0;
            grid.set_scroll_top(black_box(top));
        });
    });
}

/// Jumps move the whole window
fn bench_jump_scroll(c: &mut Criterion) {
    let mut grid = grid(100_000);
    c.bench_function("jump_scroll", |b| {
        let mut top = 0.0;
        b.iter(|| {
            top = (top + 123_457.0) % 1_990_000.0;
            grid.set_scroll_top(black_box(top));
        });
    });
}

fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove");
    for count in [1_usize, 100, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut grid = grid(100_000);
            grid.set_scroll_top(50_000.0);
            b.iter(|| {
                grid.insert_rows(Section::Body, 2_000, count)
                    .expect("insert");
                grid.remove_rows(Section::Body, 2_000, count)
                    .expect("remove");
            });
        });
    }
    group.finish();
}

fn bench_spacers(c: &mut Criterion) {
    let mut grid = grid(10_000);
    for row in (0..10_000).step_by(50) {
        grid.set_spacer(row, 40.0).expect("spacer");
    }
    c.bench_function("scroll_with_spacers", |b| {
        let mut top = 0.0;
        b.iter(|| {
            top = (top + 31.0) % 200_000.0;
            grid.set_scroll_top(black_box(top));
        });
    });
}

criterion_group!(
    benches,
    bench_smooth_scroll,
    bench_jump_scroll,
    bench_insert_remove,
    bench_spacers
);
criterion_main!(benches);
