use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fbxstats_core::extraction::sections::split_sections;
use fbxstats_core::logging::structured::LogContext;
use fbxstats_core::ReportSnapshot;

const STATUS_REPORT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/testdata/status_report.txt"
));

fn bench_split_sections(c: &mut Criterion) {
    c.bench_function("split_sections", |b| {
        b.iter(|| split_sections(black_box(STATUS_REPORT)))
    });
}

fn bench_parse_snapshot(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let ctx = LogContext::new("bench");

    c.bench_function("parse_snapshot", |b| {
        b.iter(|| ReportSnapshot::parse(black_box(STATUS_REPORT.to_string()), now, &Utc, &ctx))
    });
}

criterion_group!(benches, bench_split_sections, bench_parse_snapshot);
criterion_main!(benches);
