use chrono::{Days, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use pulse_throw_client::DailySnapshot;
use pulse_throw_client::workload::{compute_acr, workload_history};
use std::hint::black_box;

fn season(days: u64) -> Vec<DailySnapshot> {
    let opening = NaiveDate::from_ymd_opt(2022, 3, 1).expect("date");
    (0..days)
        .filter(|d| d % 5 != 4) // one rest day in five
        .map(|d| DailySnapshot {
            date: opening + Days::new(d),
            throw_count: 60,
            high_effort_throw_count: 12,
            daily_workload: 4000.0 + (d % 7) as f64 * 900.0,
            norm_daily_workload: 5.5 + (d % 7) as f64 * 1.25,
            acute_workload: None,
            chronic_workload: None,
            norm_acute_workload: None,
            norm_chronic_workload: None,
            workload_ratio: None,
            projected_one_day_workloads: Vec::new(),
        })
        .collect()
}

fn bench_workload(c: &mut Criterion) {
    let snapshots = season(180);
    c.bench_function("compute_acr_season", |b| {
        b.iter(|| compute_acr(black_box(&snapshots), None, true).expect("acr"))
    });
    c.bench_function("workload_history_season", |b| {
        b.iter(|| workload_history(black_box(&snapshots), true))
    });
}

criterion_group!(benches, bench_workload);
criterion_main!(benches);
