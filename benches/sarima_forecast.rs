//! Benchmarks for fitting and forecasting the dashboard SARIMA model.

use climate_forecast::core::TimeSeries;
use climate_forecast::engine::ForecastEngine;
use climate_forecast::models::arima::SARIMA;
use climate_forecast::models::Forecaster;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_series(n: usize) -> TimeSeries {
    let values = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.8 * t
                + 12.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
                + ((i * 31 + 7) % 17) as f64 * 0.25
        })
        .collect();
    TimeSeries::annual(2020 - n as i32 + 1, values).unwrap()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");

    for size in [30, 60, 120, 240].iter() {
        let series = generate_series(*size);
        group.bench_with_input(BenchmarkId::new("dashboard_order", size), size, |b, _| {
            b.iter(|| {
                let mut model = SARIMA::dashboard();
                model.fit(black_box(&series)).unwrap();
                model
            })
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast_engine");
    let engine = ForecastEngine::new();

    for horizon in [1, 10, 50].iter() {
        let series = generate_series(60);
        group.bench_with_input(BenchmarkId::new("fit_and_forecast", horizon), horizon, |b, &h| {
            b.iter(|| engine.forecast(black_box(&series), 2020 + h, 0.9).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_forecast);
criterion_main!(benches);
