//! Loads the climate datasets and runs every dashboard panel once.
//!
//! ```text
//! cargo run --example dashboard --features telemetry -- dashboard.toml [ENTITY] [YEAR]
//! ```
//!
//! Without a config file the default data paths under `data/` are used.

use climate_forecast::dashboard::{DashboardState, HandlerRegistry, PanelRequest, CO2_FORECAST};
use climate_forecast::data::ClimateData;
use climate_forecast::engine::ForecastRequest;
use climate_forecast::prelude::DashboardConfig;
use climate_forecast::telemetry::init_default_tracing;
use std::sync::Arc;

fn main() -> climate_forecast::Result<()> {
    let _ = init_default_tracing();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    let entity = args.next();
    let target_year = args.next().and_then(|y| y.parse().ok());

    let data = Arc::new(ClimateData::load(config.data.sources())?);
    let state = DashboardState::new(data, config);
    let registry = HandlerRegistry::with_dashboard_handlers();

    println!("=== Climate Dashboard ===\n");
    for name in registry.names() {
        let request = if name == CO2_FORECAST {
            PanelRequest::Forecast(ForecastRequest {
                entity: entity.clone(),
                target_year,
            })
        } else {
            PanelRequest::Empty
        };

        let response = registry.dispatch(&state, name, &request);
        match response.to_json() {
            Ok(json) => println!("{}: {}\n", name, json),
            Err(err) => println!("{}: could not serialise response: {}\n", name, err),
        }
    }

    Ok(())
}
