//! Source tables and the per-entity series provider.

mod loader;
mod provider;
mod table;

pub use loader::{
    load_emissions, load_emissions_file, load_gdp, load_gdp_file, load_temperature,
    load_temperature_file, TemperatureRecord, TemperatureTable, WORLD_CODE, WORLD_NAME,
};
pub use provider::{ClimateData, DataSources, SeriesProvider};
pub use table::{EntityInfo, MetricTable, Observation};
