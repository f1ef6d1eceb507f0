//! Series lookup over loaded tables.

use crate::core::{Granularity, PeriodRange, TimeSeries};
use crate::data::loader::{
    load_emissions, load_emissions_file, load_gdp, load_gdp_file, load_temperature,
    load_temperature_file, TemperatureTable,
};
use crate::data::table::{EntityInfo, MetricTable};
use crate::error::{ForecastError, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Read-only access to per-entity historical series.
pub trait SeriesProvider {
    /// Cleaned, chronologically ordered series of one entity.
    ///
    /// Rows sharing a period are folded by their mean. With `bounds`, only
    /// periods whose calendar year lies inside the range are kept.
    ///
    /// # Errors
    /// `NotFound` if the entity has no rows (inside the bounds).
    fn series(&self, entity: &str, bounds: Option<PeriodRange>) -> Result<TimeSeries>;

    /// Entities available for selection, sorted by code.
    fn entities(&self) -> Vec<EntityInfo>;

    /// Smallest and largest year present, for range sliders.
    fn period_range(&self) -> Option<PeriodRange>;

    /// Display name of an entity code.
    fn entity_name(&self, code: &str) -> Option<String>;

    /// Annual series of one entity; monthly rows are folded into yearly means.
    fn annual_series(&self, entity: &str, bounds: Option<PeriodRange>) -> Result<TimeSeries> {
        let series = self.series(entity, bounds)?;
        match series.granularity() {
            Some(Granularity::Monthly) => series.to_annual(),
            _ => Ok(series),
        }
    }
}

impl SeriesProvider for MetricTable {
    fn series(&self, entity: &str, bounds: Option<PeriodRange>) -> Result<TimeSeries> {
        let rows = self
            .rows_for(entity)
            .filter(|o| o.value.is_finite())
            .filter(|o| bounds.map_or(true, |b| b.contains(&o.period)))
            .map(|o| (o.period, o.value));
        let series = TimeSeries::from_observations(rows)?;
        if series.is_empty() {
            return Err(ForecastError::NotFound {
                entity: entity.to_string(),
            });
        }

        debug!(
            metric = self.metric(),
            entity,
            len = series.len(),
            "built entity series"
        );
        let label = MetricTable::entity_name(self, entity).unwrap_or(entity).to_string();
        Ok(series.with_label(label))
    }

    fn entities(&self) -> Vec<EntityInfo> {
        MetricTable::entities(self)
    }

    fn period_range(&self) -> Option<PeriodRange> {
        self.year_range()
    }

    fn entity_name(&self, code: &str) -> Option<String> {
        MetricTable::entity_name(self, code).map(str::to_string)
    }
}

/// Locations of the three source tables.
#[derive(Debug, Clone, Copy)]
pub struct DataSources<'a> {
    pub emissions: &'a Path,
    pub temperature: &'a Path,
    pub gdp: &'a Path,
}

/// The dashboard's datasets, loaded once and read-only afterwards.
///
/// Handlers share one instance through an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClimateData {
    emissions: MetricTable,
    temperature: TemperatureTable,
    temperature_monthly: MetricTable,
    gdp: MetricTable,
}

impl ClimateData {
    /// Bundle already loaded tables.
    pub fn new(emissions: MetricTable, temperature: TemperatureTable, gdp: MetricTable) -> Self {
        let temperature_monthly = temperature.monthly_anomalies();
        Self {
            emissions,
            temperature,
            temperature_monthly,
            gdp,
        }
    }

    /// Load the three tables from CSV files.
    pub fn load(sources: DataSources<'_>) -> Result<Self> {
        let data = Self::new(
            load_emissions_file(sources.emissions)?,
            load_temperature_file(sources.temperature)?,
            load_gdp_file(sources.gdp)?,
        );
        data.log_summary();
        Ok(data)
    }

    /// Load the three tables from in-memory or streamed CSV sources.
    pub fn from_readers<E: Read, T: Read, G: Read>(
        emissions: E,
        temperature: T,
        gdp: G,
    ) -> Result<Self> {
        let data = Self::new(
            load_emissions(emissions)?,
            load_temperature(temperature)?,
            load_gdp(gdp)?,
        );
        data.log_summary();
        Ok(data)
    }

    fn log_summary(&self) {
        info!(
            emissions = self.emissions.len(),
            temperature = self.temperature.len(),
            gdp = self.gdp.len(),
            "climate datasets ready"
        );
    }

    /// Per-country CO₂ emissions (annual).
    pub fn emissions(&self) -> &MetricTable {
        &self.emissions
    }

    /// Raw monthly temperature records with all anomaly columns.
    pub fn temperature(&self) -> &TemperatureTable {
        &self.temperature
    }

    /// Monthly global temperature anomalies under the `WLD` entity.
    pub fn temperature_anomalies(&self) -> &MetricTable {
        &self.temperature_monthly
    }

    /// Per-country GDP (annual, current US$).
    pub fn gdp(&self) -> &MetricTable {
        &self.gdp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;

    fn table() -> MetricTable {
        let mut t = MetricTable::new("co2");
        t.push("USA", "United States", Period::year(2002), 6.0);
        t.push("USA", "United States", Period::year(2000), 4.0);
        t.push("USA", "United States", Period::year(2000), 2.0);
        t.push("USA", "United States", Period::year(2001), f64::NAN);
        t.push("FRA", "France", Period::year(2000), 1.0);
        t
    }

    #[test]
    fn series_is_sorted_and_deduplicated_by_mean() {
        let series = table().series("USA", None).unwrap();
        assert_eq!(series.periods(), &[Period::year(2000), Period::year(2002)]);
        assert_eq!(series.values(), &[3.0, 6.0]);
        assert_eq!(series.label(), Some("United States"));
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let err = table().series("XYZ", None).unwrap_err();
        assert_eq!(
            err,
            ForecastError::NotFound {
                entity: "XYZ".to_string()
            }
        );
    }

    #[test]
    fn bounds_filter_and_empty_window_is_not_found() {
        let t = table();
        let series = t.series("USA", Some(PeriodRange { start: 2001, end: 2005 })).unwrap();
        assert_eq!(series.len(), 1);

        let err = t.series("FRA", Some(PeriodRange { start: 2010, end: 2011 }));
        assert!(matches!(err, Err(ForecastError::NotFound { .. })));
    }

    #[test]
    fn annual_series_folds_months() {
        let mut t = MetricTable::new("temp");
        for month in 1..=12 {
            t.push("WLD", "World", Period::month(1990, month).unwrap(), month as f64);
        }
        t.push("WLD", "World", Period::month(1991, 1).unwrap(), 2.0);

        let annual = t.annual_series("WLD", None).unwrap();
        assert_eq!(annual.periods(), &[Period::year(1990), Period::year(1991)]);
        assert_eq!(annual.values(), &[6.5, 2.0]);
    }

    #[test]
    fn provider_metadata() {
        let t = table();
        assert_eq!(SeriesProvider::entities(&t).len(), 2);
        assert_eq!(
            SeriesProvider::period_range(&t),
            Some(PeriodRange { start: 2000, end: 2002 })
        );
        assert_eq!(SeriesProvider::entity_name(&t, "FRA"), Some("France".to_string()));
    }
}
