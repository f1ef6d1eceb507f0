//! Data shaping for the exploratory panels.

use crate::core::{Period, PeriodRange};
use crate::data::{MetricTable, SeriesProvider};
use crate::dashboard::chart::LineSeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Year × month grid of values; absent months are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub title: String,
    /// Row labels, ascending.
    pub years: Vec<i32>,
    /// Column labels, 1..=12.
    pub months: Vec<u32>,
    /// `cells[row][month - 1]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl HeatmapGrid {
    pub fn cell(&self, year: i32, month: u32) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = usize::try_from(month).ok()?.checked_sub(1)?;
        self.cells.get(row)?.get(col).copied().flatten()
    }
}

/// Pivot an entity's monthly series into a year × month grid.
pub fn heatmap<P: SeriesProvider>(
    provider: &P,
    entity: &str,
    range: Option<PeriodRange>,
) -> Result<HeatmapGrid> {
    let series = provider.series(entity, range)?;
    let mut rows: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
    for (period, value) in series.iter() {
        match period {
            Period::Month { year, month } => {
                let row = rows.entry(year).or_insert_with(|| vec![None; 12]);
                row[(month - 1) as usize] = Some(value);
            }
            Period::Year(_) => {
                return Err(ForecastError::InvalidParameter(format!(
                    "heatmap needs monthly data for '{}'",
                    entity
                )))
            }
        }
    }

    let (years, cells) = rows.into_iter().unzip();
    Ok(HeatmapGrid {
        title: "Monthly Temperature Anomalies by Year".to_string(),
        years,
        months: (1..=12).collect(),
        cells,
    })
}

/// Annual means of an entity's series within a year range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub title: String,
    pub y_label: String,
    pub line: LineSeries,
}

pub fn trend<P: SeriesProvider>(
    provider: &P,
    entity: &str,
    range: Option<PeriodRange>,
) -> Result<TrendChart> {
    let annual = provider.annual_series(entity, range)?;
    let (start, end) = match (annual.first_period(), annual.last_period()) {
        (Some(first), Some(last)) => (first.calendar_year(), last.calendar_year()),
        _ => {
            return Err(ForecastError::NotFound {
                entity: entity.to_string(),
            })
        }
    };
    Ok(TrendChart {
        title: format!("Annual Temperature Anomalies ({}-{})", start, end),
        y_label: "Temperature Anomaly (°C)".to_string(),
        line: LineSeries::from_series("Annual Mean", &annual),
    })
}

/// Mean value of one entity over the selected years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethEntry {
    pub code: String,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethMap {
    pub title: String,
    pub range: PeriodRange,
    /// Sorted by entity code.
    pub entries: Vec<ChoroplethEntry>,
}

/// Per-entity mean of all finite rows whose year lies in `range`.
///
/// # Errors
/// `EmptyData` when no entity has rows in the range.
pub fn choropleth(table: &MetricTable, range: PeriodRange) -> Result<ChoroplethMap> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for obs in table.observations() {
        if obs.value.is_finite() && range.contains(&obs.period) {
            let entry = sums.entry(obs.entity.as_str()).or_insert((0.0, 0));
            entry.0 += obs.value;
            entry.1 += 1;
        }
    }
    if sums.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let entries = sums
        .into_iter()
        .map(|(code, (sum, count))| ChoroplethEntry {
            code: code.to_string(),
            name: table.entity_name(code).unwrap_or(code).to_string(),
            value: sum / count as f64,
        })
        .collect();
    Ok(ChoroplethMap {
        title: format!("Average CO2 Emissions ({}-{})", range.start, range.end),
        range,
        entries,
    })
}
