//! CSV loaders for the three source tables.
//!
//! Header problems are fatal (`Parse` at line 1); malformed data rows are
//! skipped, counted on the resulting table and reported with `warn!`.

use crate::core::Period;
use crate::data::table::MetricTable;
use crate::error::{ForecastError, Result};
use csv::StringRecord;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Entity code of the global temperature aggregate.
pub const WORLD_CODE: &str = "WLD";
/// Display name of the global temperature aggregate.
pub const WORLD_NAME: &str = "World";

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))
}

/// Lowercase a header and fold spaces to underscores (`Country Code` -> `country_code`).
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Replace the header record with its normalised form and check that every
/// `required` column is present.
///
/// Serde row structs and positional lookups both see the normalised names,
/// so `Country Code` and `country_code` resolve to the same column.
fn normalize_headers<R: Read>(
    csv: &mut csv::Reader<R>,
    required: &[&str],
) -> Result<StringRecord> {
    let headers: StringRecord = csv.headers()?.iter().map(normalize_header).collect();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ForecastError::Parse {
                line: 1,
                message: format!("missing column '{}'", column),
            });
        }
    }
    csv.set_headers(headers.clone());
    Ok(headers)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
struct EmissionRow {
    country_code: String,
    #[serde(default)]
    country_name: String,
    year: i32,
    value: Option<f64>,
}

/// Load the long-format emissions table
/// (`country_code,country_name,year,value`).
///
/// Rows with an empty or non-finite value carry no observation and are
/// dropped silently; rows that fail to parse are skipped and counted.
pub fn load_emissions<R: Read>(reader: R) -> Result<MetricTable> {
    let mut csv = csv_reader(reader);
    normalize_headers(&mut csv, &["country_code", "country_name", "year", "value"])?;

    let mut table = MetricTable::new("co2_emissions");
    let mut skipped = 0;
    for row in csv.deserialize::<EmissionRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "skipping malformed emissions row");
                continue;
            }
        };
        if row.country_code.is_empty() {
            skipped += 1;
            continue;
        }
        if let Some(value) = finite(row.value) {
            table.push(&row.country_code, &row.country_name, Period::year(row.year), value);
        }
    }
    table.record_skipped(skipped);

    info!(rows = table.len(), skipped, "loaded emissions table");
    Ok(table)
}

/// One row of the monthly global temperature table.
///
/// Field names are the normalised headers (`Five-Year Anomaly` ->
/// `five_year_anomaly`). Anomaly columns are optional; empty cells stay
/// `None` until a consumer imputes or drops them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperatureRecord {
    pub year: i32,
    pub month: u32,
    #[serde(rename = "monthly_anomaly")]
    pub monthly: Option<f64>,
    #[serde(rename = "five_year_anomaly", default)]
    pub five_year: Option<f64>,
    #[serde(rename = "ten_year_anomaly", default)]
    pub ten_year: Option<f64>,
    #[serde(rename = "twenty_year_anomaly", default)]
    pub twenty_year: Option<f64>,
    #[serde(rename = "annual_anomaly", default)]
    pub annual: Option<f64>,
}

impl TemperatureRecord {
    pub fn period(&self) -> Result<Period> {
        Period::month(self.year, self.month)
    }
}

/// The monthly global temperature anomaly table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureTable {
    records: Vec<TemperatureRecord>,
    skipped_rows: usize,
}

impl TemperatureTable {
    pub fn new(records: Vec<TemperatureRecord>) -> Self {
        Self {
            records,
            skipped_rows: 0,
        }
    }

    pub fn records(&self) -> &[TemperatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Monthly anomalies as a long table under the `WLD` entity.
    pub fn monthly_anomalies(&self) -> MetricTable {
        let mut table = MetricTable::new("temperature_anomaly");
        for record in &self.records {
            if let (Ok(period), Some(value)) = (record.period(), finite(record.monthly)) {
                table.push(WORLD_CODE, WORLD_NAME, period, value);
            }
        }
        table
    }
}

/// Load the monthly temperature anomaly table.
pub fn load_temperature<R: Read>(reader: R) -> Result<TemperatureTable> {
    let mut csv = csv_reader(reader);
    normalize_headers(&mut csv, &["year", "month", "monthly_anomaly"])?;

    let mut records = Vec::new();
    let mut skipped = 0;
    for row in csv.deserialize::<TemperatureRecord>() {
        match row {
            Ok(record) if (1..=12).contains(&record.month) => records.push(record),
            Ok(record) => {
                skipped += 1;
                warn!(year = record.year, month = record.month, "skipping row with invalid month");
            }
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "skipping malformed temperature row");
            }
        }
    }

    info!(rows = records.len(), skipped, "loaded temperature table");
    Ok(TemperatureTable {
        records,
        skipped_rows: skipped,
    })
}

/// Load the wide-format GDP table
/// (`country_name,country_code,<year>,<year>,...`) and melt it to long
/// format.
///
/// Columns whose header is not a year (such as a trailing unnamed column)
/// are ignored, as are empty cells.
pub fn load_gdp<R: Read>(reader: R) -> Result<MetricTable> {
    let mut csv = csv_reader(reader);
    let headers = normalize_headers(&mut csv, &["country_name", "country_code"])?;

    let position = |wanted: &str| headers.iter().position(|h| h == wanted);
    let (code_idx, name_idx) = match (position("country_code"), position("country_name")) {
        (Some(code), Some(name)) => (code, name),
        _ => {
            return Err(ForecastError::Parse {
                line: 1,
                message: "missing country columns".to_string(),
            })
        }
    };
    let year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| h.trim().parse::<i32>().ok().map(|year| (idx, year)))
        .collect();
    debug!(year_columns = year_columns.len(), "resolved GDP year columns");

    let mut table = MetricTable::new("gdp");
    let mut skipped = 0;
    for record in csv.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "skipping malformed GDP row");
                continue;
            }
        };
        let code = record.get(code_idx).unwrap_or_default();
        if code.is_empty() {
            skipped += 1;
            continue;
        }
        let name = record.get(name_idx).unwrap_or_default();

        for &(idx, year) in &year_columns {
            let cell = record.get(idx).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    table.push(code, name, Period::year(year), value)
                }
                Ok(_) => {}
                Err(_) => {
                    skipped += 1;
                    warn!(entity = code, year, cell, "skipping unparseable GDP cell");
                }
            }
        }
    }
    table.record_skipped(skipped);

    info!(rows = table.len(), skipped, "loaded GDP table");
    Ok(table)
}

pub fn load_emissions_file(path: impl AsRef<Path>) -> Result<MetricTable> {
    load_emissions(open(path.as_ref())?)
}

pub fn load_temperature_file(path: impl AsRef<Path>) -> Result<TemperatureTable> {
    load_temperature(open(path.as_ref())?)
}

pub fn load_gdp_file(path: impl AsRef<Path>) -> Result<MetricTable> {
    load_gdp(open(path.as_ref())?)
}
