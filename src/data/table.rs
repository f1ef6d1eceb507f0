//! In-memory long-format metric tables.

use crate::core::{Period, PeriodRange};
use serde::Serialize;
use std::collections::BTreeMap;

/// One raw `(entity, period, value)` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Entity code (ISO 3166-1 alpha-3, or `WLD`)
    pub entity: String,
    pub period: Period,
    pub value: f64,
}

/// Entity code and display name, as shown in selectors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EntityInfo {
    pub code: String,
    pub name: String,
}

/// A long-format table of observations for one metric.
///
/// Rows keep their source order and may repeat a period; consumers fold
/// duplicates when building series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    metric: String,
    observations: Vec<Observation>,
    names: BTreeMap<String, String>,
    skipped_rows: usize,
}

impl MetricTable {
    /// Create an empty table for a named metric.
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Default::default()
        }
    }

    /// Append a row, registering the entity's display name.
    pub fn push(&mut self, entity: &str, name: &str, period: Period, value: f64) {
        if !self.names.contains_key(entity) {
            let display = if name.is_empty() { entity } else { name };
            self.names.insert(entity.to_string(), display.to_string());
        }
        self.observations.push(Observation {
            entity: entity.to_string(),
            period,
            value,
        });
    }

    pub(crate) fn record_skipped(&mut self, count: usize) {
        self.skipped_rows += count;
    }

    /// Name of the metric (for chart titles and logs).
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Data rows that were malformed at load time and left out.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Rows of one entity, in source order.
    pub fn rows_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| o.entity == entity)
    }

    /// Display name of an entity code.
    pub fn entity_name(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// All entities with at least one row, sorted by code.
    pub fn entities(&self) -> Vec<EntityInfo> {
        self.names
            .iter()
            .map(|(code, name)| EntityInfo {
                code: code.clone(),
                name: name.clone(),
            })
            .collect()
    }

    /// Smallest and largest calendar year present.
    pub fn year_range(&self) -> Option<PeriodRange> {
        let min = self.observations.iter().map(|o| o.period.calendar_year()).min()?;
        let max = self.observations.iter().map(|o| o.period.calendar_year()).max()?;
        Some(PeriodRange { start: min, end: max })
    }
}
