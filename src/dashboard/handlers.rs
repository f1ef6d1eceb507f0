//! Named panel handlers and their dispatch.
//!
//! Each handler turns one [`PanelRequest`] into one [`PanelResponse`].
//! Errors never cross this boundary: they are logged and replaced by a
//! placeholder the UI can show as-is.

use crate::config::DashboardConfig;
use crate::core::PeriodRange;
use crate::dashboard::chart::{ForecastChart, RegressionChart};
use crate::dashboard::panels::{choropleth, heatmap, trend, ChoroplethMap, HeatmapGrid, TrendChart};
use crate::data::{ClimateData, SeriesProvider, WORLD_CODE};
use crate::engine::{
    evaluate_temperature_model, gdp_co2_regression, EvaluationReport, ForecastEngine,
    ForecastRequest,
};
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

pub const CO2_FORECAST: &str = "co2-forecast";
pub const TEMPERATURE_FORECAST: &str = "temperature-forecast";
pub const GDP_CO2_CORRELATION: &str = "gdp-co2-correlation";
pub const TEMPERATURE_HEATMAP: &str = "temperature-heatmap";
pub const TEMPERATURE_TREND: &str = "temperature-trend";
pub const EMISSIONS_CHOROPLETH: &str = "emissions-choropleth";
pub const TEMPERATURE_MODEL_EVALUATION: &str = "temperature-model-evaluation";

/// Shared, read-only inputs of every handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub data: Arc<ClimateData>,
    pub config: DashboardConfig,
    pub engine: ForecastEngine,
}

impl DashboardState {
    pub fn new(data: Arc<ClimateData>, config: DashboardConfig) -> Self {
        Self {
            data,
            engine: ForecastEngine::new().with_max_horizon_years(config.max_horizon_years),
            config,
        }
    }
}

/// Inputs collected from the UI for one panel update.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelRequest {
    /// Entity and target year of a forecast panel.
    Forecast(ForecastRequest),
    /// Year range slider value; `None` means the full table range.
    YearRange(Option<PeriodRange>),
    /// Panels without inputs.
    #[default]
    Empty,
}

/// What a panel renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum PanelResponse {
    Forecast(ForecastChart),
    Regression(RegressionChart),
    Heatmap(HeatmapGrid),
    Trend(TrendChart),
    Choropleth(ChoroplethMap),
    Evaluation(EvaluationReport),
    /// User-visible message shown instead of a chart.
    Placeholder(String),
}

impl PanelResponse {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, PanelResponse::Placeholder(_))
    }

    /// JSON document handed to the rendering layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Message shown in place of a chart for a failed request.
pub fn placeholder_message(err: &ForecastError) -> String {
    match err {
        ForecastError::NotFound { entity } => format!("No data available for {}", entity),
        ForecastError::InsufficientData { needed, got } => format!(
            "No data available: {} observations found, at least {} needed",
            got, needed
        ),
        ForecastError::ModelFit(_) => {
            "No data available: the model could not be fitted to this series".to_string()
        }
        ForecastError::EmptyData => "No data available for the selected range".to_string(),
        ForecastError::InvalidParameter(reason) => format!("Invalid request: {}", reason),
        other => format!("No data available ({})", other),
    }
}

type HandlerFn = dyn Fn(&DashboardState, &PanelRequest) -> Result<PanelResponse> + Send + Sync;

/// A named panel handler.
pub struct HandlerSpec {
    /// Event name the UI dispatches on
    pub name: &'static str,
    handler: Box<HandlerFn>,
}

impl HandlerSpec {
    pub fn new<F>(name: &'static str, handler: F) -> Self
    where
        F: Fn(&DashboardState, &PanelRequest) -> Result<PanelResponse> + Send + Sync + 'static,
    {
        Self {
            name,
            handler: Box::new(handler),
        }
    }

    /// Run the handler, converting any error to a placeholder.
    pub fn call(&self, state: &DashboardState, request: &PanelRequest) -> PanelResponse {
        match (self.handler)(state, request) {
            Ok(response) => response,
            Err(err) => {
                warn!(handler = self.name, error = %err, "panel falls back to placeholder");
                PanelResponse::Placeholder(placeholder_message(&err))
            }
        }
    }
}

impl std::fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSpec").field("name", &self.name).finish()
    }
}

/// Registry of panel handlers keyed by event name.
///
/// # Example
/// ```
/// use climate_forecast::dashboard::{HandlerRegistry, PanelResponse};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("hello", |_, _| Ok(PanelResponse::Placeholder("hi".into())));
/// assert_eq!(registry.names(), vec!["hello"]);
/// ```
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Vec<HandlerSpec>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registry with every dashboard panel.
    pub fn with_dashboard_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(CO2_FORECAST, co2_forecast);
        registry.register(TEMPERATURE_FORECAST, temperature_forecast);
        registry.register(GDP_CO2_CORRELATION, gdp_co2_correlation);
        registry.register(TEMPERATURE_HEATMAP, temperature_heatmap);
        registry.register(TEMPERATURE_TREND, temperature_trend);
        registry.register(EMISSIONS_CHOROPLETH, emissions_choropleth);
        registry.register(TEMPERATURE_MODEL_EVALUATION, temperature_model_evaluation);
        registry
    }

    /// Register a handler, replacing any previous one of the same name.
    pub fn register<F>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(&DashboardState, &PanelRequest) -> Result<PanelResponse> + Send + Sync + 'static,
    {
        self.handlers.retain(|spec| spec.name != name);
        self.handlers.push(HandlerSpec::new(name, handler));
    }

    pub fn get(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers.iter().find(|spec| spec.name == name)
    }

    /// Registered event names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|spec| spec.name).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run exactly one handler synchronously.
    ///
    /// Unknown names produce a placeholder.
    pub fn dispatch(
        &self,
        state: &DashboardState,
        name: &str,
        request: &PanelRequest,
    ) -> PanelResponse {
        match self.get(name) {
            Some(spec) => {
                debug!(handler = name, "dispatching panel request");
                spec.call(state, request)
            }
            None => {
                warn!(handler = name, "no handler registered");
                PanelResponse::Placeholder(format!("No panel named '{}'", name))
            }
        }
    }
}

/// Run a dispatch on a worker thread so the caller's event loop stays free.
pub fn dispatch_in_background(
    registry: Arc<HandlerRegistry>,
    state: Arc<DashboardState>,
    name: impl Into<String>,
    request: PanelRequest,
) -> JoinHandle<PanelResponse> {
    let name = name.into();
    thread::spawn(move || registry.dispatch(&state, &name, &request))
}

fn forecast_request(request: &PanelRequest) -> ForecastRequest {
    match request {
        PanelRequest::Forecast(req) => req.clone(),
        _ => ForecastRequest::default(),
    }
}

fn year_range(request: &PanelRequest, full: Option<PeriodRange>) -> Result<PeriodRange> {
    let range = match request {
        PanelRequest::YearRange(Some(range)) => Some(*range),
        _ => full,
    };
    let range = range.ok_or(ForecastError::EmptyData)?;
    PeriodRange::new(range.start, range.end)
}

fn co2_forecast(state: &DashboardState, request: &PanelRequest) -> Result<PanelResponse> {
    let request = forecast_request(request);
    let entity = request.entity_or(&state.config.default_entity);
    let target_year = request.target_year_or(state.config.default_target_year);

    let emissions = state.data.emissions();
    let series = emissions.series(entity, None)?;
    let result = state.engine.forecast(&series, target_year, state.config.confidence)?;

    let name = SeriesProvider::entity_name(emissions, entity).unwrap_or_else(|| entity.to_string());
    let title = format!(
        "CO2 Emissions Forecast for {} (Up to {})",
        name,
        result.effective_target.calendar_year()
    );
    Ok(PanelResponse::Forecast(ForecastChart::new(
        &result,
        title,
        "CO2 Emissions (kt)",
    )))
}

fn temperature_forecast(state: &DashboardState, request: &PanelRequest) -> Result<PanelResponse> {
    let request = forecast_request(request);
    let series = state.data.temperature_anomalies().annual_series(WORLD_CODE, None)?;
    let last_year = series
        .last_period()
        .map(|p| p.calendar_year())
        .ok_or(ForecastError::EmptyData)?;
    let target_year = request.target_year_or(last_year + state.config.temperature_horizon_years);

    let result = state.engine.forecast(&series, target_year, state.config.confidence)?;
    let title = format!(
        "Global Temperature Anomaly Forecast (Up to {})",
        result.effective_target.calendar_year()
    );
    Ok(PanelResponse::Forecast(ForecastChart::new(
        &result,
        title,
        "Temperature Anomaly (°C)",
    )))
}

fn gdp_co2_correlation(state: &DashboardState, _: &PanelRequest) -> Result<PanelResponse> {
    let result = gdp_co2_regression(
        state.data.emissions(),
        state.data.gdp(),
        &state.config.regression,
    )?;
    Ok(PanelResponse::Regression(result.into()))
}

fn temperature_heatmap(state: &DashboardState, request: &PanelRequest) -> Result<PanelResponse> {
    let table = state.data.temperature_anomalies();
    let range = year_range(request, table.year_range())?;
    Ok(PanelResponse::Heatmap(heatmap(table, WORLD_CODE, Some(range))?))
}

fn temperature_trend(state: &DashboardState, request: &PanelRequest) -> Result<PanelResponse> {
    let table = state.data.temperature_anomalies();
    let range = year_range(request, table.year_range())?;
    Ok(PanelResponse::Trend(trend(table, WORLD_CODE, Some(range))?))
}

fn emissions_choropleth(state: &DashboardState, request: &PanelRequest) -> Result<PanelResponse> {
    let table = state.data.emissions();
    let range = year_range(request, table.year_range())?;
    Ok(PanelResponse::Choropleth(choropleth(table, range)?))
}

fn temperature_model_evaluation(state: &DashboardState, _: &PanelRequest) -> Result<PanelResponse> {
    let report = evaluate_temperature_model(state.data.temperature(), &state.config.evaluation)?;
    Ok(PanelResponse::Evaluation(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use crate::data::{MetricTable, TemperatureTable};

    fn state_with_emissions(emissions: MetricTable) -> DashboardState {
        let data = ClimateData::new(emissions, TemperatureTable::default(), MetricTable::new("gdp"));
        DashboardState::new(Arc::new(data), DashboardConfig::default())
    }

    #[test]
    fn default_registry_has_every_panel() {
        let registry = HandlerRegistry::with_dashboard_handlers();
        assert_eq!(registry.len(), 7);
        for name in [
            CO2_FORECAST,
            TEMPERATURE_FORECAST,
            GDP_CO2_CORRELATION,
            TEMPERATURE_HEATMAP,
            TEMPERATURE_TREND,
            EMISSIONS_CHOROPLETH,
            TEMPERATURE_MODEL_EVALUATION,
        ] {
            assert!(registry.get(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = HandlerRegistry::new();
        registry.register("a", |_, _| Ok(PanelResponse::Placeholder("one".into())));
        registry.register("a", |_, _| Ok(PanelResponse::Placeholder("two".into())));
        assert_eq!(registry.len(), 1);

        let state = state_with_emissions(MetricTable::new("co2"));
        assert_eq!(
            registry.dispatch(&state, "a", &PanelRequest::Empty),
            PanelResponse::Placeholder("two".into())
        );
    }

    #[test]
    fn unknown_entity_becomes_placeholder() {
        let registry = HandlerRegistry::with_dashboard_handlers();
        let state = state_with_emissions(MetricTable::new("co2"));
        let response = registry.dispatch(
            &state,
            CO2_FORECAST,
            &PanelRequest::Forecast(ForecastRequest::new("XYZ", 2030)),
        );
        assert_eq!(response, PanelResponse::Placeholder("No data available for XYZ".into()));
    }

    #[test]
    fn short_series_becomes_placeholder() {
        let mut emissions = MetricTable::new("co2");
        for year in 2000..2010 {
            emissions.push("USA", "United States", Period::year(year), year as f64);
        }
        let registry = HandlerRegistry::with_dashboard_handlers();
        let response = registry.dispatch(
            &state_with_emissions(emissions),
            CO2_FORECAST,
            &PanelRequest::Empty,
        );
        assert!(response.is_placeholder());
    }

    #[test]
    fn far_future_target_becomes_placeholder() {
        let mut emissions = MetricTable::new("co2");
        for (i, year) in (1990..2020).enumerate() {
            let value = 100.0 + i as f64 + ((i * 7) % 5) as f64;
            emissions.push("USA", "United States", Period::year(year), value);
        }
        let registry = HandlerRegistry::with_dashboard_handlers();
        let response = registry.dispatch(
            &state_with_emissions(emissions),
            CO2_FORECAST,
            &PanelRequest::Forecast(ForecastRequest::new("USA", 2_000_000_000)),
        );
        match response {
            PanelResponse::Placeholder(message) => {
                assert!(message.starts_with("Invalid request"), "{}", message)
            }
            other => panic!("expected placeholder, got {:?}", other),
        }
    }

    #[test]
    fn unknown_handler_is_placeholder() {
        let registry = HandlerRegistry::with_dashboard_handlers();
        let state = state_with_emissions(MetricTable::new("co2"));
        assert!(registry.dispatch(&state, "nope", &PanelRequest::Empty).is_placeholder());
    }

    #[test]
    fn empty_tables_give_placeholders_everywhere() {
        let registry = HandlerRegistry::with_dashboard_handlers();
        let state = state_with_emissions(MetricTable::new("co2"));
        for name in registry.names() {
            assert!(registry.dispatch(&state, name, &PanelRequest::Empty).is_placeholder());
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut emissions = MetricTable::new("co2");
        emissions.push("USA", "United States", Period::year(2000), 1.0);
        let registry = HandlerRegistry::with_dashboard_handlers();
        let request = PanelRequest::YearRange(Some(PeriodRange { start: 2010, end: 2000 }));
        let response = registry.dispatch(&state_with_emissions(emissions), EMISSIONS_CHOROPLETH, &request);
        assert!(response.is_placeholder());
    }

    #[test]
    fn responses_serialise_with_kind_tag() {
        let json = PanelResponse::Placeholder("No data available".into()).to_json().unwrap();
        assert_eq!(json, r#"{"kind":"placeholder","payload":"No data available"}"#);
    }

    #[test]
    fn placeholder_messages() {
        assert_eq!(
            placeholder_message(&ForecastError::InsufficientData { needed: 25, got: 3 }),
            "No data available: 3 observations found, at least 25 needed"
        );
        assert!(placeholder_message(&ForecastError::ModelFit("x".into())).starts_with("No data available"));
    }

    #[test]
    fn background_dispatch_returns_response() {
        let registry = Arc::new(HandlerRegistry::with_dashboard_handlers());
        let state = Arc::new(state_with_emissions(MetricTable::new("co2")));
        let handle = dispatch_in_background(registry, state, CO2_FORECAST, PanelRequest::Empty);
        assert!(handle.join().unwrap().is_placeholder());
    }
}
