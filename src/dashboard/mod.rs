//! Dashboard boundary: panel handlers, data shaping and chart payloads.

mod chart;
mod handlers;
mod panels;

pub use chart::{ForecastChart, LineSeries, RegressionChart};
pub use handlers::{
    dispatch_in_background, placeholder_message, DashboardState, HandlerRegistry, HandlerSpec,
    PanelRequest, PanelResponse, CO2_FORECAST, EMISSIONS_CHOROPLETH, GDP_CO2_CORRELATION,
    TEMPERATURE_FORECAST, TEMPERATURE_HEATMAP, TEMPERATURE_MODEL_EVALUATION, TEMPERATURE_TREND,
};
pub use panels::{
    choropleth, heatmap, trend, ChoroplethEntry, ChoroplethMap, HeatmapGrid, TrendChart,
};
