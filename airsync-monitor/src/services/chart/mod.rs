mod canvas;
mod png;

pub use canvas::*;
pub use png::*;

use std::sync::Arc;

use airsync_api::{Channel, Color, Series, WindowBuffer};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

use crate::errors::RenderError;

/// Calendar date and 24-hour time, e.g. `Jan-15-24 13:05`.
const X_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short]-[day]-[year repr:last_two] [hour]:[minute]");

/// Everything a renderer needs to draw one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec<'a> {
    pub channel: Channel,
    pub title: &'static str,
    pub unit: &'static str,
    pub timestamps: &'a [OffsetDateTime],
    pub values: &'a [f64],
    /// One color per point
    pub colors: Vec<Color>,
}

impl<'a> ChartSpec<'a> {
    pub fn from_series(series: Series<'a>) -> Self {
        let palette = series.channel.palette();

        Self {
            channel: series.channel,
            title: series.channel.title(),
            unit: series.channel.unit(),
            timestamps: series.timestamps,
            values: series.values,
            colors: series.values.iter().map(|&value| palette.color_of(value)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Format a timestamp for the x axis.
pub fn x_label(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(X_LABEL_FORMAT)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Turns a chart description into encoded image bytes.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec<'_>) -> Result<Vec<u8>, RenderError>;
}

/// Derives one chart per channel from the window and hands it to the renderer.
#[derive(Clone)]
pub struct ChartBuilder {
    renderer: Arc<dyn ChartRenderer>,
}

impl ChartBuilder {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { renderer }
    }

    pub fn spec<'a>(&self, window: &'a WindowBuffer, channel: Channel) -> ChartSpec<'a> {
        ChartSpec::from_series(window.snapshot(channel))
    }

    pub fn build(&self, window: &WindowBuffer, channel: Channel) -> Result<Vec<u8>, RenderError> {
        let spec = self.spec(window, channel);
        let bytes = self.renderer.render(&spec)?;

        tracing::debug!(channel = %channel, points = spec.len(), "rendered chart ({} bytes)", bytes.len());

        Ok(bytes)
    }
}
