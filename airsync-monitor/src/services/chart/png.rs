use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_7X13_BOLD};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use time::OffsetDateTime;

use airsync_api::Color;

use super::{Canvas, ChartRenderer, ChartSpec, x_label};
use crate::errors::RenderError;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;
pub const MIN_WIDTH: u32 = 200;
pub const MIN_HEIGHT: u32 = 120;
pub const MAX_WIDTH: u32 = 4096;
pub const MAX_HEIGHT: u32 = 4096;

const PADDING: i32 = 20;
const TITLE_HEIGHT: i32 = 18;
const Y_LABEL_WIDTH: i32 = 48;
const X_LABEL_HEIGHT: i32 = 14;
const DOT_RADIUS: u32 = 3;
/// Fraction of the value range added above and below the data.
const SCALE_MARGIN: f64 = 0.1;
/// Smallest value range drawn, keeps flat series off the axis.
const MIN_RANGE: f64 = 1.0;

fn rgb(color: Color) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

/// Line chart with per-point colored dots, encoded as PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngRenderer {
    width: u32,
    height: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl PngRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn plot_area(&self) -> Rectangle {
        let left = PADDING + Y_LABEL_WIDTH;
        let top = PADDING + TITLE_HEIGHT;
        let right = self.width as i32 - PADDING;
        let bottom = self.height as i32 - PADDING - X_LABEL_HEIGHT;

        Rectangle::with_corners(Point::new(left, top), Point::new(right, bottom))
    }
}

/// Maps data coordinates onto the plot rectangle.
struct Scale {
    area: Rectangle,
    x_min: f64,
    x_span: f64,
    y_min: f64,
    y_span: f64,
}

impl Scale {
    fn fit(area: Rectangle, timestamps: &[OffsetDateTime], values: &[f64]) -> Self {
        let seconds = timestamps.iter().map(|t| t.unix_timestamp() as f64);
        let (x_min, x_max) = bounds(seconds).unwrap_or((0.0, 0.0));

        let (y_min, y_max) = bounds(values.iter().copied()).unwrap_or((0.0, MIN_RANGE));
        let mut y_span = (y_max - y_min).max(MIN_RANGE);
        let centre = (y_min + y_max) / 2.0;
        y_span *= 1.0 + 2.0 * SCALE_MARGIN;

        Self {
            area,
            x_min,
            x_span: x_max - x_min,
            y_min: centre - y_span / 2.0,
            y_span,
        }
    }

    fn y_max(&self) -> f64 {
        self.y_min + self.y_span
    }

    fn point(&self, timestamp: OffsetDateTime, value: f64) -> Point {
        let width = f64::from(self.area.size.width.saturating_sub(1));
        let height = f64::from(self.area.size.height.saturating_sub(1));

        let tx = if self.x_span > 0.0 {
            (timestamp.unix_timestamp() as f64 - self.x_min) / self.x_span
        } else {
            0.5
        };
        let ty = (value - self.y_min) / self.y_span;

        Point::new(
            self.area.top_left.x + (tx * width).round() as i32,
            self.area.top_left.y + ((1.0 - ty) * height).round() as i32,
        )
    }
}

/// Min and max over the finite values.
fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

impl ChartRenderer for PngRenderer {
    fn render(&self, chart: &ChartSpec<'_>) -> Result<Vec<u8>, RenderError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(RenderError::CanvasTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_WIDTH || self.height > MAX_HEIGHT {
            return Err(RenderError::CanvasTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        let mut canvas = Canvas::new(self.width, self.height, Rgb888::WHITE);
        let area = self.plot_area();
        let scale = Scale::fit(area, chart.timestamps, chart.values);

        let title_style = MonoTextStyle::new(&FONT_7X13_BOLD, Rgb888::BLACK);
        let label_style = MonoTextStyle::new(&FONT_6X10, Rgb888::BLACK);
        let stroke = PrimitiveStyle::with_stroke(Rgb888::BLACK, 1);

        Text::with_text_style(
            chart.title,
            Point::new(self.width as i32 / 2, PADDING),
            title_style,
            TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Top)
                .build(),
        )
        .draw(&mut canvas)?;

        // Axes
        let origin = Point::new(area.top_left.x, area.top_left.y + area.size.height as i32 - 1);
        Line::new(area.top_left, origin).into_styled(stroke).draw(&mut canvas)?;
        Line::new(origin, Point::new(area.top_left.x + area.size.width as i32 - 1, origin.y))
            .into_styled(stroke)
            .draw(&mut canvas)?;

        self.draw_y_labels(&mut canvas, chart.unit, &scale, label_style)?;
        self.draw_x_labels(&mut canvas, chart.timestamps, &scale, label_style)?;

        let points: Vec<(Point, Color)> = chart
            .timestamps
            .iter()
            .zip(chart.values)
            .zip(&chart.colors)
            .filter(|((_, value), _)| value.is_finite())
            .map(|((&timestamp, &value), &color)| (scale.point(timestamp, value), color))
            .collect();

        for pair in points.windows(2) {
            Line::new(pair[0].0, pair[1].0).into_styled(stroke).draw(&mut canvas)?;
        }

        for &(point, color) in &points {
            Circle::with_center(point, 2 * DOT_RADIUS + 1)
                .into_styled(PrimitiveStyle::with_fill(rgb(color)))
                .draw(&mut canvas)?;
        }

        canvas.to_png()
    }
}

impl PngRenderer {
    fn draw_y_labels(
        &self,
        canvas: &mut Canvas,
        unit: &str,
        scale: &Scale,
        style: MonoTextStyle<'static, Rgb888>,
    ) -> Result<(), RenderError> {
        let right = scale.area.top_left.x - 4;
        let top = scale.area.top_left.y;
        let bottom = top + scale.area.size.height as i32 - 1;
        let aligned = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Middle)
            .build();

        Text::with_text_style(&format!("{:.1}", scale.y_max()), Point::new(right, top), style, aligned)
            .draw(canvas)?;
        Text::with_text_style(&format!("{:.1}", scale.y_min), Point::new(right, bottom), style, aligned)
            .draw(canvas)?;

        Text::with_baseline(unit, Point::new(PADDING, top - 2), style, Baseline::Bottom).draw(canvas)?;

        Ok(())
    }

    fn draw_x_labels(
        &self,
        canvas: &mut Canvas,
        timestamps: &[OffsetDateTime],
        scale: &Scale,
        style: MonoTextStyle<'static, Rgb888>,
    ) -> Result<(), RenderError> {
        let Some((&first, &last)) = timestamps.first().zip(timestamps.last()) else {
            return Ok(());
        };

        let y = scale.area.top_left.y + scale.area.size.height as i32 + 3;
        let mut labels = vec![(first, Alignment::Left)];
        if timestamps.len() > 2 {
            labels.push((timestamps[timestamps.len() / 2], Alignment::Center));
        }
        if timestamps.len() > 1 {
            labels.push((last, Alignment::Right));
        }

        for (timestamp, alignment) in labels {
            let x = scale.point(timestamp, scale.y_min).x;
            let text_style = TextStyleBuilder::new()
                .alignment(alignment)
                .baseline(Baseline::Top)
                .build();

            Text::with_text_style(&x_label(timestamp), Point::new(x, y), style, text_style).draw(canvas)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use airsync_api::{Channel, Reading, WindowBuffer};
    use image::ImageFormat;
    use time::macros::datetime;

    use super::*;

    fn decode(bytes: &[u8]) -> image::RgbImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .unwrap()
            .to_rgb8()
    }

    fn contains(image: &image::RgbImage, color: Color) -> bool {
        image.pixels().any(|p| p.0 == [color.r, color.g, color.b])
    }

    #[test]
    fn test_render_uses_configured_size() {
        let window = WindowBuffer::new();
        let spec = ChartSpec::from_series(window.snapshot(Channel::Pm1p0));

        let bytes = PngRenderer::new(320, 200).render(&spec).unwrap();

        assert_eq!(decode(&bytes).dimensions(), (320, 200));
    }

    #[test]
    fn test_render_rejects_tiny_canvas() {
        let window = WindowBuffer::new();
        let spec = ChartSpec::from_series(window.snapshot(Channel::Pm1p0));

        let err = PngRenderer::new(40, 40).render(&spec).unwrap_err();

        assert!(matches!(err, RenderError::CanvasTooSmall { width: 40, height: 40 }));
    }

    #[test]
    fn test_render_rejects_huge_canvas() {
        let window = WindowBuffer::new();
        let spec = ChartSpec::from_series(window.snapshot(Channel::Pm1p0));

        let err = PngRenderer::new(u32::MAX, 360).render(&spec).unwrap_err();

        assert!(matches!(err, RenderError::CanvasTooLarge { width: u32::MAX, height: 360 }));
    }

    #[test]
    fn test_dots_use_band_colors() {
        let mut window = WindowBuffer::new();
        let start = datetime!(2024-01-15 13:00 UTC);
        for (minute, value) in [5.0, 15.0, 60.0].into_iter().enumerate() {
            window.append(&Reading::new(start + time::Duration::minutes(minute as i64), [value; 8]));
        }
        let spec = ChartSpec::from_series(window.snapshot(Channel::Pm2p5));

        let image = decode(&PngRenderer::default().render(&spec).unwrap());

        assert!(contains(&image, Color::GOOD));
        assert!(contains(&image, Color::FAIR));
        assert!(contains(&image, Color::VERY_POOR));
        assert!(!contains(&image, Color::SEVERE));
    }

    #[test]
    fn test_dot_spans_its_diameter() {
        let mut window = WindowBuffer::new();
        window.append(&Reading::new(datetime!(2024-01-15 13:00 UTC), [5.0; 8]));
        let spec = ChartSpec::from_series(window.snapshot(Channel::Pm2p5));

        let image = decode(&PngRenderer::default().render(&spec).unwrap());
        let good = [Color::GOOD.r, Color::GOOD.g, Color::GOOD.b];
        let columns: Vec<u32> = (0..image.width())
            .filter(|&x| (0..image.height()).any(|y| image.get_pixel(x, y).0 == good))
            .collect();

        assert_eq!(columns.len() as u32, 2 * DOT_RADIUS + 1);
        assert_eq!(columns[columns.len() - 1] - columns[0], 2 * DOT_RADIUS);
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let mut window = WindowBuffer::new();
        let start = datetime!(2024-01-15 13:00 UTC);
        let mut values = [5.0; 8];
        window.append(&Reading::new(start, values));
        values[Channel::Temperature.index()] = f64::NAN;
        window.append(&Reading::new(start + time::Duration::minutes(1), values));
        let spec = ChartSpec::from_series(window.snapshot(Channel::Temperature));

        let image = decode(&PngRenderer::default().render(&spec).unwrap());

        assert!(contains(&image, Color::BLUE));
    }

    #[test]
    fn test_bounds_ignore_non_finite() {
        let values = [f64::NAN, 3.0, f64::INFINITY, -1.0];

        assert_eq!(bounds(values.into_iter()), Some((-1.0, 3.0)));
        assert_eq!(bounds([f64::NAN].into_iter()), None);
    }
}
