//! Plotters-powered boom/bust chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description; all series and bounds are computed
/// outside the render call.
pub struct CycleChart<'a> {
    /// Raw observations, drawn as dots.
    pub raw: &'a [(f64, f64)],
    /// Smoothed series, drawn as a line.
    pub smoothed: &'a [(f64, f64)],
    pub peaks: &'a [(f64, f64)],
    pub troughs: &'a [(f64, f64)],
    /// X bounds (fractional years).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for CycleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let raw_color = RGBColor(128, 128, 128);
            let smooth_color = RGBColor(0, 255, 255);
            let peak_color = RGBColor(0, 255, 0);
            let trough_color = RGBColor(255, 0, 0);

            chart.draw_series(self.raw.iter().map(|&(x, y)| Pixel::new((x, y), raw_color)))?;
            chart.draw_series(LineSeries::new(self.smoothed.iter().copied(), &smooth_color))?;

            // Circle markers come out oversized through the ratatui backend, so
            // turning points are drawn as colored pixels.
            chart.draw_series(self.peaks.iter().map(|&(x, y)| Pixel::new((x, y), peak_color)))?;
            chart.draw_series(self.troughs.iter().map(|&(x, y)| Pixel::new((x, y), trough_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
