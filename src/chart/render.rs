use plotters::prelude::*;
use tracing::debug;

use super::{ChartKind, ChartStyle, PlotPoint};
use crate::{Result, TrendsError};

/// Turns plot points into an image.
///
/// The bytes returned by [`render`](ChartRenderer::render) are opaque to the rest of the crate;
/// they are cached and served back with [`content_type`](ChartRenderer::content_type).
pub trait ChartRenderer: Send + Sync + 'static {
    /// draws `points` with the given `style`.
    ///
    /// An empty `points` slice must still produce a valid, empty chart.
    fn render(&self, points: &[PlotPoint], style: &ChartStyle) -> Result<Vec<u8>>;

    /// the MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;
}

/// Renders charts as SVG documents using the [`plotters`] SVG backend.
///
/// Categories are placed on the x axis in order of first appearance. Several points sharing a
/// category are drawn in the same slot, later points on top.
///
/// [`plotters`]: https://docs.rs/plotters/latest/plotters/
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// creates the renderer
    pub fn new() -> Self {
        SvgRenderer
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, points: &[PlotPoint], style: &ChartStyle) -> Result<Vec<u8>> {
        let mut categories: Vec<&str> = Vec::new();
        let mut slotted = Vec::with_capacity(points.len());
        for point in points {
            let slot = match categories.iter().position(|c| *c == point.category) {
                Some(slot) => slot,
                None => {
                    categories.push(&point.category);
                    categories.len() - 1
                }
            };
            slotted.push((slot as u32, point.value));
        }

        let slots = categories.len().max(1) as u32;
        let y_max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
        let y_min = points.iter().map(|p| p.value).fold(0.0_f64, f64::min);
        let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
        let y_bottom = if y_min < 0.0 { y_min * 1.1 } else { 0.0 };
        debug!(slots, y_bottom, y_top, "rendering {} chart", style.kind);

        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(&style.title, ("sans-serif", 24).into_font())
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d((0u32..slots).into_segmented(), y_bottom..y_top)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(slots as usize)
                .x_label_formatter(&|value: &SegmentValue<u32>| segment_label(value, &categories))
                .x_desc(style.x_label.as_str())
                .y_desc(style.y_label.as_str())
                .draw()
                .map_err(render_err)?;

            if !slotted.is_empty() {
                match style.kind {
                    ChartKind::Bar => {
                        chart
                            .draw_series(slotted.iter().map(|&(slot, value)| {
                                let mut bar = Rectangle::new(
                                    [
                                        (SegmentValue::Exact(slot), 0.0),
                                        (SegmentValue::Exact(slot + 1), value),
                                    ],
                                    GREEN.filled(),
                                );
                                bar.set_margin(0, 0, 8, 8);
                                bar
                            }))
                            .map_err(render_err)?
                            .label(style.y_label.as_str())
                            .legend(|(x, y)| {
                                Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.filled())
                            });
                    }
                    ChartKind::Line => {
                        chart
                            .draw_series(LineSeries::new(
                                slotted
                                    .iter()
                                    .map(|&(slot, value)| (SegmentValue::CenterOf(slot), value)),
                                &BLUE,
                            ))
                            .map_err(render_err)?
                            .label(style.y_label.as_str())
                            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
                    }
                }

                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(render_err)?;
            }

            root.present().map_err(render_err)?;
        }

        Ok(svg.into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

fn segment_label(value: &SegmentValue<u32>, categories: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(slot) | SegmentValue::Exact(slot) => categories
            .get(*slot as usize)
            .map(|c| c.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> TrendsError {
    TrendsError::Render(e.to_string())
}
