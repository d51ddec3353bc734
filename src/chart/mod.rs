//! Charts derived from query results, and the cache that keeps them in the blob namespace.
//!
//! A chart is described by a [`ChartRequest`]: which model year to plot, which fields go on
//! each axis, and whether to draw bars or a line. The request's [`artifact_name`] is the
//! canonical fingerprint the rendered bytes are cached under, so charts for different
//! requests live side by side in the [`ArtifactCache`].
//!
//! [`artifact_name`]: ChartRequest::artifact_name
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{Record, REAL_WORLD_MPG, SENTINEL, VEHICLE_TYPE};
use crate::{Result, TrendsError};

mod cache;
mod render;
mod service;

pub use self::cache::ArtifactCache;
pub use self::render::{ChartRenderer, SvgRenderer};
pub use self::service::{ChartService, RenderedChart};

/// the model year plotted when a request does not name one
pub const DEFAULT_YEAR: &str = "2021";

/// The kind of mark drawn for each plot point
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// one bar per point
    Bar,
    /// points joined by a line, in input order
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "bar"),
            ChartKind::Line => write!(f, "line"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            other => Err(TrendsError::Parsing(format!(
                "unknown chart kind `{}`, expected `bar` or `line`",
                other
            ))),
        }
    }
}

/// Describes one chart: the filtered view it plots and how it is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// the model year whose records are plotted
    pub year: String,
    /// bar or line chart
    pub kind: ChartKind,
    /// field used as the category on the x axis
    pub x_field: String,
    /// numeric field plotted on the y axis
    pub y_field: String,
}

impl Default for ChartRequest {
    /// the 2021 real-world MPG by vehicle type bar chart
    fn default() -> Self {
        ChartRequest {
            year: DEFAULT_YEAR.to_string(),
            kind: ChartKind::Bar,
            x_field: VEHICLE_TYPE.to_string(),
            y_field: REAL_WORLD_MPG.to_string(),
        }
    }
}

impl ChartRequest {
    /// the default request for the given `year`
    pub fn for_year(year: impl Into<String>) -> Self {
        ChartRequest {
            year: year.into(),
            ..ChartRequest::default()
        }
    }

    /// the name the rendered chart is cached under: `chart:{kind}:{year}:{x_field}:{y_field}`
    pub fn artifact_name(&self) -> String {
        format!(
            "chart:{}:{}:{}:{}",
            self.kind, self.year, self.x_field, self.y_field
        )
    }

    /// the labels and kind the renderer draws this request with
    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            title: format!("{}: {} vs {}", self.year, self.y_field, self.x_field),
            x_label: self.x_field.clone(),
            y_label: self.y_field.clone(),
            kind: self.kind,
            ..ChartStyle::default()
        }
    }
}

/// Presentation settings handed to a [`ChartRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// caption drawn above the plot
    pub title: String,
    /// x axis description
    pub x_label: String,
    /// y axis description
    pub y_label: String,
    /// bar or line
    pub kind: ChartKind,
    /// image width in pixels
    pub width: u32,
    /// image height in pixels
    pub height: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Bar,
            width: 800,
            height: 600,
        }
    }
}

/// one (category, value) pair of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    /// x axis category label
    pub category: String,
    /// y axis value
    pub value: f64,
}

/// Extracts the plot points of `records`, in record order.
///
/// Records whose `y_field` holds the sentinel `-` are skipped rather than plotted as zero.
///
/// # Errors
/// returns [`TrendsError::FieldParse`] if a `y_field` value is neither a number nor the
/// sentinel, or if a record lacks `x_field` or `y_field`. One bad record aborts the whole
/// extraction.
pub fn plot_points(records: &[Record], x_field: &str, y_field: &str) -> Result<Vec<PlotPoint>> {
    let mut points = Vec::with_capacity(records.len());
    for record in records {
        let raw = record.get(y_field).ok_or_else(|| TrendsError::FieldParse {
            field: y_field.to_string(),
            value: String::new(),
        })?;
        if raw.trim() == SENTINEL {
            continue;
        }
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| TrendsError::FieldParse {
                field: y_field.to_string(),
                value: raw.to_string(),
            })?;
        let category = record.get(x_field).ok_or_else(|| TrendsError::FieldParse {
            field: x_field.to_string(),
            value: String::new(),
        })?;
        points.push(PlotPoint {
            category: category.to_string(),
            value,
        });
    }
    Ok(points)
}
