use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::metrics::{GaugeReading, Point, SeriesPoint, Share};

/// Plotly's qualitative palette, used for every categorical chart.
pub const PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub const DEFAULT_HEIGHT: u32 = 150;
pub const GAUGE_HEIGHT: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    GroupedBar,
    Line,
    Pie,
    /// Value per country name
    Geo,
    Gauge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ChartData {
    Points(Vec<Point>),
    Series(Vec<SeriesPoint>),
    Shares(Vec<Share>),
    Gauge(GaugeReading),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Points(p) => p.is_empty(),
            ChartData::Series(s) => s.is_empty(),
            ChartData::Shares(s) => s.is_empty(),
            ChartData::Gauge(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartData::Points(p) => p.len(),
            ChartData::Series(s) => s.len(),
            ChartData::Shares(s) => s.len(),
            ChartData::Gauge(_) => 1,
        }
    }
}

/// Constant dashed reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLine {
    pub value: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Height in points at 500pt width
    pub height: u32,
    pub show_legend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    pub font_size: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        ChartLayout {
            height: DEFAULT_HEIGHT,
            show_legend: false,
            legend_title: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Declarative description of one chart. Adapters decide how to draw it.
///
/// ```
/// use rust_decimal_macros::dec;
/// use sales_dashboard_core::metrics::Point;
/// use sales_dashboard_core::report::ChartSpec;
///
/// let spec = ChartSpec::bar(vec![Point::new("A", dec!(10))])
///     .axes("Product", "Revenue")
///     .with_target(dec!(1000));
/// assert!(spec.target.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub x_title: String,
    pub y_title: String,
    pub data: ChartData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetLine>,
    pub layout: ChartLayout,
}

impl ChartSpec {
    fn new(chart_type: ChartType, data: ChartData) -> Self {
        ChartSpec {
            chart_type,
            x_title: String::new(),
            y_title: String::new(),
            data,
            target: None,
            layout: ChartLayout::default(),
        }
    }

    pub fn bar(points: Vec<Point>) -> Self {
        ChartSpec::new(ChartType::Bar, ChartData::Points(points))
    }

    /// Bars grouped by `x`, one colour per series.
    pub fn grouped_bar(series: Vec<SeriesPoint>) -> Self {
        ChartSpec::new(ChartType::GroupedBar, ChartData::Series(series)).legend(true)
    }

    pub fn line(points: Vec<Point>) -> Self {
        ChartSpec::new(ChartType::Line, ChartData::Points(points))
    }

    /// One line per series.
    pub fn multi_line(series: Vec<SeriesPoint>) -> Self {
        ChartSpec::new(ChartType::Line, ChartData::Series(series)).legend(true)
    }

    pub fn pie(shares: Vec<Share>) -> Self {
        ChartSpec::new(ChartType::Pie, ChartData::Shares(shares)).legend(true)
    }

    pub fn geo(points: Vec<Point>) -> Self {
        ChartSpec::new(ChartType::Geo, ChartData::Points(points))
    }

    pub fn gauge(reading: GaugeReading) -> Self {
        let mut spec = ChartSpec::new(ChartType::Gauge, ChartData::Gauge(reading));
        spec.layout.height = GAUGE_HEIGHT;
        spec.layout.font_size = 6;
        spec
    }

    pub fn axes(mut self, x_title: &str, y_title: &str) -> Self {
        self.x_title = x_title.to_string();
        self.y_title = y_title.to_string();
        self
    }

    pub fn with_target(mut self, value: Decimal) -> Self {
        self.target = Some(TargetLine {
            value,
            label: "Target".to_string(),
        });
        self.layout.show_legend = true;
        self
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.layout.show_legend = show;
        self
    }

    pub fn legend_title(mut self, title: &str) -> Self {
        self.layout.legend_title = Some(title.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
