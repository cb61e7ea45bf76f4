//! Printed text that goes under each chart image: axis titles, category
//! labels with values, the series legend and the target line. Chart bitmaps
//! carry no text, so this is how a reader of the PDF tells the bars apart.

use rust_decimal::Decimal;

use crate::metrics::salesperson::GaugeStatus;
use crate::metrics::{GaugeReading, Point, SeriesPoint, Share};
use crate::report::chart::PALETTE;
use crate::report::format::{format_grouped, format_money, format_rate};
use crate::report::{ChartData, ChartSpec, ChartType};

/// 8-bit RGB, shared by the PNG renderer and the PDF text.
pub type Rgb8 = (u8, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    /// Swatch colour of the mark this line describes, `None` for black
    pub color: Option<Rgb8>,
}

impl CaptionLine {
    fn plain(text: impl Into<String>) -> Self {
        CaptionLine {
            text: text.into(),
            color: None,
        }
    }

    fn colored(text: impl Into<String>, color: Rgb8) -> Self {
        CaptionLine {
            text: text.into(),
            color: Some(color),
        }
    }
}

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

/// `#RRGGBB`; malformed channels read as 0.
pub fn hex_rgb(hex: &str) -> Rgb8 {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (channel(1), channel(3), channel(5))
}

/// Categorical colour `i`, cycling through the palette.
pub fn palette_rgb(i: usize) -> Rgb8 {
    hex_rgb(PALETTE[i % PALETTE.len()])
}

/// Gauge band and status colours by name; unknown names are black.
pub fn named_rgb(name: &str) -> Rgb8 {
    match name {
        "green" => (0, 128, 0),
        "magenta" => (255, 0, 255),
        "red" => (255, 0, 0),
        "lightgray" => (211, 211, 211),
        "gray" => (128, 128, 128),
        "darkgray" => (169, 169, 169),
        _ => (0, 0, 0),
    }
}

// ---------------------------------------------------------------------------
// Captions
// ---------------------------------------------------------------------------

/// Everything printed below one chart, top to bottom.
pub fn chart_captions(spec: &ChartSpec) -> Vec<CaptionLine> {
    let mut lines = Vec::new();
    if let Some(axes) = axis_line(spec) {
        lines.push(CaptionLine::plain(axes));
    }

    match (&spec.chart_type, &spec.data) {
        (ChartType::Line, ChartData::Points(points)) => period_lines(spec, points, &mut lines),
        (ChartType::Geo, ChartData::Points(points)) => {
            for (i, p) in points.iter().enumerate() {
                lines.push(CaptionLine::plain(numbered(i, &p.label, &value_text(spec, p.value))));
            }
        }
        (_, ChartData::Points(points)) => {
            for (i, p) in points.iter().enumerate() {
                lines.push(CaptionLine::colored(
                    numbered(i, &p.label, &value_text(spec, p.value)),
                    palette_rgb(i),
                ));
            }
        }
        (ChartType::Line, ChartData::Series(series)) => {
            let mut periods: Vec<&str> = distinct(series.iter().map(|s| s.x.as_str()));
            periods.sort_unstable();
            if let Some(range) = range_line(&periods) {
                lines.push(CaptionLine::plain(range));
            }
            legend_lines(spec, series, &mut lines);
        }
        (_, ChartData::Series(series)) => {
            for (i, x) in distinct(series.iter().map(|s| s.x.as_str())).iter().enumerate() {
                lines.push(CaptionLine::plain(format!("{}. {}", i + 1, x)));
            }
            legend_lines(spec, series, &mut lines);
        }
        (_, ChartData::Shares(shares)) => share_lines(spec, shares, &mut lines),
        (_, ChartData::Gauge(reading)) => lines.push(gauge_line(reading)),
    }

    if let Some(target) = &spec.target {
        lines.push(CaptionLine::plain(format!(
            "- - {}: {}",
            target.label,
            value_text(spec, target.value)
        )));
    }
    lines
}

/// `Revenue by Product`, or the lone title that is set.
fn axis_line(spec: &ChartSpec) -> Option<String> {
    let x = spec.x_title.trim();
    let y = spec.y_title.trim();
    match (x.is_empty(), y.is_empty()) {
        (true, true) => None,
        (true, false) => Some(y.to_string()),
        (false, true) => Some(x.to_string()),
        (false, false) => Some(format!("{} by {}", y, x)),
    }
}

fn is_money(spec: &ChartSpec) -> bool {
    matches!(spec.chart_type, ChartType::Gauge) || spec.y_title.contains("Revenue")
}

/// Money on revenue axes; counts without cents.
fn value_text(spec: &ChartSpec, value: Decimal) -> String {
    if is_money(spec) {
        return format_money(value);
    }
    let grouped = format_grouped(value);
    match grouped.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => grouped,
    }
}

fn numbered(i: usize, label: &str, value: &str) -> String {
    format!("{}. {}: {}", i + 1, label, value)
}

fn distinct<'a, I: IntoIterator<Item = &'a str>>(items: I) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn range_line(periods: &[&str]) -> Option<String> {
    match periods {
        [] => None,
        [only] => Some(format!("{} (1 period)", only)),
        [first, .., last] => Some(format!("{} to {} ({} periods)", first, last, periods.len())),
    }
}

fn period_lines(spec: &ChartSpec, points: &[Point], lines: &mut Vec<CaptionLine>) {
    let mut periods: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
    periods.sort_unstable();
    if let Some(range) = range_line(&periods) {
        lines.push(CaptionLine::colored(range, palette_rgb(0)));
    }
    // first of equal maxima, in period order
    let mut by_period: Vec<&Point> = points.iter().collect();
    by_period.sort_by(|a, b| a.label.cmp(&b.label));
    let peak = by_period
        .into_iter()
        .fold(None::<&Point>, |best, p| match best {
            Some(b) if b.value >= p.value => Some(b),
            _ => Some(p),
        });
    if let Some(p) = peak {
        lines.push(CaptionLine::plain(format!(
            "Peak: {} ({})",
            p.label,
            value_text(spec, p.value)
        )));
    }
}

/// Series names in drawing order, each in its line or bar colour.
fn legend_lines(spec: &ChartSpec, series: &[SeriesPoint], lines: &mut Vec<CaptionLine>) {
    if !spec.layout.show_legend {
        return;
    }
    let mut names = distinct(series.iter().map(|s| s.series.as_str()));
    names.sort_unstable();
    if let Some(title) = &spec.layout.legend_title {
        lines.push(CaptionLine::plain(format!("{}:", title)));
    }
    for (slot, name) in names.iter().enumerate() {
        lines.push(CaptionLine::colored(format!("  {}", name), palette_rgb(slot)));
    }
}

fn share_lines(spec: &ChartSpec, shares: &[Share], lines: &mut Vec<CaptionLine>) {
    for (i, s) in shares.iter().enumerate() {
        let text = format!("{}: {} ({})", s.label, value_text(spec, s.value), format_rate(s.share));
        if spec.layout.show_legend {
            lines.push(CaptionLine::colored(text, palette_rgb(i)));
        } else {
            lines.push(CaptionLine::plain(text));
        }
    }
}

fn gauge_line(reading: &GaugeReading) -> CaptionLine {
    let status = match reading.status {
        GaugeStatus::OnTarget => "on target",
        GaugeStatus::NearTarget => "near target",
        GaugeStatus::BelowTarget => "below target",
    };
    CaptionLine::colored(
        format!(
            "{} of {} target ({})",
            format_money(reading.value),
            format_money(reading.target),
            status
        ),
        named_rgb(reading.status.color()),
    )
}
