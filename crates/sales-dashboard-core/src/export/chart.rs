use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use tempfile::NamedTempFile;

use super::legend::{named_rgb, palette_rgb, Rgb8};
use crate::error::DashboardError;
use crate::metrics::{GaugeReading, Point, SeriesPoint, Share};
use crate::report::{ChartData, ChartSpec, ChartType};
use crate::DashboardResult;

/// Pixel width of every rendered chart.
pub const IMAGE_WIDTH: u32 = 1000;

/// Width the layout heights are expressed against.
const LAYOUT_WIDTH: u32 = 700;

const MARGIN: u32 = 12;

/// A rendered chart on disk. The file is deleted when the guard drops.
#[derive(Debug)]
pub struct ChartImage {
    file: NamedTempFile,
    pub width: u32,
    pub height: u32,
}

impl ChartImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn draw_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Export(format!("chart rendering failed: {}", e))
}

/// Render a chart spec to a temporary PNG.
pub fn render_chart_png(spec: &ChartSpec) -> DashboardResult<ChartImage> {
    render_chart_png_in(spec, &std::env::temp_dir())
}

/// Render a chart spec to a PNG created inside `dir`.
pub fn render_chart_png_in(spec: &ChartSpec, dir: &Path) -> DashboardResult<ChartImage> {
    let width = IMAGE_WIDTH;
    let height = (spec.layout.height * IMAGE_WIDTH / LAYOUT_WIDTH).max(1);
    let file = tempfile::Builder::new()
        .prefix("chart-")
        .suffix(".png")
        .tempfile_in(dir)?;

    {
        let root = BitMapBackend::new(file.path(), (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        match (&spec.chart_type, &spec.data) {
            (ChartType::Pie, ChartData::Shares(shares)) => draw_pie(&root, shares)?,
            (ChartType::Gauge, ChartData::Gauge(reading)) => draw_gauge(&root, reading)?,
            (ChartType::Geo, ChartData::Points(points)) => draw_geo(&root, points)?,
            (ChartType::Line, ChartData::Points(points)) => {
                let series: Vec<SeriesPoint> = points
                    .iter()
                    .map(|p| SeriesPoint {
                        x: p.label.clone(),
                        series: String::new(),
                        value: p.value,
                    })
                    .collect();
                draw_lines(&root, &series, spec.target.as_ref().map(|t| t.value))?
            }
            (ChartType::Line, ChartData::Series(series)) => {
                draw_lines(&root, series, spec.target.as_ref().map(|t| t.value))?
            }
            (ChartType::GroupedBar, ChartData::Series(series)) => {
                draw_grouped_bars(&root, series, spec.target.as_ref().map(|t| t.value))?
            }
            (ChartType::Bar, ChartData::Points(points)) => {
                draw_bars(&root, points, spec.target.as_ref().map(|t| t.value))?
            }
            (kind, _) => {
                return Err(DashboardError::Export(format!(
                    "{:?} chart cannot show this data shape",
                    kind
                )))
            }
        }
        root.present().map_err(draw_err)?;
    }

    Ok(ChartImage {
        file,
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn rgb((r, g, b): Rgb8) -> RGBColor {
    RGBColor(r, g, b)
}

fn palette(i: usize) -> RGBColor {
    rgb(palette_rgb(i))
}

fn named_color(name: &str) -> RGBColor {
    rgb(named_rgb(name))
}

/// Upper end of the value axis: the largest value or target, plus headroom.
fn y_max<I: IntoIterator<Item = f64>>(values: I, target: Option<Decimal>) -> f64 {
    let top = values
        .into_iter()
        .chain(target.map(to_f64))
        .fold(0.0_f64, f64::max);
    if top <= 0.0 {
        1.0
    } else {
        top * 1.1
    }
}

/// Distinct values in first-seen order.
fn distinct<'a, I: IntoIterator<Item = &'a str>>(items: I) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Dashed horizontal target line across `[0, x_end]`.
fn dashed_line(y: f64, x_end: f64) -> Vec<PathElement<(f64, f64)>> {
    let dash = (x_end / 60.0).max(0.01);
    let mut segments = Vec::new();
    let mut x = 0.0;
    while x < x_end {
        let to = (x + dash).min(x_end);
        segments.push(PathElement::new(vec![(x, y), (to, y)], BLACK.stroke_width(2)));
        x += dash * 2.0;
    }
    segments
}

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn draw_bars(root: &Root<'_>, points: &[Point], target: Option<Decimal>) -> DashboardResult<()> {
    let n = points.len().max(1) as f64;
    let top = y_max(points.iter().map(|p| to_f64(p.value)), target);
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..n, 0f64..top)
        .map_err(draw_err)?;

    chart
        .draw_series(points.iter().enumerate().map(|(i, p)| {
            let x = i as f64;
            Rectangle::new([(x + 0.1, 0.0), (x + 0.9, to_f64(p.value))], palette(i).filled())
        }))
        .map_err(draw_err)?;

    if let Some(t) = target {
        chart.draw_series(dashed_line(to_f64(t), n)).map_err(draw_err)?;
    }
    Ok(())
}

fn draw_grouped_bars(
    root: &Root<'_>,
    series: &[SeriesPoint],
    target: Option<Decimal>,
) -> DashboardResult<()> {
    let xs = distinct(series.iter().map(|s| s.x.as_str()));
    let mut names = distinct(series.iter().map(|s| s.series.as_str()));
    names.sort_unstable();

    let n = xs.len().max(1) as f64;
    let width = 0.8 / names.len().max(1) as f64;
    let top = y_max(series.iter().map(|s| to_f64(s.value)), target);
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..n, 0f64..top)
        .map_err(draw_err)?;

    chart
        .draw_series(series.iter().map(|s| {
            let group = xs.iter().position(|x| *x == s.x).unwrap_or(0) as f64;
            let slot = names.iter().position(|n| *n == s.series).unwrap_or(0);
            let left = group + 0.1 + slot as f64 * width;
            Rectangle::new(
                [(left, 0.0), (left + width, to_f64(s.value))],
                palette(slot).filled(),
            )
        }))
        .map_err(draw_err)?;

    if let Some(t) = target {
        chart.draw_series(dashed_line(to_f64(t), n)).map_err(draw_err)?;
    }
    Ok(())
}

fn draw_lines(
    root: &Root<'_>,
    series: &[SeriesPoint],
    target: Option<Decimal>,
) -> DashboardResult<()> {
    let mut xs = distinct(series.iter().map(|s| s.x.as_str()));
    xs.sort_unstable();
    let mut names = distinct(series.iter().map(|s| s.series.as_str()));
    names.sort_unstable();

    let n = xs.len().max(1) as f64;
    let top = y_max(series.iter().map(|s| to_f64(s.value)), target);
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..n, 0f64..top)
        .map_err(draw_err)?;

    for (slot, name) in names.iter().enumerate() {
        let color = palette(slot);
        let mut line: Vec<(f64, f64)> = series
            .iter()
            .filter(|s| s.series == *name)
            .map(|s| {
                let x = xs.iter().position(|x| *x == s.x).unwrap_or(0) as f64 + 0.5;
                (x, to_f64(s.value))
            })
            .collect();
        line.sort_by(|a, b| a.0.total_cmp(&b.0));

        chart
            .draw_series(std::iter::once(PathElement::new(
                line.clone(),
                color.stroke_width(2),
            )))
            .map_err(draw_err)?;
        chart
            .draw_series(line.into_iter().map(|p| Circle::new(p, 4, color.filled())))
            .map_err(draw_err)?;
    }

    if let Some(t) = target {
        chart.draw_series(dashed_line(to_f64(t), n)).map_err(draw_err)?;
    }
    Ok(())
}

fn draw_pie(root: &Root<'_>, shares: &[Share]) -> DashboardResult<()> {
    let (w, h) = root.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (h.min(w) as f64 / 2.0) - MARGIN as f64;
    let total: f64 = shares.iter().map(|s| to_f64(s.value)).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (i, share) in shares.iter().enumerate() {
        let sweep = to_f64(share.value) / total * std::f64::consts::TAU;
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        let mut wedge = vec![center];
        for k in 0..=steps {
            let angle = start + sweep * k as f64 / steps as f64;
            wedge.push((
                center.0 + (radius * angle.cos()).round() as i32,
                center.1 + (radius * angle.sin()).round() as i32,
            ));
        }
        root.draw(&Polygon::new(wedge, palette(i).filled()))
            .map_err(draw_err)?;
        start += sweep;
    }
    Ok(())
}

/// Countries as horizontal bars shaded dark-to-bright by value, first
/// point at the top.
fn draw_geo(root: &Root<'_>, points: &[Point]) -> DashboardResult<()> {
    let n = points.len().max(1) as f64;
    let top = y_max(points.iter().map(|p| to_f64(p.value)), None);
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..top, 0f64..n)
        .map_err(draw_err)?;

    let shade = |v: f64| {
        let t = (v / top).clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
        RGBColor(mix(13.0, 240.0), mix(8.0, 249.0), mix(135.0, 33.0))
    };

    chart
        .draw_series(points.iter().enumerate().map(|(i, p)| {
            let v = to_f64(p.value);
            let y = n - 1.0 - i as f64;
            Rectangle::new([(0.0, y + 0.15), (v, y + 0.85)], shade(v).filled())
        }))
        .map_err(draw_err)?;
    Ok(())
}

/// Horizontal bullet gauge: shaded bands, value bar, threshold marker.
fn draw_gauge(root: &Root<'_>, reading: &GaugeReading) -> DashboardResult<()> {
    let axis_max = match to_f64(reading.axis_max) {
        m if m > 0.0 => m,
        _ => 1.0,
    };
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..axis_max, 0f64..1f64)
        .map_err(draw_err)?;

    chart
        .draw_series(reading.bands.iter().map(|b| {
            Rectangle::new(
                [(to_f64(b.from), 0.1), (to_f64(b.to).min(axis_max), 0.9)],
                named_color(&b.color).filled(),
            )
        }))
        .map_err(draw_err)?;

    let value = to_f64(reading.value).min(axis_max);
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.0, 0.35), (value, 0.65)],
            named_color(reading.status.color()).filled(),
        )))
        .map_err(draw_err)?;

    let target = to_f64(reading.target);
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(target, 0.05), (target, 0.95)],
            BLACK.stroke_width(4),
        )))
        .map_err(draw_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
