use chrono::{NaiveDate, NaiveDateTime};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt, Rgb,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::chart::{render_chart_png_in, ChartImage};
use super::legend::{chart_captions, Rgb8};
use super::{write_atomically, ExportedFile};
use crate::error::DashboardError;
use crate::report::{Report, SectionBody};
use crate::types::Role;
use crate::DashboardResult;

/// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const LEFT: f32 = 50.0;
pub const TOP: f32 = PAGE_HEIGHT - 50.0;
pub const BOTTOM_MARGIN: f32 = 50.0;
/// A chart title never starts below this line.
pub const CHART_BREAK: f32 = 150.0;
pub const IMAGE_WIDTH: f32 = 500.0;

pub fn pdf_file_name(role: Role, date: NaiveDate) -> String {
    format!("{}_report_{}.pdf", role.slug(), date.format("%Y%m%d"))
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Vertical position on the current page, counted from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub page: usize,
    pub y: f32,
}

impl Default for PageCursor {
    fn default() -> Self {
        PageCursor { page: 0, y: TOP }
    }
}

impl PageCursor {
    pub fn down(&mut self, dy: f32) {
        self.y -= dy;
    }

    pub fn new_page(&mut self) {
        self.page += 1;
        self.y = TOP;
    }

    /// Break before a chart title that would start below `CHART_BREAK`.
    pub fn reserve_title(&mut self) {
        if self.y < CHART_BREAK {
            self.new_page();
        }
    }

    /// Break if an image of `height` would cross the bottom margin, then
    /// return the y of the image's lower edge and move below it.
    pub fn place_image(&mut self, height: f32) -> f32 {
        if self.y - height < BOTTOM_MARGIN {
            self.new_page();
        }
        let bottom = self.y - height;
        self.y -= height + 20.0;
        bottom
    }

    /// Break if a line of `size` would sit below the bottom margin.
    pub fn reserve_line(&mut self, size: f32) {
        if self.y - size < BOTTOM_MARGIN {
            self.new_page();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
        color: Option<Rgb8>,
    },
    /// `index` into the visual sections of the report
    Image {
        page: usize,
        index: usize,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text { page, .. } | DrawOp::Image { page, .. } => *page,
        }
    }
}

fn text_op(cur: &PageCursor, size: f32, bold: bool, text: String) -> DrawOp {
    DrawOp::Text {
        page: cur.page,
        y: cur.y,
        size,
        bold,
        text,
        color: None,
    }
}

/// Position every line and image. `image_sizes[i]` is the pixel size of
/// visual section `i`, or `None` for a placeholder. Each chart image is
/// followed by its captions at the chart's font size.
pub fn layout(
    report: &Report,
    generated_at: NaiveDateTime,
    image_sizes: &[Option<(u32, u32)>],
) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    let mut cur = PageCursor::default();

    ops.push(text_op(&cur, 14.0, true, report.title.clone()));
    cur.down(20.0);
    ops.push(text_op(
        &cur,
        12.0,
        false,
        format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    ));
    cur.down(20.0);
    ops.push(text_op(&cur, 12.0, false, format!("Date Range: {}", report.date_range)));
    cur.down(30.0);

    ops.push(text_op(&cur, 12.0, true, "Key Performance Indicators".to_string()));
    cur.down(20.0);
    for line in report.kpi_lines() {
        ops.push(text_op(&cur, 10.0, false, line));
        cur.down(15.0);
    }
    cur.down(15.0);

    let mut images = Vec::new();
    for (index, section) in report.visual_sections().enumerate() {
        cur.reserve_title();
        ops.push(text_op(&cur, 12.0, true, section.title.clone()));
        cur.down(20.0);
        match (&section.body, image_sizes.get(index).copied().flatten()) {
            (SectionBody::Chart(spec), Some((w, h))) if w > 0 => {
                let height = IMAGE_WIDTH * h as f32 / w as f32;
                let y = cur.place_image(height);
                images.push(DrawOp::Image {
                    page: cur.page,
                    index,
                    y,
                    width: IMAGE_WIDTH,
                    height,
                });
                let size = spec.layout.font_size.max(1) as f32;
                for caption in chart_captions(spec) {
                    cur.reserve_line(size);
                    ops.push(DrawOp::Text {
                        page: cur.page,
                        y: cur.y,
                        size,
                        bold: false,
                        text: caption.text,
                        color: caption.color,
                    });
                    cur.down(size + 4.0);
                }
                cur.down(10.0);
            }
            (SectionBody::Placeholder { message }, _) => {
                ops.push(text_op(&cur, 10.0, false, message.clone()));
                cur.down(20.0);
            }
            _ => {}
        }
    }
    ops.extend(images);
    ops
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn pdf_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Export(format!("PDF generation failed: {}", e))
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn fill((r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

/// One image per visual section, `None` for placeholders. On error every
/// image rendered so far is dropped, which deletes its file.
fn render_charts(report: &Report, dir: &Path) -> DashboardResult<Vec<Option<ChartImage>>> {
    let mut charts = Vec::new();
    for section in report.visual_sections() {
        charts.push(match &section.body {
            SectionBody::Chart(spec) => Some(render_chart_png_in(spec, dir)?),
            _ => None,
        });
    }
    Ok(charts)
}

/// Render the report to PDF bytes. Chart images live in temp files that are
/// removed when this returns, whether or not it succeeds.
pub fn render_pdf(report: &Report, generated_at: NaiveDateTime) -> DashboardResult<Vec<u8>> {
    let charts = render_charts(report, &std::env::temp_dir())?;
    let sizes: Vec<Option<(u32, u32)>> = charts
        .iter()
        .map(|c| c.as_ref().map(|img| (img.width, img.height)))
        .collect();
    let ops = layout(report, generated_at, &sizes);

    let (doc, page, layer) =
        PdfDocument::new(&report.title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut layers: Vec<PdfLayerReference> = vec![doc.get_page(page).get_layer(layer)];
    let last_page = ops.iter().map(DrawOp::page).max().unwrap_or(0);
    while layers.len() <= last_page {
        let (p, l) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        layers.push(doc.get_page(p).get_layer(l));
    }

    for op in &ops {
        match op {
            DrawOp::Text {
                page,
                y,
                size,
                bold: is_bold,
                text,
                color,
            } => {
                let font: &IndirectFontRef = if *is_bold { &bold } else { &regular };
                let layer = &layers[*page];
                if let Some(c) = color {
                    layer.set_fill_color(fill(*c));
                }
                layer.use_text(text.as_str(), *size, mm(LEFT), mm(*y), font);
                if color.is_some() {
                    layer.set_fill_color(fill((0, 0, 0)));
                }
            }
            DrawOp::Image {
                page,
                index,
                y,
                width,
                ..
            } => {
                if let Some(Some(chart)) = charts.get(*index) {
                    place_png(&layers[*page], chart, *y, *width)?;
                }
            }
        }
    }

    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    tracing::debug!(
        pages = last_page + 1,
        charts = charts.iter().flatten().count(),
        "pdf rendered"
    );
    Ok(bytes)
}

fn place_png(layer: &PdfLayerReference, chart: &ChartImage, y: f32, width: f32) -> DashboardResult<()> {
    let reader = BufReader::new(File::open(chart.path())?);
    let decoder = printpdf::image_crate::codecs::png::PngDecoder::new(reader).map_err(pdf_err)?;
    let image = Image::try_from(decoder).map_err(pdf_err)?;
    let scale = width / chart.width as f32;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(LEFT)),
            translate_y: Some(mm(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
    Ok(())
}

/// Write `dir/<role>_report_<date>.pdf`.
pub fn export_pdf(dir: &Path, report: &Report, now: NaiveDateTime) -> DashboardResult<ExportedFile> {
    let bytes = render_pdf(report, now)?;
    let path = write_atomically(dir, &pdf_file_name(report.role, now.date()), &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "pdf exported");
    Ok(ExportedFile {
        path,
        bytes: bytes.len(),
        rows: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Point;
    use crate::report::{ChartSpec, ChartType, ReportSection};
    use crate::export::legend::palette_rgb;
    use crate::test_support::{at, date};
    use crate::types::DateRange;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn report(sections: Vec<ReportSection>) -> Report {
        Report {
            role: Role::Manager,
            title: "Sales Manager Dashboard Report".to_string(),
            date_range: DateRange::new(date(2024, 1, 1), date(2024, 12, 31)),
            sections,
        }
    }

    fn chart(title: &str) -> ReportSection {
        ReportSection::chart_or(
            title,
            ChartSpec::bar(vec![Point::new("A", dec!(1))]),
            "No data.",
        )
    }

    fn texts(ops: &[DrawOp]) -> Vec<(usize, f32, String)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { page, y, text, .. } => Some((*page, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_file_names() {
        let d = date(2024, 6, 30);
        assert_eq!(pdf_file_name(Role::Manager, d), "sales_manager_report_20240630.pdf");
        assert_eq!(pdf_file_name(Role::Salesperson, d), "salesperson_report_20240630.pdf");
        assert_eq!(pdf_file_name(Role::Marketer, d), "sales_marketer_report_20240630.pdf");
    }

    #[test]
    fn test_header_and_kpi_positions() {
        let r = report(vec![ReportSection::kpi("Total Revenue", "$1.00")]);
        let ops = layout(&r, at(2024, 7, 1, 9), &[]);
        assert_eq!(
            texts(&ops),
            vec![
                (0, 742.0, "Sales Manager Dashboard Report".to_string()),
                (0, 722.0, "Generated on: 2024-07-01 09:00:00".to_string()),
                (0, 702.0, "Date Range: 2024-01-01 to 2024-12-31".to_string()),
                (0, 672.0, "Key Performance Indicators".to_string()),
                (0, 652.0, "Total Revenue: $1.00".to_string()),
            ]
        );
    }

    #[test]
    fn test_cursor_breaks_before_low_title() {
        let mut c = PageCursor { page: 0, y: 149.0 };
        c.reserve_title();
        assert_eq!(c, PageCursor { page: 1, y: TOP });

        let mut c = PageCursor { page: 0, y: 150.0 };
        c.reserve_title();
        assert_eq!(c.page, 0);
    }

    #[test]
    fn test_cursor_breaks_before_image_crossing_margin() {
        let mut c = PageCursor { page: 0, y: 200.0 };
        assert_eq!(c.place_image(150.0), 50.0);
        assert_eq!(c.page, 0);
        assert_eq!(c.y, 30.0);

        let mut c = PageCursor { page: 0, y: 200.0 };
        let bottom = c.place_image(151.0);
        assert_eq!(c.page, 1);
        assert_eq!(bottom, TOP - 151.0);
    }

    #[test]
    fn test_charts_spill_onto_new_pages() {
        let sections: Vec<ReportSection> = (0..6).map(|i| chart(&format!("Chart {}", i))).collect();
        let r = report(sections);
        // 1000x214 px -> 500x107 pt
        let sizes = vec![Some((1000, 214)); 6];
        let ops = layout(&r, at(2024, 7, 1, 9), &sizes);
        let images: Vec<&DrawOp> = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .collect();
        assert_eq!(images.len(), 6);
        assert!(images.iter().any(|op| op.page() > 0));
        for op in &images {
            if let DrawOp::Image { y, height, .. } = op {
                assert!(*y >= BOTTOM_MARGIN);
                assert_eq!(*height, 107.0);
            }
        }
    }

    #[test]
    fn test_captions_follow_chart_image() {
        let spec = ChartSpec::bar(vec![Point::new("Laptop", dec!(100)), Point::new("Mouse", dec!(20))])
            .axes("Product", "Revenue")
            .with_target(dec!(1000));
        let r = report(vec![ReportSection::chart_or("Total Revenue by Product", spec, "No data.")]);
        // 1000x300 px -> 500x150 pt
        let ops = layout(&r, at(2024, 7, 1, 9), &[Some((1000, 300))]);

        let image_y = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image { y, .. } => Some(*y),
                _ => None,
            })
            .unwrap();
        let captions: Vec<(f32, f32, String, Option<Rgb8>)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, size, text, color, .. } if *y < image_y => {
                    Some((*y, *size, text.clone(), *color))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            captions,
            vec![
                (image_y - 20.0, 7.0, "Revenue by Product".to_string(), None),
                (image_y - 31.0, 7.0, "1. Laptop: $100.00".to_string(), Some(palette_rgb(0))),
                (image_y - 42.0, 7.0, "2. Mouse: $20.00".to_string(), Some(palette_rgb(1))),
                (image_y - 53.0, 7.0, "- - Target: $1,000.00".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_captions_break_page_at_bottom_margin() {
        let points: Vec<Point> = (0..80).map(|i| Point::new(format!("P{}", i), dec!(1))).collect();
        let r = report(vec![ReportSection::chart_or("Many", ChartSpec::bar(points), "No data.")]);
        let ops = layout(&r, at(2024, 7, 1, 9), &[Some((1000, 300))]);
        let last = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .last()
            .unwrap();
        assert_eq!(last.page(), 1);
        for op in &ops {
            if let DrawOp::Text { y, .. } = op {
                assert!(*y >= BOTTOM_MARGIN);
            }
        }
    }

    #[test]
    fn test_placeholder_prints_message() {
        let r = report(vec![ReportSection::chart_or(
            "Sales by Channel",
            ChartSpec::bar(vec![]),
            "No channel data.",
        )]);
        let ops = layout(&r, at(2024, 7, 1, 9), &[None]);
        let t = texts(&ops);
        assert_eq!(t[t.len() - 1].2, "No channel data.");
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
    }

    #[test]
    fn test_failed_chart_removes_earlier_images() {
        let mut broken = ChartSpec::bar(vec![Point::new("A", dec!(1))]);
        broken.chart_type = ChartType::Pie;
        let r = report(vec![
            chart("Total Revenue by Product"),
            ReportSection::chart_or("Broken", broken, "No data."),
        ]);
        let dir = tempfile::tempdir().unwrap();
        assert!(render_charts(&r, dir.path()).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(render_pdf(&r, at(2024, 7, 1, 9)).is_err());
    }

    #[test]
    fn test_render_pdf_bytes() {
        let r = report(vec![ReportSection::kpi("Total Revenue", "$1.00"), chart("Total Revenue by Product")]);
        let bytes = render_pdf(&r, at(2024, 7, 1, 9)).unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
    }
}
