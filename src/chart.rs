//! Miss ratio curve rendering

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::combinators::BindKeyPoints;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::OutputError;
use crate::table::PlotPoint;

/// Image formats the chart can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
    Bmp,
}

impl OutputFormat {
    /// Infers the format from the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, OutputError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("svg") => Ok(OutputFormat::Svg),
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            Some("bmp") => Ok(OutputFormat::Bmp),
            _ => Err(OutputError::UnsupportedFormat(path.into())),
        }
    }
}

/// Fixed look of the chart
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub size: (u32, u32),
    pub title: &'static str,
    pub series_label: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub color: RGBColor,
    pub y_range: (f64, f64),
    /// Pixels between a point and its annotation
    pub annotation_offset: i32,
    /// Room under the plot for the rotated cache size labels and the axis title
    pub x_label_area_size: u32,
    pub y_label_area_size: u32,
    pub caption_font_size: f64,
    pub label_font_size: f64,
    pub annotation_font_size: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            size: (1200, 800),
            title: "OPT Miss Ratio Curve",
            series_label: "OPT Miss Ratio Curve",
            x_desc: "Cache Size",
            y_desc: "Miss Ratio",
            color: RED,
            y_range: (-0.03, 1.03),
            annotation_offset: 10,
            x_label_area_size: 140,
            y_label_area_size: 70,
            caption_font_size: 32.0,
            label_font_size: 13.0,
            annotation_font_size: 14.0,
        }
    }
}

/// Everything that ends up on the chart, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub points: Vec<PlotPoint>,
    /// Distinct log2 positions, ascending
    pub x_ticks: Vec<i32>,
    /// Cache sizes shown at `x_ticks`
    pub x_labels: Vec<String>,
    /// One label per point, same order as `points`
    pub annotations: Vec<String>,
    pub x_range: (i32, i32),
}

impl ChartModel {
    pub fn make(points: Vec<PlotPoint>) -> Self {
        let mut ticks: Vec<(i32, u64)> = points
            .iter()
            .map(|p| (axis_position(p), p.cache_size))
            .collect();
        ticks.sort();
        ticks.dedup();

        let x_range = match (ticks.first(), ticks.last()) {
            (Some(&(min, _)), Some(&(max, _))) => (min - 1, max + 1),
            _ => (0, 1),
        };

        let annotations = points
            .iter()
            .map(|p| format!("{:.2}", p.miss_ratio))
            .collect();

        Self {
            x_ticks: ticks.iter().map(|t| t.0).collect(),
            x_labels: ticks.iter().map(|t| t.1.to_string()).collect(),
            annotations,
            x_range,
            points,
        }
    }

    /// Label for a tick position, the cache size rather than its log
    pub fn tick_label(&self, x: i32) -> String {
        self.x_ticks
            .iter()
            .position(|&t| t == x)
            .map(|i| self.x_labels[i].clone())
            .unwrap_or_default()
    }
}

/// Retained sizes are powers of two, so their log2 is a whole number
fn axis_position(point: &PlotPoint) -> i32 {
    point.log_cache_size.round() as i32
}

/// Draw the whole chart onto `root`
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    model: &ChartModel,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(style.title, ("sans-serif", style.caption_font_size).into_font())
        .margin(20)
        .x_label_area_size(style.x_label_area_size)
        .y_label_area_size(style.y_label_area_size)
        .build_cartesian_2d(
            (model.x_range.0..model.x_range.1).with_key_points(model.x_ticks.clone()),
            style.y_range.0..style.y_range.1,
        )?;

    let x_formatter = |x: &i32| model.tick_label(*x);
    chart
        .configure_mesh()
        .x_desc(style.x_desc)
        .y_desc(style.y_desc)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .x_label_style(
            ("sans-serif", style.label_font_size)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", style.label_font_size))
        .draw()?;

    let color = style.color;
    chart
        .draw_series(LineSeries::new(
            model.points.iter().map(|p| (axis_position(p), p.miss_ratio)),
            color.stroke_width(2),
        ))?
        .label(style.series_label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    let annotation_style = TextStyle::from(("sans-serif", style.annotation_font_size).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(model.points.iter().zip(model.annotations.iter()).map(
        |(p, text)| {
            EmptyElement::at((axis_position(p), p.miss_ratio))
                + Text::new(
                    text.clone(),
                    (0, -style.annotation_offset),
                    annotation_style.clone(),
                )
        },
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Sibling of `path` that keeps its extension, so the bitmap
/// encoder still picks the right format
fn staging_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial.{}", stem, extension))
}

/// Render the chart and move it into place at `path`.
/// Nothing is left at `path` if rendering fails.
pub fn render(
    model: &ChartModel,
    style: &ChartStyle,
    path: &Path,
) -> Result<(), OutputError> {
    let format = OutputFormat::from_path(path)?;
    let staging = staging_path(path);

    let result = match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(&staging, style.size).into_drawing_area();
            draw_chart(&root, model, style).map_err(|e| e.to_string())
        }
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Bmp => {
            let root = BitMapBackend::new(&staging, style.size).into_drawing_area();
            draw_chart(&root, model, style).map_err(|e| e.to_string())
        }
    };

    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(OutputError::RenderError(path.into(), e));
    }

    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        OutputError::WriteError(path.into(), e)
    })
}
