//! Rendering backend: executes a [`DrawPlan`] with plotters into **SVG** or **PNG**.
//!
//! - Ring charts on a square data plane, axis charts on the plan's ranges
//! - Locale-aware y tick labels (`30,000` vs `30.000`)
//! - Legend placement: `Inside`, `Right`, `Top`, `Bottom` (non-overlapping for external legends)
//! - Text is skipped when no font could be provisioned (see [`crate::fonts`])

pub mod adapter;
pub mod legend;
pub mod text;
pub mod util;

use anyhow::{Context, Result, anyhow};
use num_format::Locale;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::config::{LegendPlacement, OutputFormat, RenderOptions};
use crate::fonts;
use crate::plan::{self, AxesSpec, ChartKind, DrawCommand, DrawPlan, HAlign, LegendSpec, VAlign};

use adapter::{Plane, dash_pattern, draw_marker, line_style, rgba, split_dashes};
use legend::{
    draw_legend_panel, estimate_box_size_px, estimate_top_bottom_legend_height_px, text_budget,
};
use text::rotated_extent_px;
use util::{
    circle_points, compute_left_label_area_px, format_tick, map_locale, nice_ticks, pt_to_px,
    wedge_points,
};

const MARGIN: i32 = 16;
const TITLE_PX: u32 = 22;
const TICK_PX: u32 = 12;
const AXIS_TITLE_PX: u32 = 16;
const Y_TICKS: usize = 6;
const X_TICKS: usize = 8;
/// Half-width of the ring plane; leaves room for labels at 1.1 × radius.
const RING_EXTENT: f64 = 1.45;
/// Cap for legend label text in the right panel.
const RIGHT_TEXT_MAX_PX: u32 = 200;
const MAX_CANVAS: u32 = 20_000;

/// Pixel size of the canvas: the plan's size unless the options override it.
fn canvas_size(plan: &DrawPlan, opts: &RenderOptions) -> Result<(u32, u32)> {
    let w = opts.width.unwrap_or(plan.width);
    let h = opts.height.unwrap_or(plan.height);
    if w == 0 || h == 0 {
        return Err(anyhow!("canvas size must be positive, got {}x{}", w, h));
    }
    if w > MAX_CANVAS || h > MAX_CANVAS {
        return Err(anyhow!("canvas size {}x{} exceeds {MAX_CANVAS}px", w, h));
    }
    Ok((w, h))
}

/// Render to a file. A `.svg` or `.png` extension picks the format; other
/// paths use `opts.format`.
pub fn render_to_file<P: AsRef<Path>>(
    plan: &DrawPlan,
    out_path: P,
    opts: &RenderOptions,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let bytes = match OutputFormat::from_path(out_path).unwrap_or(opts.format) {
        OutputFormat::Svg => render_svg_string(plan, opts)?.into_bytes(),
        OutputFormat::Png => render_png_bytes(plan, opts)?,
    };
    fs::write(out_path, bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    log::debug!("rendered {:?} chart to {}", plan.kind, out_path.display());
    Ok(())
}

/// Render to an in-memory SVG document.
pub fn render_svg_string(plan: &DrawPlan, opts: &RenderOptions) -> Result<String> {
    let size = canvas_size(plan, opts)?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_plan(&root, plan, opts)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(svg)
}

/// Render to PNG-encoded bytes.
pub fn render_png_bytes(plan: &DrawPlan, opts: &RenderOptions) -> Result<Vec<u8>> {
    let (w, h) = canvas_size(plan, opts)?;
    let mut rgb = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (w, h)).into_drawing_area();
        draw_plan(&root, plan, opts)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    let img = image::RgbImage::from_raw(w, h, rgb)
        .ok_or_else(|| anyhow!("bitmap buffer does not match {}x{}", w, h))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .context("failed to encode PNG")?;
    Ok(out.into_inner())
}

/// Legend placement when the caller didn't choose one.
pub fn default_placement(kind: ChartKind) -> LegendPlacement {
    match kind {
        ChartKind::Ring => LegendPlacement::Right,
        ChartKind::Line | ChartKind::Bar(_) => LegendPlacement::Inside,
    }
}

fn draw_plan<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &DrawPlan,
    opts: &RenderOptions,
) -> Result<()> {
    let with_text = fonts::provision(None);
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let area = if with_text && !plan.title.trim().is_empty() {
        let band = TITLE_PX as i32 + 20;
        let (top, rest) = root.split_vertically(band);
        let (w, _) = top.dim_in_pixel();
        let style = FontDesc::new(FontFamily::SansSerif, TITLE_PX as f64, FontStyle::Bold)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        top.draw(&Text::new(plan.title.as_str(), (w as i32 / 2, band / 2), style))
            .map_err(|e| anyhow!("{:?}", e))?;
        rest
    } else {
        root.clone()
    };

    let (locale, dec_sep) = map_locale(&opts.locale);
    let mut frame = plan
        .axes
        .as_ref()
        .map(|a| AxisFrame::new(a, locale, dec_sep, with_text));
    let axis_x_start = MARGIN + frame.as_ref().map_or(0, |f| f.left_px);

    let legend = plan.legend.as_ref().filter(|l| !l.entries.is_empty());
    let placement = opts.legend.unwrap_or(default_placement(plan.kind));
    let (plot_area, legend_area) = split_for_legend(&area, legend, placement, axis_x_start);

    let (inner, ranges) = match (&mut frame, &plan.axes) {
        (Some(f), Some(axes)) => (f.inner(&plot_area), (axes.x_range, axes.y_range)),
        _ => (
            ring_square(&plot_area),
            ((-RING_EXTENT, RING_EXTENT), (-RING_EXTENT, RING_EXTENT)),
        ),
    };
    let plane = data_plane(&inner, ranges);

    if let (Some(f), Some(axes)) = (&frame, &plan.axes) {
        f.draw(&plane, axes)?;
    }
    for cmd in &plan.commands {
        draw_command(&plane, cmd, with_text)?;
    }

    if let Some(legend) = legend {
        match legend_area {
            Some(panel) => draw_legend_panel(&panel, legend, placement, axis_x_start, with_text)?,
            None => {
                let (iw, ih) = inner.dim_in_pixel();
                let budget = text_budget(iw as i32 * 2 / 5, legend.columns);
                let (bw, bh) = estimate_box_size_px(legend, budget);
                let x = (iw as i32 - bw - 8).max(0);
                let overlay = inner
                    .clone()
                    .shrink((x, 8), (bw.min(iw as i32), bh.min(ih as i32)));
                draw_legend_panel(&overlay, legend, LegendPlacement::Inside, 0, with_text)?;
            }
        }
    }
    Ok(())
}

fn split_for_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: Option<&LegendSpec>,
    placement: LegendPlacement,
    axis_x_start: i32,
) -> (DrawingArea<DB, Shift>, Option<DrawingArea<DB, Shift>>) {
    let Some(legend) = legend else {
        return (area.clone(), None);
    };
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    match placement {
        LegendPlacement::Right => {
            let (bw, _) = estimate_box_size_px(legend, RIGHT_TEXT_MAX_PX);
            let panel = (bw + MARGIN).clamp(w / 8, w * 2 / 5);
            let (plot, panel) = area.split_horizontally(w - panel);
            (plot, Some(panel))
        }
        LegendPlacement::Top => {
            let lh = estimate_top_bottom_legend_height_px(legend, axis_x_start, w)
                .max(40)
                .min(h / 2);
            let (panel, plot) = area.split_vertically(lh);
            (plot, Some(panel))
        }
        LegendPlacement::Bottom => {
            let lh = estimate_top_bottom_legend_height_px(legend, axis_x_start, w)
                .max(40)
                .min(h / 2);
            // keep at least 40px for plot area
            let (plot, panel) = area.split_vertically((h - lh).max(40));
            (plot, Some(panel))
        }
        LegendPlacement::Inside => (area.clone(), None),
    }
}

/// Largest centered square inside `area`, minus the margin.
fn ring_square<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> DrawingArea<DB, Shift> {
    let (w, h) = area.dim_in_pixel();
    let side = w.min(h).saturating_sub(2 * MARGIN as u32).max(1);
    area.clone().shrink(
        (w.saturating_sub(side) / 2, h.saturating_sub(side) / 2),
        (side, side),
    )
}

fn data_plane<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x, y): ((f64, f64), (f64, f64)),
) -> DrawingArea<DB, Plane> {
    let pixels = area.get_pixel_range();
    area.clone()
        .apply_coord_spec(Plane::new(x.0..x.1, y.0..y.1, pixels))
}

/// Tick labels and gutter sizes of an axis chart, measured before layout.
struct AxisFrame {
    left_px: i32,
    bottom_px: i32,
    y_ticks: Vec<(f64, String)>,
    x_ticks: Vec<(f64, String)>,
    x_vertical: bool,
    with_text: bool,
}

impl AxisFrame {
    fn new(axes: &AxesSpec, locale: &Locale, dec_sep: char, with_text: bool) -> Self {
        let y_ticks: Vec<(f64, String)> = nice_ticks(axes.y_range.0, axes.y_range.1, Y_TICKS)
            .into_iter()
            .map(|v| (v, format_tick(v, locale, dec_sep)))
            .collect();
        let x_ticks: Vec<(f64, String)> = if axes.x_ticks.is_empty() {
            nice_ticks(axes.x_range.0, axes.x_range.1, X_TICKS)
                .into_iter()
                .map(|v| (v, format_tick(v, locale, dec_sep)))
                .collect()
        } else {
            axes.x_ticks.clone()
        };
        // plotters only turns text by quarter turns; any tilt renders vertically.
        let x_vertical = axes.x_rotation > 0;

        let (left_px, bottom_px) = if with_text {
            let labels: Vec<String> = y_ticks.iter().map(|(_, s)| s.clone()).collect();
            let tick_h = x_ticks
                .iter()
                .map(|(_, s)| rotated_extent_px(s, TICK_PX, if x_vertical { 90 } else { 0 }).1)
                .max()
                .unwrap_or(TICK_PX);
            (
                compute_left_label_area_px(&labels, TICK_PX) as i32,
                8 + tick_h as i32 + 8 + AXIS_TITLE_PX as i32 + 6,
            )
        } else {
            (MARGIN, MARGIN)
        };

        Self {
            left_px,
            bottom_px,
            y_ticks,
            x_ticks,
            x_vertical,
            with_text,
        }
    }

    /// Plotting rectangle inside `area`; clamps the bottom gutter to the area.
    fn inner<DB: DrawingBackend>(&mut self, area: &DrawingArea<DB, Shift>) -> DrawingArea<DB, Shift> {
        let (w, h) = area.dim_in_pixel();
        let (w, h) = (w as i32, h as i32);
        self.bottom_px = self.bottom_px.min(h * 45 / 100);
        let left = MARGIN + self.left_px;
        let iw = (w - left - MARGIN).max(1);
        let ih = (h - MARGIN - self.bottom_px).max(1);
        area.clone().shrink((left, MARGIN), (iw, ih))
    }

    fn tick_style(&self, h: HPos, v: VPos) -> TextStyle<'static> {
        TextStyle::from((FontFamily::SansSerif, TICK_PX))
            .color(&BLACK)
            .pos(Pos::new(h, v))
    }

    fn draw<DB: DrawingBackend>(&self, plane: &DrawingArea<DB, Plane>, axes: &AxesSpec) -> Result<()> {
        let (x0, x1) = axes.x_range;
        let (y0, y1) = axes.y_range;
        let axis = BLACK.stroke_width(1);
        plane
            .draw(&PathElement::new(
                vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
                axis,
            ))
            .map_err(|e| anyhow!("{:?}", e))?;

        for (v, label) in &self.y_ticks {
            plane
                .draw(&(EmptyElement::at((x0, *v)) + PathElement::new(vec![(0, 0), (-5, 0)], axis)))
                .map_err(|e| anyhow!("{:?}", e))?;
            if self.with_text {
                plane
                    .draw(&(EmptyElement::at((x0, *v))
                        + Text::new(
                            label.clone(),
                            (-8, 0),
                            self.tick_style(HPos::Right, VPos::Center),
                        )))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }

        let (iw, _) = plane.dim_in_pixel();
        let stride = self.x_stride(iw as i32);
        for (i, (v, label)) in self.x_ticks.iter().enumerate() {
            if *v < x0 || *v > x1 {
                continue;
            }
            plane
                .draw(&(EmptyElement::at((*v, y0)) + PathElement::new(vec![(0, 0), (0, 5)], axis)))
                .map_err(|e| anyhow!("{:?}", e))?;
            if !self.with_text || i % stride != 0 {
                continue;
            }
            let style = if self.x_vertical {
                self.tick_style(HPos::Right, VPos::Center)
                    .transform(FontTransform::Rotate270)
            } else {
                self.tick_style(HPos::Center, VPos::Top)
            };
            plane
                .draw(&(EmptyElement::at((*v, y0)) + Text::new(label.clone(), (0, 8), style)))
                .map_err(|e| anyhow!("{:?}", e))?;
        }

        if self.with_text {
            let title = TextStyle::from((FontFamily::SansSerif, AXIS_TITLE_PX)).color(&BLACK);
            if !axes.x_title.is_empty() {
                plane
                    .draw(&(EmptyElement::at(((x0 + x1) / 2.0, y0))
                        + Text::new(
                            axes.x_title.clone(),
                            (0, self.bottom_px - 4),
                            title.clone().pos(Pos::new(HPos::Center, VPos::Bottom)),
                        )))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            if !axes.y_title.is_empty() {
                plane
                    .draw(&(EmptyElement::at((x0, (y0 + y1) / 2.0))
                        + Text::new(
                            axes.y_title.clone(),
                            (-self.left_px + AXIS_TITLE_PX as i32 / 2 + 2, 0),
                            title
                                .transform(FontTransform::Rotate270)
                                .pos(Pos::new(HPos::Center, VPos::Center)),
                        )))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        Ok(())
    }

    /// Label every `stride`-th x tick so neighbours don't collide.
    fn x_stride(&self, plot_w: i32) -> usize {
        let n = self.x_ticks.len().max(1);
        let per_label = if self.x_vertical {
            TICK_PX as i32 + 4
        } else {
            self.x_ticks
                .iter()
                .map(|(_, s)| text::estimate_text_width_px(s, TICK_PX) as i32 + 8)
                .max()
                .unwrap_or(1)
        };
        let fit = (plot_w / per_label.max(1)).max(1) as usize;
        n.div_ceil(fit).max(1)
    }
}

fn h_pos(a: HAlign) -> HPos {
    match a {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    }
}

fn v_pos(a: VAlign) -> VPos {
    match a {
        VAlign::Top => VPos::Top,
        VAlign::Center => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    }
}

fn text_style(st: &plan::TextStyle) -> TextStyle<'static> {
    let weight = if st.bold {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    FontDesc::new(FontFamily::SansSerif, pt_to_px(st.size) as f64, weight)
        .color(&rgba(st.color, st.alpha))
        .pos(Pos::new(h_pos(st.h_align), v_pos(st.v_align)))
}

fn draw_command<DB: DrawingBackend>(
    plane: &DrawingArea<DB, Plane>,
    cmd: &DrawCommand,
    with_text: bool,
) -> Result<()> {
    match cmd {
        DrawCommand::Wedge {
            center,
            radius,
            start_deg,
            sweep_deg,
            color,
        } => {
            if *sweep_deg <= 0.0 {
                return Ok(());
            }
            plane
                .draw(&Polygon::new(
                    wedge_points(*center, *radius, *start_deg, *sweep_deg),
                    rgba(*color, 1.0).filled(),
                ))
                .map_err(|e| anyhow!("{:?}", e))
        }
        DrawCommand::Circle {
            center,
            radius,
            color,
        } => plane
            .draw(&Polygon::new(
                circle_points(*center, *radius),
                rgba(*color, 1.0).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e)),
        DrawCommand::Rect {
            x0,
            y0,
            x1,
            y1,
            color,
            alpha,
        } => {
            // Zero-height bars (dense grid fill) have no visible area.
            if (y1 - y0).abs() < f64::EPSILON || (x1 - x0).abs() < f64::EPSILON {
                return Ok(());
            }
            let (left, right) = (x0.min(*x1), x0.max(*x1));
            let (bottom, top) = (y0.min(*y1), y0.max(*y1));
            plane
                .draw(&Rectangle::new(
                    [(left, top), (right, bottom)],
                    rgba(*color, *alpha).filled(),
                ))
                .map_err(|e| anyhow!("{:?}", e))
        }
        DrawCommand::Polyline {
            points,
            color,
            width,
            dash,
            marker,
            marker_size,
        } => {
            let style = line_style(*color, *width);
            let runs = match dash_pattern(*dash, *width) {
                Some(pattern) => split_dashes(
                    points,
                    |p| {
                        let (px, py) = plane.map_coordinate(&p);
                        (px as f64, py as f64)
                    },
                    &pattern,
                ),
                None => vec![points.clone()],
            };
            for run in runs.into_iter().filter(|r| r.len() >= 2) {
                plane
                    .draw(&PathElement::new(run, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            if let Some(shape) = marker {
                // Marker size is a diameter in points.
                let radius = (pt_to_px(*marker_size) as i32 / 2).max(2);
                for p in points {
                    draw_marker(plane, *p, radius, rgba(*color, 1.0), *shape)?;
                }
            }
            Ok(())
        }
        DrawCommand::Text { pos, text, style } => {
            if !with_text || text.is_empty() {
                return Ok(());
            }
            plane
                .draw(&Text::new(text.as_str(), *pos, text_style(style)))
                .map_err(|e| anyhow!("{:?}", e))
        }
    }
}
