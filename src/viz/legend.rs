//! Legend layout and drawing: boxed grids (right panel or inside overlay)
//! and flowing table bands (top/bottom).

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::adapter::{dash_pattern, rgba, split_dashes};
use super::text::{estimate_text_width_px, truncate_to_width, wrap_text_to_width};
use crate::config::LegendPlacement;
use crate::plan::{LegendEntry, LegendGlyph, LegendSpec};

pub const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 2;
const ROW_GAP: i32 = 4;
const PAD: i32 = 8;
const GLYPH_W: i32 = 22;
const GLYPH_TO_TEXT: i32 = 6;
const TRAILING_GAP: i32 = 14;
const MIN_TEXT_W: i32 = 40;
const MIN_SLOT_W: i32 = 60;

fn block_overhead() -> i32 {
    GLYPH_W + GLYPH_TO_TEXT + TRAILING_GAP
}

fn label_style() -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center))
}

/// Table layout of a TOP/BOTTOM band: which entries go on which row and how
/// wide each column slot is. Column x-positions are shared by all rows.
struct FlowLayout {
    rows: Vec<Vec<usize>>,
    slot_w: Vec<i32>,
}

impl FlowLayout {
    /// Greedy packing into rows, then per-column widths from the longest
    /// single-line label; uniform slots (with wrapping) when those don't fit.
    fn new(labels: &[&str], start_x: i32, total_w: i32) -> Self {
        let usable = total_w - PAD;
        let per_item_cap = (((usable - start_x) as f32) * 0.35).max(140.0) as i32;
        let block_w = |label: &str, cap: i32| -> i32 {
            let lines = wrap_text_to_width(label, FONT_PX, cap.max(MIN_TEXT_W) as u32);
            let w = lines
                .iter()
                .map(|s| estimate_text_width_px(s, FONT_PX) as i32)
                .max()
                .unwrap_or(0);
            block_overhead() + w
        };

        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut cur: Vec<usize> = Vec::new();
        let mut x = start_x;
        for (i, label) in labels.iter().enumerate() {
            let cap_now = ((usable - x).max(MIN_TEXT_W) - block_overhead()).min(per_item_cap);
            let mut w = block_w(label, cap_now);
            if x + w > usable && !cur.is_empty() {
                rows.push(std::mem::take(&mut cur));
                x = start_x;
                w = block_w(label, ((usable - start_x) - block_overhead()).min(per_item_cap));
            }
            x += w;
            cur.push(i);
        }
        if !cur.is_empty() {
            rows.push(cur);
        }

        let k = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let mut col_w = vec![MIN_SLOT_W; k];
        for row in &rows {
            for (ci, &i) in row.iter().enumerate() {
                let w = block_overhead() + estimate_text_width_px(labels[i], FONT_PX) as i32;
                col_w[ci] = col_w[ci].max(w);
            }
        }
        let slot_w = if start_x + col_w.iter().sum::<i32>() <= usable {
            col_w
        } else {
            vec![((usable - start_x) / k as i32).max(MIN_SLOT_W); k]
        };
        Self { rows, slot_w }
    }

    fn text_cap(&self, col: usize) -> u32 {
        (self.slot_w[col] - block_overhead()).max(MIN_TEXT_W) as u32
    }

    fn row_lines(&self, row: &[usize], labels: &[&str]) -> Vec<Vec<String>> {
        row.iter()
            .enumerate()
            .map(|(ci, &i)| wrap_text_to_width(labels[i], FONT_PX, self.text_cap(ci)))
            .collect()
    }

    fn col_x(&self, start_x: i32) -> Vec<i32> {
        self.slot_w
            .iter()
            .scan(start_x, |acc, w| {
                let x = *acc;
                *acc += w;
                Some(x)
            })
            .collect()
    }
}

fn row_height(lines: &[Vec<String>]) -> i32 {
    lines
        .iter()
        .map(|l| l.len().max(1) as i32 * LINE_H)
        .max()
        .unwrap_or(LINE_H)
        .max(LINE_H)
}

fn labels_of(legend: &LegendSpec) -> Vec<&str> {
    legend.entries.iter().map(|e| e.label.as_str()).collect()
}

/// Estimate how tall the TOP/BOTTOM legend band must be to fit all entries,
/// honoring wrapping and multi-row flow. Returns pixels.
pub fn estimate_top_bottom_legend_height_px(
    legend: &LegendSpec,
    start_x: i32,
    total_w: i32,
) -> i32 {
    let labels = labels_of(legend);
    let flow = FlowLayout::new(&labels, start_x, total_w);
    let rows_h: i32 = flow
        .rows
        .iter()
        .map(|r| row_height(&flow.row_lines(r, &labels)))
        .sum();
    let gaps = ROW_GAP * flow.rows.len().saturating_sub(1) as i32;
    PAD * 2 + rows_h + gaps
}

/// Pixel size of a boxed legend grid (`columns` columns, filled column by column).
pub fn estimate_box_size_px(legend: &LegendSpec, max_text_w: u32) -> (i32, i32) {
    let cols = legend.columns.max(1);
    let per_col = legend.entries.len().div_ceil(cols).max(1);
    let text_w = legend
        .entries
        .iter()
        .map(|e| estimate_text_width_px(&e.label, FONT_PX).min(max_text_w) as i32)
        .max()
        .unwrap_or(0);
    let col_w = GLYPH_W + GLYPH_TO_TEXT + text_w + PAD;
    (
        PAD + col_w * cols as i32,
        PAD * 2 + per_col as i32 * (LINE_H + ROW_GAP) - ROW_GAP,
    )
}

/// Draw the legend for one placement. `axis_x_start_px` aligns TOP/BOTTOM
/// bands with the plot's x-axis; `with_text` is false when no font is available.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &LegendSpec,
    placement: LegendPlacement,
    axis_x_start_px: i32,
    with_text: bool,
) -> Result<()> {
    match placement {
        LegendPlacement::Right => {
            area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
            let (w, h) = area.dim_in_pixel();
            let max_text_w = text_budget(w as i32, legend.columns);
            let (_, box_h) = estimate_box_size_px(legend, max_text_w);
            // Vertically centered next to the plot.
            let top = ((h as i32 - box_h) / 2).max(0);
            let inner = area.clone().shrink((0, top), (w, (box_h as u32).min(h)));
            draw_legend_box(&inner, legend, max_text_w, with_text)
        }
        LegendPlacement::Top | LegendPlacement::Bottom => {
            area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
            draw_flow_legend(area, legend, axis_x_start_px, with_text)
        }
        LegendPlacement::Inside => {
            let (w, _) = area.dim_in_pixel();
            draw_legend_box(area, legend, text_budget(w as i32, legend.columns), with_text)
        }
    }
}

/// Per-column text width available inside an area `w` pixels wide.
pub fn text_budget(w: i32, columns: usize) -> u32 {
    let cols = columns.max(1) as i32;
    ((w - PAD) / cols - GLYPH_W - GLYPH_TO_TEXT - PAD).max(MIN_TEXT_W) as u32
}

/// Grid legend with optional frame; entries fill columns top to bottom.
pub fn draw_legend_box<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &LegendSpec,
    max_text_w: u32,
    with_text: bool,
) -> Result<()> {
    let (w, h) = estimate_box_size_px(legend, max_text_w);
    if legend.frame {
        area.draw(&Rectangle::new([(0, 0), (w - 1, h - 1)], WHITE.mix(0.8).filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&Rectangle::new(
            [(0, 0), (w - 1, h - 1)],
            BLACK.mix(0.25).stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let cols = legend.columns.max(1);
    let per_col = legend.entries.len().div_ceil(cols).max(1);
    let col_w = (w - PAD) / cols as i32;
    for (i, entry) in legend.entries.iter().enumerate() {
        let (c, r) = ((i / per_col) as i32, (i % per_col) as i32);
        let x = PAD + c * col_w;
        let y = PAD + r * (LINE_H + ROW_GAP) + LINE_H / 2;
        draw_glyph(area, x, y, entry)?;
        if with_text {
            let label = truncate_to_width(&entry.label, FONT_PX, max_text_w);
            area.draw(&Text::new(
                label,
                (x + GLYPH_W + GLYPH_TO_TEXT, y),
                label_style(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}

/// Table-like multi-row band; columns align across rows.
fn draw_flow_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &LegendSpec,
    start_x: i32,
    with_text: bool,
) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let labels = labels_of(legend);
    let flow = FlowLayout::new(&labels, start_x, w as i32);
    let col_x = flow.col_x(start_x);

    let mut y_top = PAD;
    for row in &flow.rows {
        let lines = flow.row_lines(row, &labels);
        let row_h = row_height(&lines);
        let y_center = y_top + row_h / 2;

        for (ci, &i) in row.iter().enumerate() {
            let x = col_x[ci];
            draw_glyph(area, x, y_center, &legend.entries[i])?;
            if !with_text {
                continue;
            }
            let block_h = lines[ci].len().max(1) as i32 * LINE_H;
            let top = y_center - block_h / 2;
            for (li, ln) in lines[ci].iter().enumerate() {
                let line_center_y = top + li as i32 * LINE_H + LINE_H / 2;
                area.draw(&Text::new(
                    ln.as_str(),
                    (x + GLYPH_W + GLYPH_TO_TEXT, line_center_y),
                    label_style(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        y_top += row_h + ROW_GAP;
    }
    Ok(())
}

/// Swatch, line sample, or nothing, left-aligned at `x` and centered on `y`.
fn draw_glyph<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: i32,
    y: i32,
    entry: &LegendEntry,
) -> Result<()> {
    let color = rgba(entry.color, 1.0);
    match entry.glyph {
        LegendGlyph::Blank => Ok(()),
        LegendGlyph::Swatch => area
            .draw(&Rectangle::new(
                [(x + 4, y - 6), (x + GLYPH_W - 4, y + 6)],
                color.filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e)),
        LegendGlyph::Line(dash) => {
            let style = color.stroke_width(2);
            let sample = [(x as f64, y as f64), ((x + GLYPH_W) as f64, y as f64)];
            let runs = match dash_pattern(dash, 1.5) {
                Some(pattern) => split_dashes(&sample, |p| p, &pattern),
                None => vec![sample.to_vec()],
            };
            for run in runs {
                let pts: Vec<(i32, i32)> = run
                    .iter()
                    .map(|(px, py)| (px.round() as i32, py.round() as i32))
                    .collect();
                area.draw(&PathElement::new(pts, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            Ok(())
        }
    }
}
