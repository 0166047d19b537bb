//! Chart composition: aggregation + layout + colors + labels → [`DrawPlan`].
//!
//! Every chart kind runs through the same [`compose`] pipeline; the
//! kind-specific part is a [`ChartStrategy`] that turns input into a
//! [`ChartBody`]. The convenience entry points [`donut`], [`line`] and
//! [`bar`] build the matching strategy with default options.

use crate::aggregate::{self, BarMode};
use crate::error::Result;
use crate::format::{Precision, format_percent, format_value};
use crate::layout::{
    self, BAR_VALUE_LIMIT, DONUT_HOLE, LINE_VALUE_LIMIT, LayoutDecision, LegendMode, PCT_DISTANCE,
    RING_START_ANGLE,
};
use crate::models::ChartInput;
use crate::palette::{Palette, Rgb};
use crate::plan::{
    AxesSpec, ChartKind, DrawCommand, DrawPlan, HAlign, LegendEntry, LegendGlyph, LegendSpec,
    LineDash, MarkerShape, TextStyle, VAlign,
};

const RING_LABEL_PT: f64 = 11.0;
const PERCENT_PT: f64 = 10.0;
const VALUE_PT: f64 = 8.0;
const MARKER_SIZE: f64 = 4.0;
const BAR_ALPHA: f64 = 0.8;
const DEFAULT_Y_TITLE: &str = "Value";

/// Options shared by every chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            palette: Palette::default(),
        }
    }
}

/// The kind-specific part of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBody {
    pub kind: ChartKind,
    pub layout: LayoutDecision,
    pub axes: Option<AxesSpec>,
    pub commands: Vec<DrawCommand>,
    pub legend: Option<LegendSpec>,
}

/// Aggregation and layout for one chart kind.
pub trait ChartStrategy {
    fn name(&self) -> &'static str;

    fn body(&self, input: &ChartInput, palette: &Palette) -> Result<ChartBody>;
}

/// Run a strategy and wrap its body into a complete plan.
pub fn compose<S: ChartStrategy + ?Sized>(
    strategy: &S,
    input: &ChartInput,
    title: &str,
    opts: &ComposeOptions,
) -> Result<DrawPlan> {
    let body = strategy.body(input, &opts.palette)?;
    log::debug!(
        "{} chart '{}': {} commands, legend={:?}",
        strategy.name(),
        title,
        body.commands.len(),
        body.layout.legend_mode
    );
    Ok(DrawPlan {
        kind: body.kind,
        title: title.to_string(),
        width: opts.width,
        height: opts.height,
        layout: body.layout,
        axes: body.axes,
        commands: body.commands,
        legend: body.legend,
    })
}

/// `n` colors from an explicit list when given, else from the palette.
fn series_colors(custom: Option<&[Rgb]>, palette: &Palette, n: usize) -> Vec<Rgb> {
    match custom {
        Some(c) if !c.is_empty() => Palette::new(c.to_vec()).colors_for(n),
        _ => palette.colors_for(n),
    }
}

/// Data range padded by 5% on each side; flat ranges widen to ±1.
fn padded(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

// ---------------------------------------------------------------------------
// Ring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonutChart {
    pub label_col: Option<String>,
    pub value_col: Option<String>,
    pub colors: Option<Vec<Rgb>>,
}

impl ChartStrategy for DonutChart {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn body(&self, input: &ChartInput, palette: &Palette) -> Result<ChartBody> {
        let data = aggregate::ring_slices(
            input,
            self.label_col.as_deref(),
            self.value_col.as_deref(),
        )?;
        let ring = layout::ring_layout(&data.values);
        let colors = series_colors(self.colors.as_deref(), palette, data.len());

        // Negative slices get no area; a non-positive total gets equal wedges.
        let positive: Vec<f64> = data.values.iter().map(|v| v.max(0.0)).collect();
        let positive_total: f64 = positive.iter().sum();
        let n = data.len() as f64;
        let fractions: Vec<f64> = if ring.degenerate || positive_total <= 0.0 {
            vec![1.0 / n; data.len()]
        } else {
            positive.iter().map(|v| v / positive_total).collect()
        };

        let mut commands = Vec::with_capacity(data.len() * 3 + 1);
        let mut labels = Vec::new();
        let mut angle = RING_START_ANGLE;
        for (i, frac) in fractions.iter().enumerate() {
            let sweep = frac * 360.0;
            commands.push(DrawCommand::Wedge {
                center: (0.0, 0.0),
                radius: 1.0,
                start_deg: angle,
                sweep_deg: sweep,
                color: colors[i],
            });

            let mid = (angle + sweep / 2.0).to_radians();
            let (cos, sin) = (mid.cos(), mid.sin());
            if ring.show_labels {
                let h = if cos >= 0.0 { HAlign::Left } else { HAlign::Right };
                labels.push(DrawCommand::Text {
                    pos: (cos * ring.label_distance, sin * ring.label_distance),
                    text: data.labels[i].clone(),
                    style: TextStyle::new(RING_LABEL_PT, Rgb::BLACK).align(h, VAlign::Center),
                });
            }
            if ring.show_percent {
                labels.push(DrawCommand::Text {
                    pos: (cos * PCT_DISTANCE, sin * PCT_DISTANCE),
                    text: format_percent(*frac),
                    style: TextStyle::new(PERCENT_PT, Rgb::WHITE).bold(),
                });
            }
            angle += sweep;
        }
        commands.push(DrawCommand::Circle {
            center: (0.0, 0.0),
            radius: DONUT_HOLE,
            color: Rgb::WHITE,
        });
        commands.extend(labels);

        let legend = ring.legend.then(|| {
            let shown = layout::ring_legend_labels(&data.labels);
            let entries = shown
                .into_iter()
                .enumerate()
                .map(|(i, label)| {
                    if i >= layout::RING_LEGEND_CAP {
                        LegendEntry::ellipsis()
                    } else {
                        LegendEntry::new(label, colors[i], LegendGlyph::Swatch)
                    }
                })
                .collect();
            LegendSpec {
                entries,
                columns: 1,
                frame: true,
            }
        });

        Ok(ChartBody {
            kind: ChartKind::Ring,
            layout: LayoutDecision {
                show_labels: ring.show_labels,
                show_percent: ring.show_percent,
                label_distance: ring.label_distance,
                legend_mode: if ring.legend {
                    LegendMode::Full
                } else {
                    LegendMode::Hidden
                },
                bar_width: None,
                x_rotation: 0,
            },
            axes: None,
            commands,
            legend,
        })
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineChart {
    pub x_col: Option<String>,
    pub y_cols: Option<Vec<String>>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub colors: Option<Vec<Rgb>>,
    /// Replaces the count-based dash cycle; cycled when shorter than the
    /// series list.
    pub dashes: Option<Vec<LineDash>>,
    pub show_values: bool,
}

/// Splits a series into runs of consecutive present values.
fn present_runs(xs: &[f64], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, y) in xs.iter().zip(values) {
        match y {
            Some(y) => current.push((*x, *y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

impl ChartStrategy for LineChart {
    fn name(&self) -> &'static str {
        "line"
    }

    fn body(&self, input: &ChartInput, palette: &Palette) -> Result<ChartBody> {
        let data = aggregate::line_series(input, self.x_col.as_deref(), self.y_cols.as_deref())?;
        let n = data.series.len();
        let mut styles = layout::line_styles(n);
        if let Some(dashes) = self.dashes.as_deref()
            && !dashes.is_empty()
        {
            styles.dashes = (0..n).map(|i| dashes[i % dashes.len()]).collect();
        }
        let colors = series_colors(self.colors.as_deref(), palette, n);
        let x_labels = data.x_labels();

        let numeric_x = data.numeric_x();
        let xs: Vec<f64> = match &numeric_x {
            Some(v) => v.clone(),
            None => (0..data.len()).map(|i| i as f64).collect(),
        };
        let label_values = self.show_values && data.len() <= LINE_VALUE_LIMIT;

        let mut commands = Vec::new();
        let mut value_labels = Vec::new();
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (i, series) in data.series.iter().enumerate() {
            let runs = present_runs(&xs, &series.values);
            for (x, y) in runs.iter().flatten() {
                y_min = y_min.min(*y);
                y_max = y_max.max(*y);
                if label_values && let Some(text) = format_value(*y, Precision::Line) {
                    value_labels.push(DrawCommand::Text {
                        pos: (*x, *y),
                        text,
                        style: TextStyle::new(VALUE_PT, colors[i])
                            .align(HAlign::Center, VAlign::Bottom)
                            .alpha(0.8),
                    });
                }
            }
            for points in runs {
                commands.push(DrawCommand::Polyline {
                    points,
                    color: colors[i],
                    width: styles.line_width,
                    dash: styles.dashes[i],
                    marker: styles.markers.then_some(MarkerShape::Circle),
                    marker_size: if styles.markers { MARKER_SIZE } else { 0.0 },
                });
            }
        }
        commands.extend(value_labels);

        let x_rotation = layout::x_label_rotation(&x_labels);
        let (x_range, x_ticks) = match &numeric_x {
            Some(v) => {
                let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (padded(lo, hi), Vec::new())
            }
            None => (
                padded(0.0, (data.len().max(1) - 1) as f64),
                xs.iter().copied().zip(x_labels.iter().cloned()).collect(),
            ),
        };

        let sampled = layout::sample_legend_indices(n);
        let legend_mode = if n > layout::LEGEND_CAP {
            LegendMode::Sampled
        } else {
            LegendMode::Full
        };
        let legend = LegendSpec {
            entries: sampled
                .iter()
                .map(|&i| {
                    LegendEntry::new(
                        data.series[i].name.clone(),
                        colors[i],
                        LegendGlyph::Line(styles.dashes[i]),
                    )
                })
                .collect(),
            columns: if legend_mode == LegendMode::Sampled { 2 } else { 1 },
            frame: false,
        };

        Ok(ChartBody {
            kind: ChartKind::Line,
            layout: LayoutDecision {
                show_labels: label_values,
                show_percent: false,
                label_distance: layout::LABEL_DISTANCE,
                legend_mode,
                bar_width: None,
                x_rotation,
            },
            axes: Some(AxesSpec {
                x_title: self.x_title.clone().unwrap_or_else(|| data.x_col.clone()),
                y_title: self
                    .y_title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_Y_TITLE.to_string()),
                x_range,
                y_range: padded(y_min, y_max),
                x_ticks,
                x_rotation,
            }),
            commands,
            legend: Some(legend),
        })
    }
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarChart {
    pub x_col: Option<String>,
    pub y_col: Option<String>,
    pub group_col: Option<String>,
    pub stack_col: Option<String>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub colors: Option<Vec<Rgb>>,
    pub show_values: bool,
}

impl ChartStrategy for BarChart {
    fn name(&self) -> &'static str {
        "bar"
    }

    fn body(&self, input: &ChartInput, palette: &Palette) -> Result<ChartBody> {
        let grid = aggregate::bar_grid(
            input,
            self.x_col.as_deref(),
            self.y_col.as_deref(),
            self.group_col.as_deref(),
            self.stack_col.as_deref(),
        )?;
        let nx = grid.x_values.len();
        let (g_slots, s_slots) = (grid.group_slots(), grid.stack_slots());
        let geometry = layout::bar_geometry(grid.mode, nx, grid.groups.len(), grid.stacks.len());

        let n_colors = match grid.mode {
            BarMode::GroupedStacked => g_slots * s_slots,
            _ => g_slots.max(s_slots),
        };
        let colors = series_colors(self.colors.as_deref(), palette, n_colors);
        let label_values = self.show_values && nx <= BAR_VALUE_LIMIT;
        let half = geometry.bar_width / 2.0;

        let mut commands = Vec::with_capacity(nx * grid.series_count());
        let mut value_labels = Vec::new();
        let mut legend_items: Vec<(String, Rgb)> = Vec::new();
        let (mut y_lo, mut y_hi) = (0.0f64, 0.0f64);

        for g in 0..g_slots {
            let offset = geometry.offsets[g];
            let mut bottom = vec![0.0; nx];
            for s in 0..s_slots {
                let idx = g * s_slots + s;
                let color = colors[idx % colors.len()];
                for (x, v) in grid.row(g, s).iter().enumerate() {
                    let center = x as f64 + offset;
                    let (y0, y1) = (bottom[x], bottom[x] + v);
                    commands.push(DrawCommand::Rect {
                        x0: center - half,
                        y0,
                        x1: center + half,
                        y1,
                        color,
                        alpha: BAR_ALPHA,
                    });
                    if label_values && let Some(text) = format_value(*v, Precision::Bar) {
                        value_labels.push(DrawCommand::Text {
                            pos: (center, y0 + v / 2.0),
                            text,
                            style: TextStyle::new(VALUE_PT, Rgb::BLACK),
                        });
                    }
                    y_lo = y_lo.min(y0.min(y1));
                    y_hi = y_hi.max(y0.max(y1));
                    bottom[x] = y1;
                }
                if let Some(label) = series_label(&grid, g, s) {
                    legend_items.push((label, color));
                }
            }
        }
        commands.extend(value_labels);

        let legend = (!legend_items.is_empty()).then(|| {
            let (kept, overflow) = layout::truncate_legend(&legend_items);
            let mut entries: Vec<LegendEntry> = kept
                .into_iter()
                .map(|(label, color)| LegendEntry::new(label, color, LegendGlyph::Swatch))
                .collect();
            if overflow {
                entries.push(LegendEntry::ellipsis());
            }
            LegendSpec {
                entries,
                columns: 1,
                frame: false,
            }
        });

        let x_rotation = layout::x_label_rotation(&grid.x_values);
        let y_range = if y_hi > y_lo {
            let pad = (y_hi - y_lo) * 0.05;
            (if y_lo < 0.0 { y_lo - pad } else { 0.0 }, y_hi + pad)
        } else {
            (0.0, 1.0)
        };

        Ok(ChartBody {
            kind: ChartKind::Bar(grid.mode),
            layout: LayoutDecision {
                show_labels: label_values,
                show_percent: false,
                label_distance: layout::LABEL_DISTANCE,
                legend_mode: if legend.is_some() {
                    LegendMode::Full
                } else {
                    LegendMode::Hidden
                },
                bar_width: Some(geometry.bar_width),
                x_rotation,
            },
            axes: Some(AxesSpec {
                x_title: self.x_title.clone().unwrap_or_else(|| grid.x_col.clone()),
                y_title: self
                    .y_title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_Y_TITLE.to_string()),
                x_range: (-0.5, nx as f64 - 0.5),
                y_range,
                x_ticks: grid
                    .x_values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64, v.clone()))
                    .collect(),
                x_rotation,
            }),
            commands,
            legend,
        })
    }
}

/// Legend text of one (group, stack) series; simple bars have none.
fn series_label(grid: &aggregate::BarGrid, g: usize, s: usize) -> Option<String> {
    match grid.mode {
        BarMode::Simple => None,
        BarMode::Grouped => grid.groups.get(g).cloned(),
        BarMode::Stacked => grid.stacks.get(s).cloned(),
        BarMode::GroupedStacked => Some(format!("{}-{}", grid.groups[g], grid.stacks[s])),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Donut chart from a mapping, an ordered series, or a table (`label_col` +
/// `value_col` required for tables).
pub fn donut(
    data: &ChartInput,
    label_col: Option<&str>,
    value_col: Option<&str>,
    title: &str,
    colors: Option<&[Rgb]>,
) -> Result<DrawPlan> {
    let chart = DonutChart {
        label_col: label_col.map(str::to_string),
        value_col: value_col.map(str::to_string),
        colors: colors.map(<[Rgb]>::to_vec),
    };
    compose(&chart, data, title, &ComposeOptions::default())
}

/// Multi-series line chart; `x_col` defaults to the first column and
/// `y_cols` to all remaining ones.
pub fn line(
    data: &ChartInput,
    x_col: Option<&str>,
    y_cols: Option<&[String]>,
    title: &str,
    show_values: bool,
) -> Result<DrawPlan> {
    let chart = LineChart {
        x_col: x_col.map(str::to_string),
        y_cols: y_cols.map(<[String]>::to_vec),
        show_values,
        ..LineChart::default()
    };
    compose(&chart, data, title, &ComposeOptions::default())
}

/// Bar chart; grouping and stacking follow from which of `group_col` and
/// `stack_col` are given.
pub fn bar(
    data: &ChartInput,
    x_col: Option<&str>,
    y_col: Option<&str>,
    group_col: Option<&str>,
    stack_col: Option<&str>,
    title: &str,
    show_values: bool,
) -> Result<DrawPlan> {
    let chart = BarChart {
        x_col: x_col.map(str::to_string),
        y_col: y_col.map(str::to_string),
        group_col: group_col.map(str::to_string),
        stack_col: stack_col.map(str::to_string),
        show_values,
        ..BarChart::default()
    };
    compose(&chart, data, title, &ComposeOptions::default())
}
