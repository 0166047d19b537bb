//! Adaptive visual-encoding decisions derived from the shape of aggregated data.
//!
//! Nothing here looks at pixels; every rule is a function of counts, label
//! lengths or value proportions, so the same data always lays out the same way.

use serde::Serialize;

use crate::aggregate::BarMode;
use crate::plan::LineDash;

/// Distance of ring category labels, in radii.
pub const LABEL_DISTANCE: f64 = 1.1;
/// Distance of ring percent labels, in radii.
pub const PCT_DISTANCE: f64 = 0.85;
/// Radius of the donut hole relative to the outer radius.
pub const DONUT_HOLE: f64 = 0.5;
/// Ring chart start angle (degrees, counter-clockwise from +x).
pub const RING_START_ANGLE: f64 = 90.0;

pub const RING_LEGEND_CAP: usize = 15;
pub const LEGEND_CAP: usize = 10;
/// Above this many line series styles collapse to solid lines without markers.
pub const LINE_STYLE_LIMIT: usize = 20;
/// Line value labels are drawn only up to this many points.
pub const LINE_VALUE_LIMIT: usize = 20;
/// Bar value labels are drawn only up to this many distinct x values.
pub const BAR_VALUE_LIMIT: usize = 15;
/// Placeholder legend entry standing in for hidden items.
pub const ELLIPSIS: &str = "...";

/// How the legend lists series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendMode {
    Hidden,
    /// Every entry (possibly truncated with a trailing `...`).
    Full,
    /// An evenly spaced subset.
    Sampled,
}

/// Decisions computed once per chart and applied to all of its elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDecision {
    pub show_labels: bool,
    pub show_percent: bool,
    pub label_distance: f64,
    pub legend_mode: LegendMode,
    pub bar_width: Option<f64>,
    /// X tick label rotation in degrees (0, 30 or 45).
    pub x_rotation: u32,
}

impl Default for LayoutDecision {
    fn default() -> Self {
        Self {
            show_labels: false,
            show_percent: false,
            label_distance: LABEL_DISTANCE,
            legend_mode: LegendMode::Hidden,
            bar_width: None,
            x_rotation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Ring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingLayout {
    /// Angular width of the thinnest wedge in degrees; `None` when the total is not positive.
    pub min_angle: Option<f64>,
    pub show_labels: bool,
    pub show_percent: bool,
    pub label_distance: f64,
    /// Side legend replaces the wedge labels.
    pub legend: bool,
    /// Total ≤ 0: wedges are drawn with equal angles.
    pub degenerate: bool,
}

/// Label/percent visibility from the thinnest wedge:
///
/// | min angle | labels | percent |
/// |-----------|--------|---------|
/// | < 5°      | no     | no      |
/// | 5°–10°    | no     | yes     |
/// | ≥ 10°     | yes    | yes     |
pub fn ring_layout(values: &[f64]) -> RingLayout {
    let total: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    if values.is_empty() || !total.is_finite() || total <= 0.0 {
        log::warn!("ring total {total} is not positive; falling back to legend-only layout");
        return RingLayout {
            min_angle: None,
            show_labels: false,
            show_percent: false,
            label_distance: LABEL_DISTANCE,
            legend: true,
            degenerate: true,
        };
    }

    let min_angle = min * 360.0 / total;
    let (show_labels, show_percent) = if min_angle < 5.0 {
        (false, false)
    } else if min_angle < 10.0 {
        (false, true)
    } else {
        (true, true)
    };
    log::debug!("ring min_angle={min_angle:.3} labels={show_labels} percent={show_percent}");

    RingLayout {
        min_angle: Some(min_angle),
        show_labels,
        show_percent,
        label_distance: LABEL_DISTANCE,
        legend: min_angle < 10.0 && !show_labels,
        degenerate: false,
    }
}

/// Ring legend entries: at most 15, then a literal `...`.
pub fn ring_legend_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = labels.iter().take(RING_LEGEND_CAP).cloned().collect();
    if labels.len() > RING_LEGEND_CAP {
        out.push(ELLIPSIS.to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

/// Total width at one x position for `series` bars drawn there.
pub fn band_width(series: usize) -> f64 {
    if series <= 2 {
        0.6
    } else if series <= 4 {
        0.7
    } else {
        0.8
    }
}

/// Width of an ungrouped, unstacked bar from the number of x categories.
pub fn simple_bar_width(x_count: usize) -> f64 {
    if x_count <= 5 {
        0.6
    } else if x_count <= 10 {
        0.7
    } else {
        0.8
    }
}

/// Horizontal geometry shared by every x position of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGeometry {
    pub band_width: f64,
    /// Width of a single bar (one group's share of the band).
    pub bar_width: f64,
    /// Offset of each group's bar from the x tick; one entry when ungrouped.
    pub offsets: Vec<f64>,
}

/// Offsets centering `n` bars of width `w` on the tick: `(k - n/2 + 0.5) * w`.
pub fn group_offsets(n: usize, w: f64) -> Vec<f64> {
    (0..n)
        .map(|k| (k as f64 - n as f64 / 2.0 + 0.5) * w)
        .collect()
}

pub fn bar_geometry(mode: BarMode, x_count: usize, groups: usize, stacks: usize) -> BarGeometry {
    let (band, n_groups) = match mode {
        BarMode::Simple => (simple_bar_width(x_count), 1),
        BarMode::Stacked => (band_width(stacks), 1),
        BarMode::Grouped => (band_width(groups), groups.max(1)),
        BarMode::GroupedStacked => (band_width(groups * stacks), groups.max(1)),
    };
    let bar = band / n_groups as f64;
    BarGeometry {
        band_width: band,
        bar_width: bar,
        offsets: group_offsets(n_groups, bar),
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStylePlan {
    pub dashes: Vec<LineDash>,
    pub markers: bool,
    pub line_width: f64,
}

const DASH_CYCLE: [LineDash; 4] = [
    LineDash::Solid,
    LineDash::Dash,
    LineDash::DashDot,
    LineDash::Dot,
];

/// Up to 20 series cycle solid/dashed/dash-dot/dotted with markers; beyond
/// that every line is a thin solid line without markers.
pub fn line_styles(n: usize) -> LineStylePlan {
    if n > LINE_STYLE_LIMIT {
        LineStylePlan {
            dashes: vec![LineDash::Solid; n],
            markers: false,
            line_width: 1.5,
        }
    } else {
        LineStylePlan {
            dashes: (0..n).map(|i| DASH_CYCLE[i % DASH_CYCLE.len()]).collect(),
            markers: true,
            line_width: 2.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Legends & axes
// ---------------------------------------------------------------------------

/// Series indices shown in a line legend: all of them up to 10, otherwise
/// 10 evenly spaced indices from 0 to `n - 1` inclusive (truncated toward zero).
pub fn sample_legend_indices(n: usize) -> Vec<usize> {
    if n <= LEGEND_CAP {
        return (0..n).collect();
    }
    let last = n - 1;
    let step = last as f64 / (LEGEND_CAP - 1) as f64;
    (0..LEGEND_CAP)
        .map(|i| {
            if i == LEGEND_CAP - 1 {
                last
            } else {
                (i as f64 * step) as usize
            }
        })
        .collect()
}

/// Bar legends keep the first 10 entries; the flag tells whether a `...`
/// placeholder must follow.
pub fn truncate_legend<T: Clone>(items: &[T]) -> (Vec<T>, bool) {
    let kept = items.iter().take(LEGEND_CAP).cloned().collect();
    (kept, items.len() > LEGEND_CAP)
}

/// Tick label rotation from the longest label: ≤ 8 chars → 0°, 9–15 → 30°, longer → 45°.
pub fn x_label_rotation<S: AsRef<str>>(labels: &[S]) -> u32 {
    let longest = labels
        .iter()
        .map(|s| s.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    if longest <= 8 {
        0
    } else if longest <= 15 {
        30
    } else {
        45
    }
}
