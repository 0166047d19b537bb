//! Draw plans: the backend-agnostic output of chart composition.
//!
//! A plan is a list of primitive drawing commands in data coordinates plus
//! axis and legend descriptions. The rendering backend executes it blindly.

use serde::Serialize;

use crate::aggregate::BarMode;
pub use crate::layout::{LayoutDecision, LegendMode};
use crate::palette::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Ring,
    Line,
    Bar(BarMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    Solid,
    Dash,
    DashDot,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f64,
    pub color: Rgb,
    pub bold: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub alpha: f64,
}

impl TextStyle {
    pub fn new(size: f64, color: Rgb) -> Self {
        Self {
            size,
            color,
            bold: false,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            alpha: 1.0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One drawing primitive. Coordinates are in data units: ring charts use a
/// unit square centered on the origin, axis charts use the axis ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Filled circular sector; angles in degrees, counter-clockwise.
    Wedge {
        center: (f64, f64),
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
        color: Rgb,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Rgb,
    },
    /// Filled rectangle from `(x0, y0)` (bottom-left) to `(x1, y1)` (top-right).
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Rgb,
        alpha: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        color: Rgb,
        width: f64,
        dash: LineDash,
        marker: Option<MarkerShape>,
        marker_size: f64,
    },
    Text {
        pos: (f64, f64),
        text: String,
        style: TextStyle,
    },
}

/// Cartesian axes for line and bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesSpec {
    pub x_title: String,
    pub y_title: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Explicit x ticks (categorical axes); empty means numeric ticks.
    pub x_ticks: Vec<(f64, String)>,
    pub x_rotation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendGlyph {
    /// Filled square (wedges, bars).
    Swatch,
    /// Short line sample in the given dash.
    Line(LineDash),
    /// No glyph (the `...` placeholder).
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub glyph: LegendGlyph,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Rgb, glyph: LegendGlyph) -> Self {
        Self {
            label: label.into(),
            color,
            glyph,
        }
    }

    pub fn ellipsis() -> Self {
        Self::new(crate::layout::ELLIPSIS, Rgb::WHITE, LegendGlyph::Blank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub entries: Vec<LegendEntry>,
    pub columns: usize,
    pub frame: bool,
}

/// Fully specified chart, ready for a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawPlan {
    pub kind: ChartKind,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub layout: LayoutDecision,
    pub axes: Option<AxesSpec>,
    pub commands: Vec<DrawCommand>,
    pub legend: Option<LegendSpec>,
}

impl DrawPlan {
    /// Commands of one primitive type, e.g. `plan.count(|c| matches!(c, DrawCommand::Rect { .. }))`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Text of every `Text` command, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
