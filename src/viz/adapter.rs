//! Adapter helpers between plan primitives and the plotters crate: colors,
//! stroke styles, marker shapes and dash patterns.

use anyhow::{Result, anyhow};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::palette::Rgb;
use crate::plan::{LineDash, MarkerShape};

/// Data-space plotting plane used for both axis charts and rings.
pub type Plane = Cartesian2d<RangedCoordf64, RangedCoordf64>;

pub fn rgb_color(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

pub fn rgba(c: Rgb, alpha: f64) -> RGBAColor {
    rgb_color(c).mix(alpha.clamp(0.0, 1.0))
}

/// Build a ShapeStyle for line strokes.
pub fn line_style(c: Rgb, width: f64) -> ShapeStyle {
    rgb_color(c).stroke_width(width.round().max(1.0) as u32)
}

/// On/off run lengths in pixels for a dash style, scaled by the line width.
/// `None` means a continuous stroke.
pub fn dash_pattern(dash: LineDash, width: f64) -> Option<Vec<f64>> {
    let w = width.max(1.0);
    let base: &[f64] = match dash {
        LineDash::Solid => return None,
        LineDash::Dash => &[3.7, 1.6],
        LineDash::DashDot => &[6.4, 1.6, 1.0, 1.6],
        LineDash::Dot => &[1.0, 1.65],
    };
    Some(base.iter().map(|v| v * w).collect())
}

/// Split a polyline into the "on" runs of a dash pattern.
///
/// Run lengths are measured in pixel space via `to_px`; the returned runs stay
/// in the input coordinate space. The pattern carries over across vertices.
pub fn split_dashes<F>(points: &[(f64, f64)], to_px: F, pattern: &[f64]) -> Vec<Vec<(f64, f64)>>
where
    F: Fn((f64, f64)) -> (f64, f64),
{
    if pattern.is_empty() || pattern.iter().any(|v| *v <= 0.0) {
        return vec![points.to_vec()];
    }
    let mut runs = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    let mut idx = 0usize;
    let mut left = pattern[0];

    for seg in points.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let (pa, pb) = (to_px(a), to_px(b));
        let len = ((pb.0 - pa.0).powi(2) + (pb.1 - pa.1).powi(2)).sqrt();
        if len <= f64::EPSILON {
            continue;
        }
        let lerp = |t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
        let mut done = 0.0;
        while done < len {
            let on = idx % 2 == 0;
            let step = left.min(len - done);
            if on {
                if cur.is_empty() {
                    cur.push(lerp(done / len));
                }
                cur.push(lerp((done + step) / len));
            }
            done += step;
            left -= step;
            if left <= 1e-9 {
                if on && cur.len() >= 2 {
                    runs.push(std::mem::take(&mut cur));
                }
                idx = (idx + 1) % pattern.len();
                left = pattern[idx];
            }
        }
    }
    if cur.len() >= 2 {
        runs.push(cur);
    }
    runs
}

/// Draw one marker centered on a data point; `size` is the radius in pixels.
pub fn draw_marker<DB: DrawingBackend>(
    area: &DrawingArea<DB, Plane>,
    at: (f64, f64),
    size: i32,
    color: RGBAColor,
    shape: MarkerShape,
) -> Result<()> {
    let st = color.filled();
    let s = size.max(1);
    match shape {
        MarkerShape::Circle => area.draw(&(EmptyElement::at(at) + Circle::new((0, 0), s, st))),
        MarkerShape::Square => {
            area.draw(&(EmptyElement::at(at) + Rectangle::new([(-s, -s), (s, s)], st)))
        }
        MarkerShape::Triangle => area.draw(
            &(EmptyElement::at(at) + Polygon::new(vec![(0, -s), (-s, s), (s, s)], st)),
        ),
        MarkerShape::Diamond => area.draw(
            &(EmptyElement::at(at) + Polygon::new(vec![(0, -s), (-s, 0), (0, s), (s, 0)], st)),
        ),
    }
    .map_err(|e| anyhow!("{:?}", e))
}
