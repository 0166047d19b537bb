//! Utility functions for rendering: locale mapping, tick selection and formatting, geometry.

use num_format::{Locale, ToFormattedString};

use super::text::estimate_text_width_px;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().replace('-', "_").as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Tick label for an axis value: grouped integers when whole, otherwise
/// up to two decimals with the locale's separators.
pub fn format_tick(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 || (v - v.round()).abs() < 1e-9 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    let rounded = v.round();
    if prec == 0 && rounded.abs() < i64::MAX as f64 {
        let n = rounded as i64;
        let s = n.unsigned_abs().to_formatted_string(locale);
        return if n < 0 { format!("-{s}") } else { s };
    }
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' {
        s
    } else {
        s.replace('.', &dec_sep.to_string())
    }
}

/// "Nice" tick positions (1, 2, 2.5, 5 × 10^k steps) covering `lo..=hi`.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo || target == 0 {
        return Vec::new();
    }
    let raw = (hi - lo) / target as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * mag);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            // Snap -0.0 and float noise.
            if v.abs() < step * 1e-9 { 0.0 } else { v }
        })
        .collect()
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
pub fn compute_left_label_area_px(ticks: &[String], font_px: u32) -> u32 {
    let max_px = ticks
        .iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0);
    // Tick marks, axis title column, and a little breathing room.
    max_px.saturating_add(18 + font_px + 8).clamp(48, 180)
}

/// Polygon approximation of a circular sector (center first), angles in degrees CCW.
pub fn wedge_points(
    center: (f64, f64),
    radius: f64,
    start_deg: f64,
    sweep_deg: f64,
) -> Vec<(f64, f64)> {
    let steps = ((sweep_deg.abs() / 2.0).ceil() as usize).max(1);
    let mut pts = Vec::with_capacity(steps + 2);
    pts.push(center);
    for i in 0..=steps {
        let a = (start_deg + sweep_deg * i as f64 / steps as f64).to_radians();
        pts.push((center.0 + radius * a.cos(), center.1 + radius * a.sin()));
    }
    pts
}

/// Polygon approximation of a full circle.
pub fn circle_points(center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    (0..180)
        .map(|i| {
            let a = (i as f64 * 2.0).to_radians();
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect()
}

/// Point sizes in a plan are typographic points at 100 dpi.
pub fn pt_to_px(size: f64) -> u32 {
    (size * 100.0 / 72.0).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_nice_and_inside_range() {
        let t = nice_ticks(0.0, 105.0, 6);
        assert_eq!(t.first(), Some(&0.0));
        assert!(t.iter().all(|v| *v >= 0.0 && *v <= 105.0));
        assert_eq!(t[1] - t[0], 20.0);
        assert!(nice_ticks(1.0, 1.0, 6).is_empty());
    }

    #[test]
    fn tick_format_follows_locale() {
        let (en_loc, en_sep) = map_locale("en");
        let (de_loc, de_sep) = map_locale("de");
        assert_eq!(format_tick(30000.0, en_loc, en_sep), "30,000");
        assert_eq!(format_tick(30000.0, de_loc, de_sep), "30.000");
        assert_eq!(format_tick(-1500.0, en_loc, en_sep), "-1,500");
        assert_eq!(format_tick(2.5, de_loc, de_sep), "2,50");
    }

    #[test]
    fn wedge_polygon_spans_the_sweep() {
        let pts = wedge_points((0.0, 0.0), 1.0, 90.0, 90.0);
        assert_eq!(pts[0], (0.0, 0.0));
        let first = pts[1];
        let last = pts[pts.len() - 1];
        assert!(first.0.abs() < 1e-9 && (first.1 - 1.0).abs() < 1e-9);
        assert!((last.0 + 1.0).abs() < 1e-9 && last.1.abs() < 1e-9);
    }

    #[test]
    fn left_label_area_is_clamped() {
        assert_eq!(compute_left_label_area_px(&[], 12), 48);
        let wide = vec!["1,000,000,000,000,000,000".to_string()];
        assert_eq!(compute_left_label_area_px(&wide, 12), 180);
    }
}
