//! Compact on-chart value labels (`1.2M`, `3.4K`, `56`).

/// Precision used below one thousand; line and bar labels differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// One decimal (`12.5`).
    Line,
    /// Whole number (`13`).
    Bar,
}

/// Format a value for display next to a point or bar.
///
/// Returns `None` for values that must not be labeled at all: zero,
/// negative, NaN or infinite.
pub fn format_value(v: f64, precision: Precision) -> Option<String> {
    if !v.is_finite() || v <= 0.0 {
        return None;
    }
    let s = if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        match precision {
            Precision::Line => format!("{v:.1}"),
            Precision::Bar => format!("{v:.0}"),
        }
    };
    Some(s)
}

/// Percent text drawn inside ring wedges.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
