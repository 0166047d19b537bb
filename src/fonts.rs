//! Font provisioning for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so one TrueType file is located and
//! registered as "sans-serif" once per process, before any chart is rendered.
//! Composition never depends on fonts; without one, charts render without text.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::FontStyle;

/// Environment variable pointing at a `.ttf` file to use instead of the search list.
pub const FONT_ENV: &str = "CHARTPLAN_FONT";

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Candidate font files for the current operating system, most preferred first.
pub fn candidate_paths() -> Vec<PathBuf> {
    let list: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Windows\Fonts\msyh.ttf",
            r"C:\Windows\Fonts\simhei.ttf",
            r"C:\Windows\Fonts\arial.ttf",
            r"C:\Windows\Fonts\segoeui.ttf",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Library/Fonts/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        ]
    };
    list.iter().map(PathBuf::from).collect()
}

fn register(path: &Path) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    // plotters keeps a `'static` reference; the font lives for the whole process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    let normal = plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).is_ok();
    if normal {
        if plotters::style::register_font("sans-serif", FontStyle::Bold, bytes).is_err() {
            log::debug!("bold face not registered from {}", path.display());
        }
        log::debug!("registered font {}", path.display());
    }
    normal
}

/// Register a font once per process. `explicit` (or `$CHARTPLAN_FONT`) wins
/// over the OS search list; only the first call has any effect.
///
/// Returns whether text can be drawn.
pub fn provision(explicit: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(p) = explicit {
            candidates.push(p.to_path_buf());
        }
        if let Some(p) = env::var_os(FONT_ENV) {
            candidates.push(PathBuf::from(p));
        }
        candidates.extend(candidate_paths());

        let found = candidates.iter().any(|p| p.is_file() && register(p));
        if !found {
            log::warn!("no usable font found; charts will be rendered without text");
        }
        found
    })
}
