//! Render configuration, optionally loaded from a JSON file.
//!
//! ```json
//! { "render": { "width": 800, "height": 500, "type": "svg", "legend": "bottom" },
//!   "palette": ["#5470c6", "#91cc75"] }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    /// Format named by a `.svg` or `.png` extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|s| s.to_str())?;
        if ext.eq_ignore_ascii_case("svg") {
            Some(OutputFormat::Svg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(OutputFormat::Png)
        } else {
            None
        }
    }
}

/// Legend placement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPlacement {
    /// Overlay legend inside the plotting area (may overlap data).
    Inside,
    /// Separate, non-overlapping legend panel on the right side.
    Right,
    /// Separate legend band at the top.
    Top,
    /// Separate legend band at the bottom.
    Bottom,
}

/// Options applied when a plan is rasterized or exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Canvas width override; the plan's width when absent.
    #[serde(default)]
    pub width: Option<u32>,
    /// Canvas height override; the plan's height when absent.
    #[serde(default)]
    pub height: Option<u32>,
    /// Format of in-memory exports and of files without a `.png`/`.svg` extension.
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// `None` lets each chart kind pick (right for rings, inside otherwise).
    #[serde(default)]
    pub legend: Option<LegendPlacement>,
    /// Locale tag for axis tick numbers (`en`, `de`, `fr`, ...).
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            format: OutputFormat::Png,
            legend: None,
            locale: default_locale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub render: RenderOptions,
    /// Series colors as `#RRGGBB`; the built-in palette when absent.
    #[serde(default)]
    pub palette: Option<Vec<String>>,
    /// TrueType font used for all text; system fonts are searched when absent.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl ChartConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("invalid chart config JSON")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn palette(&self) -> Result<Palette> {
        match &self.palette {
            Some(hex) => Ok(Palette::from_hex(hex)?),
            None => Ok(Palette::default()),
        }
    }
}
