//! Image export: encoded bytes, files in an output directory, and base64 payloads.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{OutputFormat, RenderOptions};
use crate::plan::DrawPlan;
use crate::viz;

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

/// Encoded image bytes in `opts.format`.
pub fn encode(plan: &DrawPlan, opts: &RenderOptions) -> Result<Vec<u8>> {
    match opts.format {
        OutputFormat::Png => viz::render_png_bytes(plan, opts),
        OutputFormat::Svg => viz::render_svg_string(plan, opts).map(String::into_bytes),
    }
}

/// Base64 (standard alphabet, padded) of the encoded image.
pub fn to_base64(plan: &DrawPlan, opts: &RenderOptions) -> Result<String> {
    Ok(STANDARD.encode(encode(plan, opts)?))
}

/// `data:` URI suitable for embedding in HTML or JSON responses.
pub fn to_data_uri(plan: &DrawPlan, opts: &RenderOptions) -> Result<String> {
    Ok(format!(
        "data:{};base64,{}",
        opts.format.mime(),
        to_base64(plan, opts)?
    ))
}

/// Write `<dir>/<stem>.<ext>` in `opts.format`, creating `dir` if needed. Returns the written path.
pub fn save_figure<P: AsRef<Path>>(
    plan: &DrawPlan,
    dir: P,
    stem: &str,
    opts: &RenderOptions,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let ext = opts.format.extension();
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{stem}.{ext}"));
    let bytes = encode(plan, opts)?;
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("saved {ext} chart to {}", path.display());
    Ok(path)
}
