//! chartplan
//!
//! A Rust library for turning tabular data into donut, line and bar charts whose
//! visual encoding adapts to the shape of the data. Pairs with the `chartplan` CLI.
//!
//! ### Features
//! - Aggregate mappings, ordered series or tables into dense plot-ready grids
//! - Pick label, percent, legend, bar width and line style settings from data cardinality
//! - Compose a backend-agnostic [`DrawPlan`] (serializable to JSON)
//! - Render plans to SVG/PNG with plotters, or export them as base64 payloads
//!
//! ### Example
//! ```no_run
//! use chartplan::{ChartInput, OutputFormat, RenderOptions, donut, export, viz};
//!
//! let data: ChartInput = [("A", 70.0), ("B", 20.0), ("C", 10.0)].into_iter().collect();
//! let plan = donut(&data, None, None, "Share", None)?;
//! assert!(plan.layout.show_labels);
//! viz::render_to_file(&plan, "share.svg", &RenderOptions::default())?;
//! let small_png = RenderOptions {
//!     width: Some(320),
//!     height: Some(240),
//!     format: OutputFormat::Png,
//!     ..RenderOptions::default()
//! };
//! let b64 = export::to_base64(&plan, &small_png)?;
//! println!("{} base64 chars", b64.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod models;
pub mod palette;
pub mod plan;
pub mod storage;
pub mod viz;

pub use compose::{
    BarChart, ChartStrategy, ComposeOptions, DonutChart, LineChart, bar, compose, donut, line,
};
pub use config::{ChartConfig, LegendPlacement, OutputFormat, RenderOptions};
pub use error::{ChartError, Result};
pub use models::{Cell, ChartInput, Table};
pub use palette::{Palette, Rgb};
pub use plan::{DrawCommand, DrawPlan};
