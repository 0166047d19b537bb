use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use chartplan::compose::{BarChart, ChartStrategy, ComposeOptions, DonutChart, LineChart};
use chartplan::plan::LineDash;
use chartplan::{ChartConfig, LegendPlacement, OutputFormat, Palette, Rgb};
use chartplan::{compose, export, fonts, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "chartplan",
    version,
    about = "Turn CSV/JSON data into adaptive donut, line and bar charts"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Donut (ring) chart of category shares.
    Donut(DonutArgs),
    /// Multi-series line chart.
    Line(LineArgs),
    /// Simple, grouped, stacked or grouped+stacked bar chart.
    Bar(BarArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Inside,
    Right,
    Top,
    Bottom,
}

impl From<LegendArg> for LegendPlacement {
    fn from(l: LegendArg) -> Self {
        match l {
            LegendArg::Inside => LegendPlacement::Inside,
            LegendArg::Right => LegendPlacement::Right,
            LegendArg::Top => LegendPlacement::Top,
            LegendArg::Bottom => LegendPlacement::Bottom,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DashArg {
    Solid,
    Dash,
    DashDot,
    Dot,
}

impl From<DashArg> for LineDash {
    fn from(d: DashArg) -> Self {
        match d {
            DashArg::Solid => LineDash::Solid,
            DashArg::Dash => LineDash::Dash,
            DashArg::DashDot => LineDash::DashDot,
            DashArg::Dot => LineDash::Dot,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ImageArg {
    Png,
    Svg,
}

impl From<ImageArg> for OutputFormat {
    fn from(f: ImageArg) -> Self {
        match f {
            ImageArg::Png => OutputFormat::Png,
            ImageArg::Svg => OutputFormat::Svg,
        }
    }
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Input data (.csv with a header row, or .json array of objects / object of numbers).
    #[arg(short, long)]
    input: PathBuf,
    /// Chart title.
    #[arg(short, long, default_value = "")]
    title: String,
    /// JSON config file (render options, palette, font path).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the chart to this path (.svg or .png; other extensions use the config's "type").
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Print the draw plan as JSON to stdout.
    #[arg(long, default_value_t = false)]
    plan: bool,
    /// Print the rendered image as base64 to stdout (format defaults to the config's "type").
    #[arg(long, value_enum, num_args = 0..=1)]
    base64: Option<Option<ImageArg>>,
    /// Canvas width in pixels (default 1000).
    #[arg(long)]
    width: Option<u32>,
    /// Canvas height in pixels (default 600).
    #[arg(long)]
    height: Option<u32>,
    /// Legend placement (default: right for donuts, inside otherwise).
    #[arg(long, value_enum)]
    legend: Option<LegendArg>,
    /// Locale for axis numbers (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
    /// TrueType font file for all text.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Series colors as #RRGGBB, comma separated (cycled).
    #[arg(long, value_delimiter = ',')]
    colors: Vec<String>,
}

#[derive(Args, Debug)]
struct DonutArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Category column (tables only).
    #[arg(long)]
    label_col: Option<String>,
    /// Value column (tables only).
    #[arg(long)]
    value_col: Option<String>,
}

#[derive(Args, Debug)]
struct LineArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// X column (default: first column).
    #[arg(long)]
    x_col: Option<String>,
    /// Y columns, comma separated (default: all other columns).
    #[arg(long, value_delimiter = ',')]
    y_cols: Vec<String>,
    /// X-axis title (default: the x column name).
    #[arg(long)]
    xlabel: Option<String>,
    /// Y-axis title.
    #[arg(long)]
    ylabel: Option<String>,
    /// Line dashes, comma separated and cycled (default: by series count).
    #[arg(long, value_enum, value_delimiter = ',')]
    dashes: Vec<DashArg>,
    /// Print values next to points (20 points or fewer).
    #[arg(long, default_value_t = false)]
    show_values: bool,
}

#[derive(Args, Debug)]
struct BarArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// X (category) column; required for tables.
    #[arg(long)]
    x_col: Option<String>,
    /// Value column; required for tables.
    #[arg(long)]
    y_col: Option<String>,
    /// Column whose values become side-by-side bars.
    #[arg(long)]
    group_col: Option<String>,
    /// Column whose values are stacked.
    #[arg(long)]
    stack_col: Option<String>,
    /// X-axis title (default: the x column name).
    #[arg(long)]
    xlabel: Option<String>,
    /// Y-axis title.
    #[arg(long)]
    ylabel: Option<String>,
    /// Print values on bars (15 categories or fewer).
    #[arg(long, default_value_t = false)]
    show_values: bool,
}

fn parse_colors(list: &[String]) -> Result<Option<Vec<Rgb>>> {
    if list.is_empty() {
        return Ok(None);
    }
    let colors = list
        .iter()
        .map(|s| s.trim().parse::<Rgb>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(colors))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Donut(args) => {
            let chart = DonutChart {
                label_col: args.label_col,
                value_col: args.value_col,
                colors: parse_colors(&args.common.colors)?,
            };
            run(&chart, &args.common)
        }
        Command::Line(args) => {
            let chart = LineChart {
                x_col: args.x_col,
                y_cols: (!args.y_cols.is_empty()).then_some(args.y_cols),
                x_title: args.xlabel,
                y_title: args.ylabel,
                colors: parse_colors(&args.common.colors)?,
                dashes: (!args.dashes.is_empty())
                    .then(|| args.dashes.iter().copied().map(LineDash::from).collect()),
                show_values: args.show_values,
            };
            run(&chart, &args.common)
        }
        Command::Bar(args) => {
            let chart = BarChart {
                x_col: args.x_col,
                y_col: args.y_col,
                group_col: args.group_col,
                stack_col: args.stack_col,
                x_title: args.xlabel,
                y_title: args.ylabel,
                colors: parse_colors(&args.common.colors)?,
                show_values: args.show_values,
            };
            run(&chart, &args.common)
        }
    }
}

fn run(chart: &dyn ChartStrategy, args: &CommonArgs) -> Result<()> {
    if args.out.is_none() && !args.plan && args.base64.is_none() {
        bail!("nothing to do: pass --out, --plan or --base64");
    }

    let config = match &args.config {
        Some(path) => ChartConfig::from_json_file(path)?,
        None => ChartConfig::default(),
    };
    let mut render = config.render.clone();
    if args.width.is_some() {
        render.width = args.width;
    }
    if args.height.is_some() {
        render.height = args.height;
    }
    if let Some(l) = args.legend {
        render.legend = Some(l.into());
    }
    if let Some(loc) = &args.locale {
        render.locale = loc.clone();
    }
    let palette: Palette = config.palette()?;

    let input = storage::load_input(&args.input)?;
    let defaults = ComposeOptions::default();
    let opts = ComposeOptions {
        width: render.width.unwrap_or(defaults.width),
        height: render.height.unwrap_or(defaults.height),
        palette,
    };
    let plan = compose(chart, &input, &args.title, &opts).with_context(|| {
        format!(
            "cannot build {} chart from {}",
            chart.name(),
            args.input.display()
        )
    })?;

    if args.plan {
        println!("{}", plan.to_json()?);
    }
    if args.out.is_some() || args.base64.is_some() {
        fonts::provision(args.font.as_deref().or(config.font_path.as_deref()));
    }
    if let Some(path) = &args.out {
        viz::render_to_file(&plan, path, &render)?;
        eprintln!("Wrote chart to {}", path.display());
    }
    if let Some(fmt) = args.base64 {
        if let Some(fmt) = fmt {
            render.format = fmt.into();
        }
        println!("{}", export::to_base64(&plan, &render)?);
    }
    Ok(())
}
