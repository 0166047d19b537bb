use std::fs;
use tempfile::tempdir;

use chartplan::export::{save_figure, to_base64, to_data_uri};
use chartplan::viz::{render_png_bytes, render_svg_string, render_to_file};
use chartplan::{
    ChartInput, ComposeOptions, DonutChart, LegendPlacement, OutputFormat, RenderOptions, Table,
    bar, compose, donut, line,
};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn small() -> ComposeOptions {
    ComposeOptions {
        width: 320,
        height: 240,
        ..ComposeOptions::default()
    }
}

fn ring_input() -> ChartInput {
    [("Rent", 1200.0), ("Food", 450.0), ("Travel", 300.0), ("Misc", 5.0)]
        .into_iter()
        .collect()
}

fn sales() -> ChartInput {
    ChartInput::Table(Table::from_strings(
        ["quarter", "region", "sales"],
        [
            vec!["Q1", "North", "10"],
            vec!["Q1", "South", "20"],
            vec!["Q2", "North", "30"],
            vec!["Q2", "South", "-5"],
        ],
    ))
}

#[test]
fn ring_renders_to_svg_and_png_files() {
    let dir = tempdir().unwrap();
    let plan = compose(&DonutChart::default(), &ring_input(), "Budget", &small()).unwrap();

    for name in ["ring.svg", "ring.png"] {
        let path = dir.path().join(name);
        render_to_file(&plan, &path, &RenderOptions::default()).unwrap();
        let meta = fs::metadata(&path).unwrap();
        assert!(meta.len() > 0, "{name} is empty");
    }
    let svg = fs::read_to_string(dir.path().join("ring.svg")).unwrap();
    assert!(svg.contains("<svg"));
    let png = fs::read(dir.path().join("ring.png")).unwrap();
    assert_eq!(&png[..8], &PNG_MAGIC);
}

#[test]
fn every_legend_placement_renders() {
    let plan = bar(
        &sales(),
        Some("quarter"),
        Some("sales"),
        Some("region"),
        None,
        "Sales",
        true,
    )
    .unwrap();
    for placement in [
        LegendPlacement::Inside,
        LegendPlacement::Right,
        LegendPlacement::Top,
        LegendPlacement::Bottom,
    ] {
        let opts = RenderOptions {
            legend: Some(placement),
            ..RenderOptions::default()
        };
        let svg = render_svg_string(&plan, &opts).unwrap();
        assert!(svg.starts_with("<svg") || svg.contains("<svg"), "{placement:?}");
    }
}

#[test]
fn line_chart_png_bytes() {
    let table = Table::from_strings(
        ["year", "a", "b"],
        [
            vec!["2020", "1", "4"],
            vec!["2021", "", "3"],
            vec!["2022", "2.5", "1"],
        ],
    );
    let plan = line(&ChartInput::Table(table), None, None, "Trend", true).unwrap();
    let opts = RenderOptions {
        locale: "de".into(),
        ..RenderOptions::default()
    };
    let png = render_png_bytes(&plan, &opts).unwrap();
    assert!(png.len() > PNG_MAGIC.len());
    assert_eq!(&png[..8], &PNG_MAGIC);
}

#[test]
fn degenerate_ring_still_renders() {
    let data: ChartInput = [("A", 0.0), ("B", 0.0)].into_iter().collect();
    let plan = donut(&data, None, None, "", None).unwrap();
    let svg = render_svg_string(&plan, &RenderOptions::default()).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let opts = ComposeOptions {
        width: 0,
        ..ComposeOptions::default()
    };
    let plan = compose(&DonutChart::default(), &ring_input(), "", &opts).unwrap();
    let err = render_svg_string(&plan, &RenderOptions::default()).unwrap_err();
    assert!(err.to_string().contains("canvas size"));
    assert!(render_png_bytes(&plan, &RenderOptions::default()).is_err());
}

#[test]
fn base64_and_data_uri_exports() {
    let plan = compose(&DonutChart::default(), &ring_input(), "", &small()).unwrap();
    let b64 = to_base64(&plan, &RenderOptions::default()).unwrap();
    // "iVBORw0KGgo" is the base64 prefix of the PNG signature.
    assert!(b64.starts_with("iVBORw0KGgo"));

    let svg = RenderOptions {
        format: OutputFormat::Svg,
        ..RenderOptions::default()
    };
    let uri = to_data_uri(&plan, &svg).unwrap();
    assert!(uri.starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn save_figure_creates_directory_and_names_file() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("nested").join("charts");
    let plan = compose(&DonutChart::default(), &ring_input(), "", &small()).unwrap();

    let opts = RenderOptions {
        format: OutputFormat::Svg,
        ..RenderOptions::default()
    };
    let path = save_figure(&plan, &out_dir, "budget", &opts).unwrap();
    assert_eq!(path, out_dir.join("budget.svg"));
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn render_options_override_the_canvas_size() {
    let plan = donut(&ring_input(), None, None, "Budget", None).unwrap();
    assert_eq!((plan.width, plan.height), (1000, 600));
    let opts = RenderOptions {
        width: Some(320),
        height: Some(240),
        ..RenderOptions::default()
    };

    let svg = render_svg_string(&plan, &opts).unwrap();
    assert!(svg.contains(r#"width="320""#), "{}", &svg[..svg.len().min(200)]);
    assert!(svg.contains(r#"height="240""#));
    assert!(!svg.contains(r#"width="1000""#));

    // IHDR width and height follow the 8-byte signature and the chunk header.
    let png = render_png_bytes(&plan, &opts).unwrap();
    assert_eq!(&png[16..20], &320u32.to_be_bytes());
    assert_eq!(&png[20..24], &240u32.to_be_bytes());

    let too_big = RenderOptions {
        width: Some(30_000),
        ..RenderOptions::default()
    };
    assert!(render_svg_string(&plan, &too_big).is_err());
}

#[test]
fn unknown_extension_uses_the_configured_format() {
    let dir = tempdir().unwrap();
    let plan = compose(&DonutChart::default(), &ring_input(), "", &small()).unwrap();
    let opts = RenderOptions {
        format: OutputFormat::Svg,
        ..RenderOptions::default()
    };

    let path = dir.path().join("ring.out");
    render_to_file(&plan, &path, &opts).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("<svg"));

    // An explicit extension wins over the configured format.
    let path = dir.path().join("ring.png");
    render_to_file(&plan, &path, &opts).unwrap();
    assert_eq!(&fs::read(&path).unwrap()[..8], &PNG_MAGIC);
}
