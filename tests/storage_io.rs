use std::fs;
use tempfile::tempdir;

use chartplan::storage::{load_csv, load_input};
use chartplan::{Cell, ChartConfig, ChartInput, LegendPlacement, OutputFormat, donut};

#[test]
fn csv_file_loads_as_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    fs::write(&path, "quarter, sales\nQ1, 10\nQ2, 12.5\n").unwrap();

    let table = load_csv(&path).unwrap();
    assert_eq!(table.headers, ["quarter", "sales"]);
    assert_eq!(table.cell(1, 1), &Cell::Number(12.5));

    match load_input(&path).unwrap() {
        ChartInput::Table(t) => assert_eq!(t.len(), 2),
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn json_object_loads_as_mapping_in_file_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("share.JSON");
    fs::write(&path, r#"{"Zeta": 70, "Alpha": 20, "Mid": "10"}"#).unwrap();

    let input = load_input(&path).unwrap();
    let ChartInput::Mapping(m) = &input else {
        panic!("expected mapping, got {input:?}");
    };
    let keys: Vec<&str> = m.keys().map(String::as_str).collect();
    assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);

    let plan = donut(&input, None, None, "", None).unwrap();
    assert_eq!(plan.texts()[0], "Zeta");
}

#[test]
fn json_records_load_as_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rows.json");
    fs::write(
        &path,
        r#"[{"day": "2024-01-01", "v": 1}, {"day": "2024-01-02", "v": null}]"#,
    )
    .unwrap();
    let ChartInput::Table(t) = load_input(&path).unwrap() else {
        panic!("expected table");
    };
    assert!(matches!(t.cell(0, 0), Cell::Date(_)));
    assert_eq!(t.cell(1, 1), &Cell::Empty);
}

#[test]
fn unreadable_inputs_report_the_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let err = load_input(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();
    let err = load_input(&bad).unwrap_err();
    assert!(format!("{err:#}").contains("invalid JSON"));

    let nested = dir.path().join("nested.json");
    fs::write(&nested, r#"{"a": [1, 2]}"#).unwrap();
    assert!(load_input(&nested).is_err());
}

#[test]
fn config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chart.json");
    fs::write(
        &path,
        r##"{
            "render": {"width": 800, "height": 500, "type": "svg", "legend": "top", "locale": "fr"},
            "palette": ["#112233", "#445566"],
            "font_path": "/nowhere/font.ttf"
        }"##,
    )
    .unwrap();

    let cfg = ChartConfig::from_json_file(&path).unwrap();
    assert_eq!((cfg.render.width, cfg.render.height), (Some(800), Some(500)));
    assert_eq!(cfg.render.format, OutputFormat::Svg);
    assert_eq!(cfg.render.legend, Some(LegendPlacement::Top));
    assert_eq!(cfg.render.locale, "fr");
    assert_eq!(cfg.palette().unwrap().len(), 2);
    assert!(cfg.font_path.is_some());

    assert!(ChartConfig::from_json_file(dir.path().join("none.json")).is_err());
}
