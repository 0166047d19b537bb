use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn chartplan() -> Command {
    Command::cargo_bin("chartplan").unwrap()
}

#[test]
fn help_lists_chart_subcommands() {
    chartplan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("donut"))
        .stdout(predicate::str::contains("line"))
        .stdout(predicate::str::contains("bar"));
}

#[test]
fn donut_plan_is_printed_as_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("share.json");
    fs::write(&input, r#"{"A": 70, "B": 20, "C": 10}"#).unwrap();

    let out = chartplan()
        .args(["donut", "--input"])
        .arg(&input)
        .args(["--title", "Share", "--plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"op\": \"wedge\""))
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(plan["title"], "Share");
    assert_eq!(plan["layout"]["show_labels"], true);
    assert!(plan["legend"].is_null());
}

#[test]
fn bar_chart_renders_svg_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(
        &input,
        "quarter,region,sales\nQ1,North,10\nQ1,South,20\nQ2,North,30\n",
    )
    .unwrap();
    let out = dir.path().join("sales.svg");

    chartplan()
        .args(["bar", "--input"])
        .arg(&input)
        .args(["--x-col", "quarter", "--y-col", "sales", "--group-col", "region"])
        .args(["--legend", "bottom", "--width", "640", "--height", "400", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote chart to"));

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn line_chart_base64_png() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trend.csv");
    fs::write(&input, "year,a,b\n2020,1,2\n2021,3,\n2022,2,5\n").unwrap();

    chartplan()
        .args(["line", "--input"])
        .arg(&input)
        .args(["--base64", "png", "--colors", "#ff0000,#00ff00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("iVBORw0KGgo"));
}

#[test]
fn bare_base64_uses_config_format_and_size() {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let dir = tempdir().unwrap();
    let input = dir.path().join("share.json");
    fs::write(&input, r#"{"A": 70, "B": 30}"#).unwrap();
    let config = dir.path().join("chart.json");
    fs::write(&config, r#"{"render": {"type": "svg", "width": 400, "height": 300}}"#).unwrap();

    let out = chartplan()
        .args(["donut", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--base64")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let encoded = String::from_utf8(out).unwrap();
    let svg = String::from_utf8(STANDARD.decode(encoded.trim()).unwrap()).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains(r#"width="400""#));
}

#[test]
fn line_dashes_flag_reaches_the_plan() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trend.csv");
    fs::write(&input, "year,a,b\n2020,1,2\n2021,3,4\n").unwrap();

    let out = chartplan()
        .args(["line", "--input"])
        .arg(&input)
        .args(["--plan", "--dashes", "dot"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let commands = plan["commands"].as_array().unwrap();
    assert_eq!(commands[0]["dash"], "dot");
    assert_eq!(commands[1]["dash"], "dot");
}

#[test]
fn tabular_bar_without_columns_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, "quarter,sales\nQ1,10\n").unwrap();

    chartplan()
        .args(["bar", "--input"])
        .arg(&input)
        .arg("--plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("x_col"));
}

#[test]
fn missing_output_flag_is_an_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("share.json");
    fs::write(&input, r#"{"A": 1}"#).unwrap();

    chartplan()
        .args(["donut", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to do"));
}

#[test]
fn invalid_color_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("share.json");
    fs::write(&input, r#"{"A": 1}"#).unwrap();

    chartplan()
        .args(["donut", "--input"])
        .arg(&input)
        .args(["--plan", "--colors", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid color"));
}
