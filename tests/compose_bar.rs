use chartplan::aggregate::BarMode;
use chartplan::plan::{ChartKind, DrawCommand, LegendGlyph, LegendMode};
use chartplan::{BarChart, ChartError, ChartInput, ComposeOptions, Table, bar, compose};

fn sales() -> ChartInput {
    ChartInput::Table(Table::from_strings(
        ["quarter", "region", "channel", "sales"],
        [
            vec!["Q1", "North", "web", "10"],
            vec!["Q1", "South", "shop", "20"],
            vec!["Q2", "North", "shop", "30"],
            vec!["Q1", "North", "web", "5"],
        ],
    ))
}

fn rects(plan: &chartplan::DrawPlan) -> Vec<(f64, f64, f64, f64)> {
    plan.commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { x0, y0, x1, y1, .. } => Some((*x0, *y0, *x1, *y1)),
            _ => None,
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn grouped_bars_sit_side_by_side_inside_the_band() {
    let plan = bar(
        &sales(),
        Some("quarter"),
        Some("sales"),
        Some("region"),
        None,
        "Sales",
        false,
    )
    .unwrap();

    assert_eq!(plan.kind, ChartKind::Bar(BarMode::Grouped));
    assert_eq!(plan.layout.bar_width, Some(0.3));

    // Dense grid: Q2/South exists as a zero-height bar.
    let r = rects(&plan);
    assert_eq!(r.len(), 4);
    let center = |(x0, _, x1, _): (f64, f64, f64, f64)| (x0 + x1) / 2.0;
    // North first (first seen), then South; within a series, x in order.
    assert!(close(center(r[0]), -0.15));
    assert!(close(center(r[1]), 0.85));
    assert!(close(center(r[2]), 0.15));
    assert!(close(center(r[3]), 1.15));
    assert!(close(r[0].3, 15.0));
    assert!(close(r[3].3, 0.0));
    assert!(close(r[0].2 - r[0].0, 0.3));

    let legend = plan.legend.unwrap();
    let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["North", "South"]);
    assert!(legend.entries.iter().all(|e| e.glyph == LegendGlyph::Swatch));

    let axes = plan.axes.unwrap();
    assert_eq!(axes.x_title, "quarter");
    assert_eq!(axes.y_title, "Value");
    assert_eq!(axes.x_range, (-0.5, 1.5));
    assert_eq!(axes.x_ticks, vec![(0.0, "Q1".to_string()), (1.0, "Q2".to_string())]);
}

#[test]
fn stacked_bars_accumulate_from_the_previous_top() {
    let plan = bar(
        &sales(),
        Some("quarter"),
        Some("sales"),
        None,
        Some("region"),
        "",
        false,
    )
    .unwrap();
    assert_eq!(plan.kind, ChartKind::Bar(BarMode::Stacked));
    assert_eq!(plan.layout.bar_width, Some(0.6));

    let r = rects(&plan);
    assert_eq!(r.len(), 4);
    // North layer: Q1 = 15, Q2 = 30.
    assert_eq!((r[0].1, r[0].3), (0.0, 15.0));
    assert_eq!((r[1].1, r[1].3), (0.0, 30.0));
    // South layer sits on top of North.
    assert_eq!((r[2].1, r[2].3), (15.0, 35.0));
    assert_eq!((r[3].1, r[3].3), (30.0, 30.0));
    // All stack layers share the same x extent.
    assert!(close(r[0].0, r[2].0) && close(r[0].2, r[2].2));
}

#[test]
fn grouped_and_stacked_bars_label_series_by_pair() {
    let plan = bar(
        &sales(),
        Some("quarter"),
        Some("sales"),
        Some("region"),
        Some("channel"),
        "",
        false,
    )
    .unwrap();
    assert_eq!(plan.kind, ChartKind::Bar(BarMode::GroupedStacked));
    assert_eq!(rects(&plan).len(), 2 * 2 * 2);

    let labels: Vec<String> = plan
        .legend
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.label)
        .collect();
    assert_eq!(labels, ["North-web", "North-shop", "South-web", "South-shop"]);
}

#[test]
fn grouped_and_stacked_plan_is_stable_across_calls() {
    let build = || {
        bar(
            &sales(),
            Some("quarter"),
            Some("sales"),
            Some("region"),
            Some("channel"),
            "Stable",
            true,
        )
        .unwrap()
    };
    let (first, second) = (build(), build());
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn long_series_lists_are_truncated_with_ellipsis() {
    let rows: Vec<Vec<String>> = (0..12)
        .map(|g| vec!["x".to_string(), format!("g{g:02}"), "1".to_string()])
        .collect();
    let table = Table::from_strings(
        ["cat".to_string(), "grp".to_string(), "v".to_string()],
        rows,
    );
    let plan = bar(
        &ChartInput::Table(table),
        Some("cat"),
        Some("v"),
        Some("grp"),
        None,
        "",
        false,
    )
    .unwrap();
    let legend = plan.legend.unwrap();
    assert_eq!(legend.entries.len(), 11);
    assert_eq!(legend.entries[9].label, "g09");
    assert_eq!(legend.entries[10].label, "...");
    assert_eq!(legend.entries[10].glyph, LegendGlyph::Blank);
}

#[test]
fn mapping_input_draws_simple_bars_without_legend() {
    let data: ChartInput = [("a", 1.0), ("b", 2.0), ("c", 3.0)].into_iter().collect();
    let plan = bar(&data, None, None, None, None, "", false).unwrap();
    assert_eq!(plan.kind, ChartKind::Bar(BarMode::Simple));
    assert_eq!(plan.layout.bar_width, Some(0.6));
    assert_eq!(plan.layout.legend_mode, LegendMode::Hidden);
    assert!(plan.legend.is_none());
    assert_eq!(rects(&plan).len(), 3);
}

#[test]
fn simple_bar_width_grows_with_category_count() {
    let width_for = |n: usize| {
        let names: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
        let data: ChartInput = names.iter().map(|n| (n.as_str(), 1.0)).collect();
        bar(&data, None, None, None, None, "", false)
            .unwrap()
            .layout
            .bar_width
            .unwrap()
    };
    assert_eq!(width_for(5), 0.6);
    assert_eq!(width_for(8), 0.7);
    assert_eq!(width_for(30), 0.8);
}

#[test]
fn value_labels_skip_zero_and_crowded_axes() {
    let data: ChartInput = [("a", 1500.0), ("b", 0.0), ("c", 3.0)].into_iter().collect();
    let plan = bar(&data, None, None, None, None, "", true).unwrap();
    assert!(plan.layout.show_labels);
    assert_eq!(plan.texts(), vec!["1.5K", "3"]);

    let names: Vec<String> = (0..16).map(|i| format!("k{i}")).collect();
    let crowded: ChartInput = names.iter().map(|n| (n.as_str(), 5.0)).collect();
    let plan = bar(&crowded, None, None, None, None, "", true).unwrap();
    assert!(!plan.layout.show_labels);
    assert!(plan.texts().is_empty());
}

#[test]
fn long_category_names_rotate_tick_labels() {
    let data: ChartInput = [("a rather long category", 1.0), ("short", 2.0)]
        .into_iter()
        .collect();
    let plan = bar(&data, None, None, None, None, "", false).unwrap();
    assert_eq!(plan.layout.x_rotation, 45);
    assert_eq!(plan.axes.unwrap().x_rotation, 45);
}

#[test]
fn tabular_bars_need_x_and_y_columns() {
    let err = bar(&sales(), None, None, Some("region"), None, "", false).unwrap_err();
    assert_eq!(
        err,
        ChartError::MissingColumns {
            chart: "bar",
            missing: vec!["x_col", "y_col"],
        }
    );

    let err = bar(&sales(), Some("quarter"), Some("nope"), None, None, "", false).unwrap_err();
    assert_eq!(err, ChartError::ColumnNotFound("nope".into()));
}

#[test]
fn grouping_a_mapping_is_unsupported() {
    let data: ChartInput = [("a", 1.0)].into_iter().collect();
    let err = bar(&data, None, None, Some("g"), None, "", false).unwrap_err();
    assert!(matches!(err, ChartError::UnsupportedInput(_)));
}

#[test]
fn strategy_overrides_titles_and_canvas() {
    let chart = BarChart {
        x_col: Some("quarter".into()),
        y_col: Some("sales".into()),
        x_title: Some("Quarter".into()),
        y_title: Some("EUR".into()),
        ..BarChart::default()
    };
    let opts = ComposeOptions {
        width: 640,
        height: 480,
        ..ComposeOptions::default()
    };
    let plan = compose(&chart, &sales(), "Revenue", &opts).unwrap();
    assert_eq!((plan.width, plan.height), (640, 480));
    let axes = plan.axes.unwrap();
    assert_eq!(axes.x_title, "Quarter");
    assert_eq!(axes.y_title, "EUR");
}
