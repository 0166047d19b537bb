//! Reduce raw input into plot-ready series.
//!
//! - Ring: one summed value per category
//! - Line: one value per (x, y-column), no aggregation
//! - Bar: a dense grid keyed by (x, group?, stack?), summed
//!
//! Category keys always iterate in first-seen order so legends follow the
//! caller's data order. Missing or non-numeric measures count as zero.

use ahash::RandomState;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ChartError, Result};
use crate::models::{Cell, ChartInput, Table};

type OrderedSums = IndexMap<String, f64, RandomState>;

fn ordered_sums() -> OrderedSums {
    IndexMap::with_hasher(RandomState::new())
}

/// Insert `key` if unseen and return its first-seen position.
fn intern(index: &mut IndexMap<String, (), RandomState>, key: String) -> usize {
    index.insert_full(key, ()).0
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Ring
// ---------------------------------------------------------------------------

/// Categories and their (summed) values for a ring chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl RingData {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build ring categories from a mapping, an ordered series, or a table grouped
/// on `label_col` with `value_col` summed.
pub fn ring_slices(
    input: &ChartInput,
    label_col: Option<&str>,
    value_col: Option<&str>,
) -> Result<RingData> {
    let (labels, values): (Vec<String>, Vec<f64>) = match input {
        ChartInput::Mapping(m) => m
            .iter()
            .map(|(k, v)| (k.clone(), finite_or_zero(*v)))
            .unzip(),
        ChartInput::Series(s) => s
            .iter()
            .map(|(k, v)| (k.label(), finite_or_zero(*v)))
            .unzip(),
        ChartInput::Table(t) => {
            let (label_col, value_col) = match (label_col, value_col) {
                (Some(l), Some(v)) => (l, v),
                (l, v) => {
                    let mut missing = Vec::new();
                    if l.is_none() {
                        missing.push("label_col");
                    }
                    if v.is_none() {
                        missing.push("value_col");
                    }
                    return Err(ChartError::MissingColumns {
                        chart: "ring",
                        missing,
                    });
                }
            };
            let li = t.column_index(label_col)?;
            let vi = t.column_index(value_col)?;
            let mut sums = ordered_sums();
            for r in 0..t.len() {
                let v = t.cell(r, vi).as_f64().unwrap_or(0.0);
                *sums.entry(t.cell(r, li).label()).or_insert(0.0) += v;
            }
            sums.into_iter().unzip()
        }
    };

    if labels.is_empty() {
        return Err(ChartError::EmptyData("ring chart has no categories"));
    }
    Ok(RingData { labels, values })
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One y-column plotted against the shared x column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    /// Aligned with [`LineData::x`]; `None` where the cell is missing or non-numeric.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub x_col: String,
    pub x: Vec<Cell>,
    pub series: Vec<LineSeries>,
}

impl LineData {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_labels(&self) -> Vec<String> {
        self.x.iter().map(Cell::label).collect()
    }

    /// Numeric x positions when every x cell is a number, else `None`
    /// (categorical axis).
    pub fn numeric_x(&self) -> Option<Vec<f64>> {
        self.x.iter().map(Cell::as_f64).collect()
    }
}

/// Split a table into one series per y column. `x_col` defaults to the first
/// column and `y_cols` to every other column.
pub fn line_series(
    input: &ChartInput,
    x_col: Option<&str>,
    y_cols: Option<&[String]>,
) -> Result<LineData> {
    let table: Table = input.to_table();
    if table.headers.is_empty() {
        return Err(ChartError::EmptyData("line chart input has no columns"));
    }
    let xi = match x_col {
        Some(name) => table.column_index(name)?,
        None => 0,
    };
    let x_name = table.headers[xi].clone();

    let y_names: Vec<String> = match y_cols {
        Some(cols) if !cols.is_empty() => cols.to_vec(),
        _ => table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != xi)
            .map(|(_, h)| h.clone())
            .collect(),
    };
    if y_names.is_empty() {
        return Err(ChartError::EmptyData("line chart has no y columns"));
    }
    if table.is_empty() {
        return Err(ChartError::EmptyData("line chart has no rows"));
    }

    let mut series = Vec::with_capacity(y_names.len());
    for name in y_names {
        let yi = table.column_index(&name)?;
        let values = (0..table.len()).map(|r| table.cell(r, yi).as_f64()).collect();
        series.push(LineSeries { name, values });
    }

    Ok(LineData {
        x_col: x_name,
        x: (0..table.len()).map(|r| table.cell(r, xi).clone()).collect(),
        series,
    })
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

/// Which discriminator columns a bar chart uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Simple,
    Grouped,
    Stacked,
    GroupedStacked,
}

impl BarMode {
    pub fn from_flags(grouped: bool, stacked: bool) -> Self {
        match (grouped, stacked) {
            (false, false) => BarMode::Simple,
            (true, false) => BarMode::Grouped,
            (false, true) => BarMode::Stacked,
            (true, true) => BarMode::GroupedStacked,
        }
    }
}

/// Dense (x × group × stack) grid of summed values.
///
/// `groups`/`stacks` are empty when the corresponding column is not used;
/// the grid then has a single implicit slot on that axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGrid {
    pub mode: BarMode,
    pub x_col: String,
    pub x_values: Vec<String>,
    pub groups: Vec<String>,
    pub stacks: Vec<String>,
    values: Vec<f64>,
}

/// One cell of a [`BarGrid`], as returned by [`BarGrid::entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry<'a> {
    pub x: &'a str,
    pub group: Option<&'a str>,
    pub stack: Option<&'a str>,
    pub value: f64,
}

impl BarGrid {
    fn slots(n: usize) -> usize {
        n.max(1)
    }

    pub fn group_slots(&self) -> usize {
        Self::slots(self.groups.len())
    }

    pub fn stack_slots(&self) -> usize {
        Self::slots(self.stacks.len())
    }

    #[inline]
    fn offset(&self, x: usize, group: usize, stack: usize) -> usize {
        (group * self.stack_slots() + stack) * self.x_values.len() + x
    }

    /// Value at positional indices.
    pub fn value(&self, x: usize, group: usize, stack: usize) -> f64 {
        self.values[self.offset(x, group, stack)]
    }

    /// Values of one (group, stack) series across every x.
    pub fn row(&self, group: usize, stack: usize) -> &[f64] {
        let start = self.offset(0, group, stack);
        &self.values[start..start + self.x_values.len()]
    }

    /// Look up by key. Observed combinations absent from the input read as
    /// `Some(0.0)`; unknown keys give `None`.
    pub fn get(&self, x: &str, group: Option<&str>, stack: Option<&str>) -> Option<f64> {
        let xi = self.x_values.iter().position(|v| v == x)?;
        let gi = Self::key_index(&self.groups, group)?;
        let si = Self::key_index(&self.stacks, stack)?;
        Some(self.value(xi, gi, si))
    }

    fn key_index(keys: &[String], key: Option<&str>) -> Option<usize> {
        match (keys.is_empty(), key) {
            (true, None) => Some(0),
            (false, Some(k)) => keys.iter().position(|v| v == k),
            _ => None,
        }
    }

    /// Every cell of the grid, group-major then stack then x.
    pub fn entries(&self) -> Vec<BarEntry<'_>> {
        let mut out = Vec::with_capacity(self.values.len());
        for g in 0..self.group_slots() {
            for s in 0..self.stack_slots() {
                for (x, xv) in self.x_values.iter().enumerate() {
                    out.push(BarEntry {
                        x: xv,
                        group: self.groups.get(g).map(String::as_str),
                        stack: self.stacks.get(s).map(String::as_str),
                        value: self.value(x, g, s),
                    });
                }
            }
        }
        out
    }

    /// Number of distinct series drawn at each x (groups × stacks).
    pub fn series_count(&self) -> usize {
        self.group_slots() * self.stack_slots()
    }
}

/// Sum `y_col` over (x, group?, stack?) into a dense grid.
///
/// Tabular input requires `x_col` and `y_col`. Mappings and ordered series
/// become simple bars keyed by their labels and cannot be grouped or stacked.
pub fn bar_grid(
    input: &ChartInput,
    x_col: Option<&str>,
    y_col: Option<&str>,
    group_col: Option<&str>,
    stack_col: Option<&str>,
) -> Result<BarGrid> {
    let (table, x_name, y_name) = match input {
        ChartInput::Table(t) => {
            let mut missing = Vec::new();
            if x_col.is_none() {
                missing.push("x_col");
            }
            if y_col.is_none() {
                missing.push("y_col");
            }
            match (x_col, y_col) {
                (Some(x), Some(y)) => (t.clone(), x.to_string(), y.to_string()),
                _ => {
                    return Err(ChartError::MissingColumns {
                        chart: "bar",
                        missing,
                    });
                }
            }
        }
        other => {
            if group_col.is_some() || stack_col.is_some() {
                return Err(ChartError::UnsupportedInput(format!(
                    "grouped or stacked bars need tabular input, got a {}",
                    other.kind_name()
                )));
            }
            (other.to_table(), "label".to_string(), "value".to_string())
        }
    };

    let xi = table.column_index(&x_name)?;
    let yi = table.column_index(&y_name)?;
    let gi = group_col.map(|c| table.column_index(c)).transpose()?;
    let si = stack_col.map(|c| table.column_index(c)).transpose()?;

    if table.is_empty() {
        return Err(ChartError::EmptyData("bar chart has no rows"));
    }

    let new_index = || IndexMap::<String, (), RandomState>::with_hasher(RandomState::new());
    let (mut xs, mut gs, mut ss) = (new_index(), new_index(), new_index());

    // Pass 1: positions in first-seen order.
    let mut keyed: Vec<(usize, usize, usize, f64)> = Vec::with_capacity(table.len());
    for r in 0..table.len() {
        let x = intern(&mut xs, table.cell(r, xi).label());
        let g = gi.map_or(0, |c| intern(&mut gs, table.cell(r, c).label()));
        let s = si.map_or(0, |c| intern(&mut ss, table.cell(r, c).label()));
        let v = table.cell(r, yi).as_f64().unwrap_or(0.0);
        keyed.push((x, g, s, v));
    }

    // Pass 2: dense sums.
    let mut grid = BarGrid {
        mode: BarMode::from_flags(gi.is_some(), si.is_some()),
        x_col: table.headers[xi].clone(),
        x_values: xs.into_keys().collect(),
        groups: gs.into_keys().collect(),
        stacks: ss.into_keys().collect(),
        values: Vec::new(),
    };
    grid.values = vec![0.0; grid.x_values.len() * grid.series_count()];
    for (x, g, s, v) in keyed {
        let at = grid.offset(x, g, s);
        grid.values[at] += v;
    }

    log::debug!(
        "bar grid: mode={:?} x={} groups={} stacks={}",
        grid.mode,
        grid.x_values.len(),
        grid.groups.len(),
        grid.stacks.len()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ChartInput {
        ChartInput::Table(Table::from_strings(
            headers.iter().copied(),
            rows.iter().map(|r| r.to_vec()),
        ))
    }

    #[test]
    fn ring_sums_repeated_labels_in_first_seen_order() {
        let input = table(
            &["k", "v"],
            &[&["b", "1"], &["a", "2"], &["b", "3"], &["c", "x"]],
        );
        let ring = ring_slices(&input, Some("k"), Some("v")).unwrap();
        assert_eq!(ring.labels, ["b", "a", "c"]);
        assert_eq!(ring.values, [4.0, 2.0, 0.0]);
        assert_eq!(ring.total(), 6.0);
    }

    #[test]
    fn ring_series_keeps_duplicates_and_zeroes_nan() {
        let input = ChartInput::Series(vec![
            (Cell::from("a"), 1.0),
            (Cell::from("a"), f64::NAN),
        ]);
        let ring = ring_slices(&input, None, None).unwrap();
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.values, [1.0, 0.0]);
    }

    #[test]
    fn ring_requires_both_columns_for_tables() {
        let input = table(&["k", "v"], &[&["a", "1"]]);
        assert_eq!(
            ring_slices(&input, None, None).unwrap_err(),
            ChartError::MissingColumns {
                chart: "ring",
                missing: vec!["label_col", "value_col"],
            }
        );
        let empty: ChartInput = Vec::<(&str, f64)>::new().into_iter().collect();
        assert!(matches!(
            ring_slices(&empty, None, None),
            Err(ChartError::EmptyData(_))
        ));
    }

    #[test]
    fn line_defaults_to_first_column_as_x() {
        let input = table(&["d", "a", "b"], &[&["1", "2", ""], &["2", "3", "4"]]);
        let data = line_series(&input, None, None).unwrap();
        assert_eq!(data.x_col, "d");
        assert_eq!(data.numeric_x(), Some(vec![1.0, 2.0]));
        let names: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(data.series[1].values, [None, Some(4.0)]);
    }

    #[test]
    fn line_with_text_x_is_categorical() {
        let input = table(&["m", "v"], &[&["Jan", "1"], &["Feb", "2"]]);
        let data = line_series(&input, Some("m"), None).unwrap();
        assert_eq!(data.numeric_x(), None);
        assert_eq!(data.x_labels(), ["Jan", "Feb"]);
    }

    #[test]
    fn bar_grid_is_dense_and_summed() {
        let input = table(
            &["q", "r", "s"],
            &[
                &["Q1", "N", "10"],
                &["Q1", "S", "20"],
                &["Q2", "N", "30"],
                &["Q1", "N", "1"],
            ],
        );
        let grid = bar_grid(&input, Some("q"), Some("s"), Some("r"), None).unwrap();
        assert_eq!(grid.mode, BarMode::Grouped);
        assert_eq!(grid.x_values, ["Q1", "Q2"]);
        assert_eq!(grid.groups, ["N", "S"]);
        assert!(grid.stacks.is_empty());
        assert_eq!(grid.series_count(), 2);
        assert_eq!(grid.get("Q1", Some("N"), None), Some(11.0));
        assert_eq!(grid.get("Q2", Some("S"), None), Some(0.0));
        assert_eq!(grid.get("Q3", Some("S"), None), None);
        assert_eq!(grid.get("Q1", None, None), None);
        assert_eq!(grid.row(1, 0), [20.0, 0.0]);
        assert_eq!(grid.entries().len(), 4);
    }

    #[test]
    fn bar_grid_with_groups_and_stacks() {
        let input = table(
            &["x", "g", "s", "v"],
            &[&["a", "g1", "s1", "1"], &["a", "g2", "s2", "2"]],
        );
        let grid = bar_grid(&input, Some("x"), Some("v"), Some("g"), Some("s")).unwrap();
        assert_eq!(grid.mode, BarMode::GroupedStacked);
        assert_eq!(grid.series_count(), 4);
        assert_eq!(grid.value(0, 1, 1), 2.0);
        assert_eq!(grid.value(0, 0, 1), 0.0);
        let e = &grid.entries()[1];
        assert_eq!((e.x, e.group, e.stack), ("a", Some("g1"), Some("s2")));
    }

    #[test]
    fn bar_from_mapping_is_simple() {
        let input: ChartInput = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        let grid = bar_grid(&input, None, None, None, None).unwrap();
        assert_eq!(grid.mode, BarMode::Simple);
        assert_eq!(grid.x_col, "label");
        assert_eq!(grid.get("b", None, None), Some(2.0));
    }

    #[test]
    fn bar_errors() {
        let input = table(&["x", "v"], &[&["a", "1"]]);
        assert_eq!(
            bar_grid(&input, Some("x"), None, None, None).unwrap_err(),
            ChartError::MissingColumns {
                chart: "bar",
                missing: vec!["y_col"],
            }
        );
        assert_eq!(
            bar_grid(&input, Some("x"), Some("v"), Some("g"), None).unwrap_err(),
            ChartError::ColumnNotFound("g".into())
        );
        let mapping: ChartInput = [("a", 1.0)].into_iter().collect();
        assert!(matches!(
            bar_grid(&mapping, None, None, None, Some("s")),
            Err(ChartError::UnsupportedInput(_))
        ));
    }
}
