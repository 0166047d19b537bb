use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChartError, Result};

/// One value of a tabular cell.
///
/// Categories may be text, dates or numbers; measures are read through
/// [`Cell::as_f64`], which treats anything non-numeric as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Empty,
}

impl Cell {
    /// Infer a cell from raw text (CSV field, CLI argument).
    /// Numbers win over dates, dates over text; blank is `Empty`.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        if let Ok(v) = s.parse::<f64>() {
            return Cell::Number(v);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Cell::Date(d);
        }
        Cell::Text(s.to_string())
    }

    /// Numeric view of the cell; `None` for missing, text, dates and NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Display label used as category key and tick text.
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral numbers print without a trailing ".0" so "2024" stays "2024".
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

/// Row-oriented table with named columns (one row = one observation).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string headers and raw text rows, inferring cell types.
    pub fn from_strings<H, R, S>(headers: H, rows: R) -> Self
    where
        H: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        let headers = headers.into_iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|r| r.iter().map(|c| Cell::parse(c.as_ref())).collect())
            .collect();
        Self { headers, rows }
    }

    /// Index of a column: exact match first, then case-insensitive.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| ChartError::ColumnNotFound(name.to_string()))
    }

    /// Cell at (row, col); short rows read as `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// Distinct display labels of a column in first-seen order.
    pub fn distinct(&self, col: usize) -> Vec<String> {
        let mut seen: IndexMap<String, (), ahash::RandomState> =
            IndexMap::with_hasher(ahash::RandomState::new());
        for r in 0..self.rows.len() {
            seen.entry(self.cell(r, col).label()).or_insert(());
        }
        seen.into_keys().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What a chart can be built from, resolved once before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartInput {
    /// Direct label -> value mapping (insertion order kept).
    Mapping(IndexMap<String, f64>),
    /// Ordered (category, value) pairs; repeated categories are kept as-is.
    Series(Vec<(Cell, f64)>),
    /// Row-oriented table with named columns.
    Table(Table),
}

impl ChartInput {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChartInput::Mapping(_) => "mapping",
            ChartInput::Series(_) => "series",
            ChartInput::Table(_) => "table",
        }
    }

    /// View any input as a table. Mappings and series become a
    /// two-column `label,value` table.
    pub fn to_table(&self) -> Table {
        match self {
            ChartInput::Table(t) => t.clone(),
            ChartInput::Mapping(m) => Table::new(
                vec!["label".into(), "value".into()],
                m.iter()
                    .map(|(k, v)| vec![Cell::Text(k.clone()), Cell::Number(*v)])
                    .collect(),
            ),
            ChartInput::Series(s) => Table::new(
                vec!["label".into(), "value".into()],
                s.iter()
                    .map(|(k, v)| vec![k.clone(), Cell::Number(*v)])
                    .collect(),
            ),
        }
    }
}

impl From<Table> for ChartInput {
    fn from(t: Table) -> Self {
        ChartInput::Table(t)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ChartInput {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        ChartInput::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
