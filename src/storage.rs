//! Tabular input readers: CSV files and JSON documents.

use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::models::{Cell, ChartInput, Table};

/// Read a CSV document with a header row; cell types are inferred per field.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV record {}", i + 1))?;
        rows.push(record.iter().map(Cell::parse).collect());
    }
    Ok(Table::new(headers, rows))
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let f = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_csv(f)
}

fn json_cell(field: &str, v: Option<&Value>) -> Result<Cell> {
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64().map_or(Cell::Empty, Cell::Number),
        Some(Value::String(s)) => Cell::parse(s),
        Some(Value::Bool(b)) => Cell::Text(b.to_string()),
        Some(Value::Null) | None => Cell::Empty,
        _ => return Err(anyhow!("unsupported value type for field '{}'", field)),
    })
}

/// Parse a JSON document into chart input.
///
/// - `[{"col": value, ...}, ...]` → table (headers from the first object)
/// - `{"label": number, ...}` → mapping
pub fn parse_json(value: &Value) -> Result<ChartInput> {
    match value {
        Value::Array(items) => {
            let first = items
                .first()
                .ok_or_else(|| anyhow!("input data array is empty"))?
                .as_object()
                .ok_or_else(|| anyhow!("items in array must be objects"))?;
            let headers: Vec<String> = first.keys().cloned().collect();
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let obj = item
                    .as_object()
                    .ok_or_else(|| anyhow!("items in array must be objects"))?;
                let row = headers
                    .iter()
                    .map(|h| json_cell(h, obj.get(h)))
                    .collect::<Result<Vec<Cell>>>()?;
                rows.push(row);
            }
            Ok(ChartInput::Table(Table::new(headers, rows)))
        }
        Value::Object(obj) => {
            let mut map = IndexMap::with_capacity(obj.len());
            for (k, v) in obj {
                let n = match v {
                    Value::Number(n) => n.as_f64().unwrap_or(0.0),
                    Value::String(s) => s.trim().parse().unwrap_or(0.0),
                    Value::Null => 0.0,
                    _ => return Err(anyhow!("mapping value for '{}' is not a number", k)),
                };
                map.insert(k.clone(), n);
            }
            Ok(ChartInput::Mapping(map))
        }
        _ => Err(anyhow!(
            "input must be a JSON array of objects or an object of numbers"
        )),
    }
}

/// Load chart input from a `.csv` or `.json` file (by extension; CSV otherwise).
pub fn load_input<P: AsRef<Path>>(path: P) -> Result<ChartInput> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        parse_json(&value)
    } else {
        Ok(ChartInput::Table(load_csv(path)?))
    }
}
