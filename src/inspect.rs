//! Render a single row as structured text: each cell is typed by trying an
//! integer, then a float, then a boolean parse, falling back to the raw
//! string, and the name→value mapping is pretty-printed as JSON.

use color_eyre::Result;
use serde_json::{Map, Number, Value};

use crate::data::Dataset;

fn typed_value(cell: &str) -> Value {
    if let Ok(v) = cell.parse::<i64>() {
        return Value::Number(v.into());
    }
    if let Ok(v) = cell.parse::<f64>() {
        if let Some(n) = Number::from_f64(v) {
            return Value::Number(n);
        }
    }
    match cell.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    Value::String(cell.to_string())
}

/// Pretty-printed JSON object for one row, keys sorted by column name.
pub fn row_to_text(data: &Dataset, row: usize) -> Result<String> {
    let mut object = Map::new();
    for (col, cell) in data.columns.iter().zip(&data.rows[row]) {
        object.insert(col.name.clone(), typed_value(cell));
    }
    Ok(serde_json::to_string_pretty(&Value::Object(object))?)
}
