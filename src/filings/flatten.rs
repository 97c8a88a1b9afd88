//! Compensation response flattening
//!
//! The compensation API returns an array of objects (one per executive and
//! year) whose values may themselves be objects. Nested keys are joined with
//! `.`; columns are the union of all keys in first-seen order.

use super::{FilingError, FilingResult};
use serde_json::{Map, Value};

/// A flat table ready to be written as CSV
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CompensationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&mut self, key: &str) -> usize {
        match self.columns.iter().position(|c| c == key) {
            Some(index) => index,
            None => {
                self.columns.push(key.to_string());
                self.columns.len() - 1
            }
        }
    }

    fn push_entry(&mut self, entry: &Map<String, Value>) {
        let mut cells = Vec::new();
        flatten_object(entry, "", &mut cells);

        let mut row = vec![String::new(); self.columns.len()];
        let mut filled = vec![false; self.columns.len()];
        for (key, cell) in cells {
            let index = self.column_index(&key);
            if index >= row.len() {
                row.resize(index + 1, String::new());
                filled.resize(index + 1, false);
            }
            // A literal dotted key and a nested path can name the same column
            if filled[index] {
                tracing::debug!(
                    "Column '{}' appears twice in one entry, keeping the later value",
                    key
                );
            }
            row[index] = cell;
            filled[index] = true;
        }
        self.rows.push(row);
    }

    /// Pads earlier rows to the final column count
    fn square(mut self) -> Self {
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        self
    }
}

/// Parses a compensation response body into a table
///
/// `null`, `[]` and `{}` mean the company has no data and yield
/// [`FilingError::NotFound`]. Anything other than an object or an array of
/// objects is [`FilingError::MalformedShape`].
pub fn flatten_response(cik: u64, body: &str) -> FilingResult<CompensationTable> {
    let value: Value = serde_json::from_str(body).map_err(|e| FilingError::MalformedShape {
        cik,
        message: format!("not JSON: {}", e),
    })?;

    let mut table = CompensationTable::default();

    match value {
        Value::Null => return Err(FilingError::NotFound { cik }),
        Value::Array(entries) if entries.is_empty() => return Err(FilingError::NotFound { cik }),
        Value::Object(entry) if entry.is_empty() => return Err(FilingError::NotFound { cik }),
        Value::Array(entries) => {
            for (position, entry) in entries.iter().enumerate() {
                let Value::Object(entry) = entry else {
                    return Err(FilingError::MalformedShape {
                        cik,
                        message: format!(
                            "entry {} is {}, expected an object",
                            position,
                            kind(entry)
                        ),
                    });
                };
                table.push_entry(entry);
            }
        }
        Value::Object(entry) => table.push_entry(&entry),
        other => {
            return Err(FilingError::MalformedShape {
                cik,
                message: format!("top level is {}, expected an array or object", kind(&other)),
            })
        }
    }

    Ok(table.square())
}

fn flatten_object(object: &Map<String, Value>, prefix: &str, cells: &mut Vec<(String, String)>) {
    for (key, value) in object {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_object(inner, &key, cells),
            other => cells.push((key, cell_text(other))),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Lists stay as JSON text in a single cell
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
