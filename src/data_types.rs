// src/data_types.rs
use google_sheets4::api::ValueRange;
use serde_json::Value;

/// One fetched range. `values[0]`, if present, is the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub range: String,
    pub values: Vec<Vec<Value>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn header(&self) -> Option<&[Value]> {
        self.values.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<Value>] {
        self.values.get(1..).unwrap_or(&[])
    }
}

impl From<ValueRange> for Table {
    fn from(response: ValueRange) -> Self {
        Table {
            range: response.range.unwrap_or_default(),
            values: response.values.unwrap_or_default(),
        }
    }
}

/// Plain text of a cell, with no type-specific formatting.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
