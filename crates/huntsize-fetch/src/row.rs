//! Typed view over advanced-hunting result rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column description from the response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Column type as reported by the service (e.g. `DateTime`, `String`).
    #[serde(rename = "Type", default)]
    pub column_type: String,
}

/// A single result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates a row from a JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the raw value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns a column as a signed 64-bit integer.
    ///
    /// Integral numbers, floats with no fractional part and numeric strings
    /// are accepted; anything else yields `None`.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_u64()
                    .map(|v| i64::try_from(v).unwrap_or(i64::MAX))
                    .or_else(|| {
                        n.as_f64()
                            .filter(|f| f.is_finite() && f.fract() == 0.0)
                            .map(|f| f as i64)
                    })
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Renders a column as CSV cell text.
    ///
    /// Strings are written verbatim, null and missing columns are empty, and
    /// every other value is written as compact JSON.
    #[must_use]
    pub fn cell_text(&self, column: &str) -> String {
        match self.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Returns the column names present in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of columns in this row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parsed response of a hunting query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result columns in service order. May be empty.
    #[serde(rename = "Schema", default)]
    pub schema: Vec<Column>,
    /// Result rows.
    #[serde(rename = "Results", default)]
    pub results: Vec<Row>,
}

impl QueryResult {
    /// Creates a result from rows alone, with no schema.
    #[must_use]
    pub const fn from_rows(results: Vec<Row>) -> Self {
        Self {
            schema: Vec::new(),
            results,
        }
    }

    /// Returns the first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.results.first()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if the query returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the column names used to tabulate the rows.
    ///
    /// Uses the schema when present; otherwise the union of row keys in
    /// first-seen order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        if !self.schema.is_empty() {
            return self.schema.iter().map(|c| c.name.clone()).collect();
        }

        let mut names: Vec<String> = Vec::new();
        for row in &self.results {
            for column in row.columns() {
                if !names.iter().any(|n| n == column) {
                    names.push(column.to_string());
                }
            }
        }
        names
    }
}
