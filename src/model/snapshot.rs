use std::fmt;

use serde::{Deserialize, Serialize};

/// One table cell as the session service reports it: a string or a number.
///
/// Anything else on the wire (null, booleans, nested values) is folded into
/// text so a single odd cell never rejects a whole table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                write!(f, "{}", *n as i64)
            }
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<serde_json::Value> for Cell {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Cell::empty(),
            serde_json::Value::String(s) => Cell::Text(s),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Text(n.to_string()),
            },
            serde_json::Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Cell> for serde_json::Value {
    fn from(c: Cell) -> Self {
        match c {
            Cell::Text(s) => serde_json::Value::String(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serde_json::Value::from(n as i64)
            }
            Cell::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
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
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// Parsed on the client from a just-picked file; provisional.
    LocalPreview,
    /// Returned by the session service; authoritative.
    ServerConfirmed,
}

/// Wholesale representation of the displayed table. Never edited in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub origin: SnapshotOrigin,
}

impl TableSnapshot {
    pub fn new(headers: Vec<Cell>, rows: Vec<Vec<Cell>>, origin: SnapshotOrigin) -> Self {
        Self {
            headers,
            rows,
            origin,
        }
    }

    pub fn local_preview(headers: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self::new(headers, rows, SnapshotOrigin::LocalPreview)
    }

    pub fn server_confirmed(headers: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self::new(headers, rows, SnapshotOrigin::ServerConfirmed)
    }

    /// The class roster shown before any file has been picked.
    pub fn demo() -> Self {
        let headers = ["Name", "DSA", "Web", "ML", "Attendance"]
            .into_iter()
            .map(Cell::from)
            .collect();
        let rows = [
            ["Priya Sharma", "78", "82", "90", "95%"],
            ["Rahul Kumar", "85", "88", "82", "92%"],
            ["Ananya Singh", "92", "90", "88", "98%"],
            ["Arjun Patel", "76", "79", "84", "88%"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(Cell::from).collect())
        .collect();
        Self::local_preview(headers, rows)
    }

    pub fn is_server_confirmed(&self) -> bool {
        self.origin == SnapshotOrigin::ServerConfirmed
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.to_string()).collect()
    }

    /// Row `index` projected onto the header count: missing trailing cells
    /// come back empty and cells past the last header are dropped.
    pub fn render_row(&self, index: usize) -> Vec<String> {
        let row = self.rows.get(index).map(|r| r.as_slice()).unwrap_or(&[]);
        (0..self.width())
            .map(|col| row.get(col).map(|c| c.to_string()).unwrap_or_default())
            .collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Column index of the header matching `key` case-insensitively.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        let key = key.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_string().trim().to_lowercase() == key)
    }
}

#[cfg(test)]
#[path = "../tests/model/snapshot_tests.rs"]
mod tests;
