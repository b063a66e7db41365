use super::snapshot::{Cell, TableSnapshot};

const NAME_HEADERS: &[&str] = &["name", "student", "student name"];
const ATTENDANCE_HEADER: &str = "attendance";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub row: usize,
    pub attendance: Option<u32>,
}

/// Entities and scoring fields known to the local grammar, derived from the
/// displayed snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    fields: Vec<String>,
    attendance_field: Option<String>,
}

impl Roster {
    pub fn from_snapshot(snapshot: &TableSnapshot) -> Self {
        let keys = snapshot
            .headers
            .iter()
            .map(|h| h.to_string().trim().to_lowercase())
            .collect::<Vec<_>>();
        if keys.is_empty() {
            return Self::default();
        }

        let name_col = keys
            .iter()
            .position(|k| NAME_HEADERS.contains(&k.as_str()))
            .unwrap_or(0);
        let attendance_col = keys.iter().position(|k| k == ATTENDANCE_HEADER);

        let fields = keys
            .iter()
            .enumerate()
            .filter(|(i, k)| *i != name_col && Some(*i) != attendance_col && !k.is_empty())
            .map(|(_, k)| k.clone())
            .collect();

        let entries = snapshot
            .rows
            .iter()
            .enumerate()
            .filter_map(|(row, cells)| {
                let name = cells.get(name_col)?.to_string();
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let attendance = attendance_col
                    .and_then(|c| cells.get(c))
                    .and_then(parse_percent);
                Some(RosterEntry {
                    name: name.to_string(),
                    row,
                    attendance,
                })
            })
            .collect();

        Self {
            entries,
            fields,
            attendance_field: attendance_col.map(|c| keys[c].clone()),
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn attendance_field(&self) -> Option<&str> {
        self.attendance_field.as_deref()
    }

    /// First entry (roster order) whose name contains `token`, ignoring case.
    pub fn resolve_entity(&self, token: &str) -> Option<&RosterEntry> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase().contains(&token))
    }

    /// Scoring field equal to `token`, ignoring case.
    pub fn resolve_field(&self, token: &str) -> Option<&str> {
        let token = token.trim().to_lowercase();
        self.fields
            .iter()
            .find(|f| **f == token)
            .map(|f| f.as_str())
    }
}

/// Reads an attendance cell such as `"92%"`, `"92"` or `92` as a whole percentage.
pub fn parse_percent(cell: &Cell) -> Option<u32> {
    let n = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(0.0, u32::MAX as f64) as u32)
}

#[cfg(test)]
#[path = "../tests/model/roster_tests.rs"]
mod tests;
