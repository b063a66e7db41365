use serde::Serialize;

use super::roster::Roster;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Target {
    pub entity_name: String,
    /// Row of the entity in the snapshot the roster was built from.
    pub row: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMark {
    Present,
    Absent,
}

impl AttendanceMark {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "present" => Some(AttendanceMark::Present),
            "absent" => Some(AttendanceMark::Absent),
            _ => None,
        }
    }

    /// New attendance percentage: up by `step` capped at 100, or down by `step` floored at 0.
    pub fn apply(self, current: u32, step: u32) -> u32 {
        match self {
            AttendanceMark::Present => current.saturating_add(step).min(100),
            AttendanceMark::Absent => current.saturating_sub(step),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceMark::Present => "present",
            AttendanceMark::Absent => "absent",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    AddScore {
        target: Target,
        field: String,
        /// The matched integer, verbatim.
        value: String,
    },
    SetAttendance {
        target: Target,
        mark: AttendanceMark,
        /// Resulting percentage, when the current attendance is known.
        percent: Option<u32>,
    },
    Unrecognized,
}

/// One user submission and what the local grammar made of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Command {
    pub raw_text: String,
    #[serde(flatten)]
    pub intent: Intent,
}

impl Command {
    pub fn unrecognized(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            intent: Intent::Unrecognized,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.intent != Intent::Unrecognized
    }

    pub fn target(&self) -> Option<&Target> {
        match &self.intent {
            Intent::AddScore { target, .. } | Intent::SetAttendance { target, .. } => {
                Some(target)
            }
            Intent::Unrecognized => None,
        }
    }

    /// The `(row, column)` this command touches, keyed by field name.
    pub fn affected_cell(&self, roster: &Roster) -> Option<(usize, String)> {
        match &self.intent {
            Intent::AddScore { target, field, .. } => Some((target.row, field.clone())),
            Intent::SetAttendance { target, .. } => Some((
                target.row,
                roster.attendance_field().unwrap_or("attendance").to_string(),
            )),
            Intent::Unrecognized => None,
        }
    }

    pub fn summary(&self) -> String {
        match &self.intent {
            Intent::AddScore {
                target,
                field,
                value,
            } => format!(
                "{}'s {} marks -> {}",
                target.entity_name,
                field.to_uppercase(),
                value
            ),
            Intent::SetAttendance {
                target,
                mark,
                percent,
            } => match percent {
                Some(p) => format!(
                    "{} marked {}. Attendance: {}%",
                    target.entity_name,
                    mark.as_str(),
                    p
                ),
                None => format!("{} marked {}", target.entity_name, mark.as_str()),
            },
            Intent::Unrecognized => "unrecognized".to_string(),
        }
    }
}
