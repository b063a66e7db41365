//! Shared data types: commands, table snapshots, rosters and engine configuration.

mod command;
mod config;
mod roster;
mod snapshot;

pub use self::command::{AttendanceMark, Command, Intent, Target};
pub use self::config::EngineConfig;
pub use self::roster::{Roster, RosterEntry, parse_percent};
pub use self::snapshot::{Cell, SnapshotOrigin, TableSnapshot};
