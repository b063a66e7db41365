//! Decides which table snapshot is on screen.
//!
//! Server-confirmed snapshots always win. A local preview is only shown when it
//! comes from an explicit file pick (or a reset), so a stale preview can never
//! silently replace what the server last confirmed.

use crate::model::{SnapshotOrigin, TableSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Replaced,
    Kept,
}

/// Proof that a preview comes from a file the user just picked.
#[derive(Debug)]
pub struct FilePick {
    _private: (),
}

impl FilePick {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for FilePick {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    current: Option<TableSnapshot>,
    server_confirmed_seen: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: TableSnapshot) -> Self {
        let mut out = Self::new();
        out.replace(snapshot);
        out
    }

    pub fn current(&self) -> Option<&TableSnapshot> {
        self.current.as_ref()
    }

    pub fn server_confirmed_seen(&self) -> bool {
        self.server_confirmed_seen
    }

    /// Any server-confirmed snapshot replaces what is displayed.
    pub fn apply_server(&mut self, snapshot: TableSnapshot) -> Decision {
        self.replace(TableSnapshot {
            origin: SnapshotOrigin::ServerConfirmed,
            ..snapshot
        });
        Decision::Replaced
    }

    /// Result of parsing a just-picked file. A failed parse keeps the current
    /// snapshot; the caller goes on with the upload either way.
    pub fn apply_file_preview<E>(
        &mut self,
        _pick: FilePick,
        parsed: Result<TableSnapshot, E>,
    ) -> Decision {
        match parsed {
            Ok(snapshot) => {
                self.replace(TableSnapshot {
                    origin: SnapshotOrigin::LocalPreview,
                    ..snapshot
                });
                Decision::Replaced
            }
            Err(_) => Decision::Kept,
        }
    }

    /// A local snapshot that did not come from a file pick. Refused once the
    /// server has confirmed a table.
    pub fn offer_local(&mut self, snapshot: TableSnapshot) -> Decision {
        if self.server_confirmed_seen {
            return Decision::Kept;
        }
        self.replace(TableSnapshot {
            origin: SnapshotOrigin::LocalPreview,
            ..snapshot
        });
        Decision::Replaced
    }

    /// Explicit reset: forget server confirmation and show `snapshot`.
    pub fn reset(&mut self, snapshot: Option<TableSnapshot>) {
        self.server_confirmed_seen = false;
        self.current = snapshot;
    }

    fn replace(&mut self, snapshot: TableSnapshot) {
        if snapshot.origin == SnapshotOrigin::ServerConfirmed {
            self.server_confirmed_seen = true;
        }
        self.current = Some(snapshot);
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
