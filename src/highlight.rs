//! Transient cell highlights for just-applied changes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightMarker {
    pub row: usize,
    pub column: String,
    pub expires_at: Instant,
}

/// At most one marker per `(row, column)`; marking again pushes the expiry out.
#[derive(Debug)]
pub struct Highlights {
    duration: Duration,
    markers: HashMap<(usize, String), Instant>,
}

impl Highlights {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            markers: HashMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn mark(&mut self, row: usize, column: &str) {
        self.mark_at(row, column, Instant::now());
    }

    pub fn mark_at(&mut self, row: usize, column: &str, now: Instant) {
        self.markers
            .insert((row, column.to_lowercase()), now + self.duration);
    }

    pub fn is_active(&self, row: usize, column: &str, now: Instant) -> bool {
        self.markers
            .get(&(row, column.to_lowercase()))
            .is_some_and(|expires_at| now < *expires_at)
    }

    /// Drops expired markers; returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.markers.len();
        self.markers.retain(|_, expires_at| now < *expires_at);
        before - self.markers.len()
    }

    pub fn active(&self, now: Instant) -> Vec<HighlightMarker> {
        let mut out = self
            .markers
            .iter()
            .filter(|(_, expires_at)| now < **expires_at)
            .map(|((row, column), expires_at)| HighlightMarker {
                row: *row,
                column: column.clone(),
                expires_at: *expires_at,
            })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.row.cmp(&b.row).then_with(|| a.column.cmp(&b.column)));
        out
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
#[path = "tests/highlight_tests.rs"]
mod tests;
