//! Process-lifetime bundle shared by the CLI and the shell.
//!
//! Everything the user sees (table, highlights, message log) lives in one
//! `View` behind a `std::sync::Mutex`. Locks are short and never held across
//! an `.await`; remote work goes through [`Session`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use anyhow::Result;

use crate::dispatch::DispatchPhase;
use crate::highlight::{HighlightMarker, Highlights};
use crate::messages::{LogEntry, MessageLog};
use crate::model::{EngineConfig, Roster, TableSnapshot};
use crate::preview;
use crate::reconcile::{Decision, FilePick, Reconciler};
use crate::remote::RemoteClient;
use crate::session::{Downloaded, LifecycleState, Session, SessionError, Uploaded};

pub const WELCOME: &str =
    "Welcome! Try commands like 'Add 85 for Priya in DSA' or 'Mark Rahul present'";

pub(crate) struct View {
    pub(crate) reconciler: Reconciler,
    pub(crate) highlights: Highlights,
    pub(crate) log: MessageLog,
    pub(crate) phase: DispatchPhase,
}

pub struct Engine {
    config: EngineConfig,
    session: Session,
    view: Mutex<View>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let remote = RemoteClient::new(&config)?;
        Ok(Self::with_session(config, Session::new(remote)))
    }

    /// Resume an existing remote session instead of starting a new one.
    pub fn resume(config: EngineConfig, session_id: &str) -> Result<Self> {
        let remote = RemoteClient::new(&config)?;
        Ok(Self::with_session(config, Session::with_id(remote, session_id)))
    }

    pub fn with_session(config: EngineConfig, session: Session) -> Self {
        let mut log = MessageLog::new();
        log.push_info(WELCOME);
        let view = View {
            reconciler: Reconciler::with_snapshot(TableSnapshot::demo()),
            highlights: Highlights::new(config.highlight_duration()),
            log,
            phase: DispatchPhase::Idle,
        };
        Self {
            config,
            session,
            view: Mutex::new(view),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> Option<String> {
        self.session.id()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.session.lifecycle()
    }

    pub(crate) fn view(&self) -> MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn phase(&self) -> DispatchPhase {
        self.view().phase
    }

    pub fn snapshot(&self) -> Option<TableSnapshot> {
        self.view().reconciler.current().cloned()
    }

    /// Roster of whatever is on screen; empty when nothing is.
    pub fn roster(&self) -> Roster {
        self.view()
            .reconciler
            .current()
            .map(Roster::from_snapshot)
            .unwrap_or_default()
    }

    pub fn log_len(&self) -> usize {
        self.view().log.len()
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.view().log.entries().to_vec()
    }

    pub fn log_since(&self, index: usize) -> Vec<LogEntry> {
        self.view().log.since(index).to_vec()
    }

    pub fn note(&self, text: impl Into<String>) {
        self.view().log.push_info(text);
    }

    pub fn note_error(&self, text: impl Into<String>) {
        self.view().log.push_error(text);
    }

    pub fn clear_log(&self) {
        self.view().log.clear();
    }

    pub fn active_highlights(&self, now: Instant) -> Vec<HighlightMarker> {
        self.view().highlights.active(now)
    }

    pub fn sweep_highlights(&self, now: Instant) -> usize {
        self.view().highlights.sweep(now)
    }

    pub fn is_highlighted(&self, row: usize, column: &str, now: Instant) -> bool {
        self.view().highlights.is_active(row, column, now)
    }

    pub(crate) fn log_error(&self, prefix: Option<&str>, err: &SessionError) {
        let text = match (prefix, err) {
            (Some(prefix), SessionError::Remote(e)) if !e.is_unreachable() => {
                format!("{}: {}", prefix, e)
            }
            _ => err.to_string(),
        };
        self.view().log.push_error(text);
    }

    /// Apply a freshly fetched server table.
    pub(crate) fn apply_table(&self, table: Result<TableSnapshot, SessionError>) -> bool {
        match table {
            Ok(snapshot) => {
                let rows = snapshot.rows.len();
                let decision = self.view().reconciler.apply_server(snapshot);
                tracing::debug!(rows, ?decision, "server table applied");
                decision == Decision::Replaced
            }
            Err(err) => {
                self.log_error(Some("Table refresh failed"), &err);
                false
            }
        }
    }

    pub async fn start(&self) -> Result<String, SessionError> {
        let had_id = self.session.id().is_some();
        match self.session.ensure_session().await {
            Ok(id) => {
                let text = if had_id {
                    format!("Session already active ({}).", id)
                } else {
                    format!("Session started ({}).", id)
                };
                self.view().log.push_success(text);
                Ok(id)
            }
            Err(err) => {
                self.log_error(Some("Failed to start session"), &err);
                Err(err)
            }
        }
    }

    /// Show a preview of `path` right away, then upload it and replace the
    /// preview with the server's table.
    pub async fn pick_file(&self, path: &Path) -> Result<Uploaded, SessionError> {
        let started = self.session.ensure_session().await;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.view().log.push_info(format!("Uploading {}...", name));

        let parsed = match tokio::fs::read(path).await {
            Ok(bytes) => preview::parse_preview(path, &bytes),
            Err(e) => Err(preview::PreviewError::Io(e.to_string())),
        };
        if let Err(err) = &parsed {
            tracing::debug!(file = %name, error = %err, "no local preview");
        }
        self.view()
            .reconciler
            .apply_file_preview(FilePick::new(), parsed);

        if let Err(err) = started {
            self.log_error(Some("Failed to start session"), &err);
            return Err(err);
        }

        match self.session.upload_file(path).await {
            Ok(uploaded) => {
                self.view()
                    .log
                    .push_success("File uploaded to the session.");
                self.apply_loaded(uploaded)
            }
            Err(err) => {
                self.log_error(Some("Upload failed"), &err);
                Err(err)
            }
        }
    }

    /// Let the server open its own copy of the sheet.
    pub async fn open_local(&self) -> Result<Uploaded, SessionError> {
        match self.session.open_local_file().await {
            Ok(uploaded) => {
                if let Some(path) = &uploaded.path {
                    self.view()
                        .log
                        .push_success(format!("Using local file: {}", path));
                }
                self.apply_loaded(uploaded)
            }
            Err(err) => {
                self.log_error(Some("Failed to open local file"), &err);
                Err(err)
            }
        }
    }

    fn apply_loaded(&self, uploaded: Uploaded) -> Result<Uploaded, SessionError> {
        let Uploaded { path, table } = uploaded;
        let table_ok = table.clone();
        self.apply_table(table);
        Ok(Uploaded {
            path,
            table: table_ok,
        })
    }

    pub async fn refresh(&self) -> Result<TableSnapshot, SessionError> {
        let table = self.session.fetch_table().await;
        let out = table.clone();
        if self.apply_table(table) {
            self.view().log.push_success("Table refreshed.");
        }
        out
    }

    /// Download the current workbook. `dest` defaults to a timestamped file in
    /// the working directory.
    pub async fn download(&self, dest: Option<PathBuf>) -> Result<Downloaded, SessionError> {
        let dest = dest.unwrap_or_else(|| PathBuf::from(default_download_name()));
        match self.session.download_snapshot(&dest).await {
            Ok(done) => {
                self.view().log.push_success(format!(
                    "Downloaded {} bytes to {}.",
                    done.bytes,
                    done.path.display()
                ));
                Ok(done)
            }
            Err(err) => {
                self.log_error(Some("Download failed"), &err);
                Err(err)
            }
        }
    }

    /// Back to the demo table; forgets any server confirmation and highlights.
    pub fn reset(&self) {
        let mut view = self.view();
        view.reconciler.reset(Some(TableSnapshot::demo()));
        view.highlights.clear();
        view.phase = DispatchPhase::Idle;
        view.log.push_info("Table reset to demo data.");
    }
}

/// `sheet-current-YYYY-MM-DD-HH-MM-SS.xlsx`, UTC.
pub fn default_download_name() -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]-[hour]-[minute]-[second]");
    let stamp = time::OffsetDateTime::now_utc()
        .format(fmt)
        .unwrap_or_else(|_| "now".to_string());
    format!("sheet-current-{}.xlsx", stamp)
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
