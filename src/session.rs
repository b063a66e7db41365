//! Session lifecycle: owns the remote session id and decides which remote
//! operations are legal right now.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::io::AsyncWriteExt;

use crate::model::TableSnapshot;
use crate::remote::{RemoteClient, RemoteError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Starting,
    Active,
    Uploading,
    /// Active with a server-confirmed table loaded.
    Ready,
    /// Last upload failed in transit. The id is kept so the user can retry.
    Error,
}

impl LifecycleState {
    pub fn can_transition(self, to: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, to),
            (Idle, Starting)
                | (Starting, Active)
                | (Starting, Idle)
                | (Active | Ready | Error, Uploading)
                | (Uploading, Active)
                | (Uploading, Error)
                | (Active | Ready | Error, Ready)
        )
    }

    /// States in which the session has an id and is not busy uploading.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            LifecycleState::Active | LifecycleState::Ready | LifecycleState::Error
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Starting => "starting",
            LifecycleState::Active => "active",
            LifecycleState::Uploading => "uploading",
            LifecycleState::Ready => "ready",
            LifecycleState::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("cannot {op} while the session is {state}")]
    IllegalState {
        op: &'static str,
        state: LifecycleState,
    },

    #[error("no session has been started")]
    NoSession,

    #[error("{0}")]
    Io(String),
}

impl SessionError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SessionError::Remote(e) if e.is_unreachable())
    }
}

/// Result of a successful upload or open-local.
#[derive(Debug)]
pub struct Uploaded {
    /// Path the server stored or opened the file at, when it says.
    pub path: Option<String>,
    /// The follow-up table fetch. The upload itself succeeded either way.
    pub table: Result<TableSnapshot, SessionError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

type StartFuture = Shared<BoxFuture<'static, Result<String, SessionError>>>;

struct State {
    id: Option<String>,
    lifecycle: LifecycleState,
    /// In-flight start request shared by every concurrent `ensure_session` caller.
    starting: Option<(u64, StartFuture)>,
    start_gen: u64,
}

impl State {
    fn advance(&mut self, to: LifecycleState, op: &'static str) -> Result<(), SessionError> {
        if self.lifecycle == to && to == LifecycleState::Ready {
            return Ok(());
        }
        if !self.lifecycle.can_transition(to) {
            return Err(SessionError::IllegalState {
                op,
                state: self.lifecycle,
            });
        }
        tracing::debug!(from = %self.lifecycle, %to, op, "session transition");
        self.lifecycle = to;
        Ok(())
    }
}

pub struct Session {
    remote: RemoteClient,
    state: Mutex<State>,
}

impl Session {
    pub fn new(remote: RemoteClient) -> Self {
        Self {
            remote,
            state: Mutex::new(State {
                id: None,
                lifecycle: LifecycleState::Idle,
                starting: None,
                start_gen: 0,
            }),
        }
    }

    /// Resume a session started elsewhere (e.g. by an earlier CLI run).
    pub fn with_id(remote: RemoteClient, id: impl Into<String>) -> Self {
        let session = Self::new(remote);
        {
            let mut st = session.lock();
            st.id = Some(id.into());
            st.lifecycle = LifecycleState::Active;
        }
        session
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn id(&self) -> Option<String> {
        self.lock().id.clone()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lock().lifecycle
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn require_id(&self) -> Result<String, SessionError> {
        self.lock().id.clone().ok_or(SessionError::NoSession)
    }

    /// Returns the session id, starting a session first if there is none.
    /// Concurrent callers share a single `POST /session/start`.
    pub async fn ensure_session(&self) -> Result<String, SessionError> {
        let (generation, fut) = {
            let mut st = self.lock();
            if let Some(id) = &st.id {
                return Ok(id.clone());
            }
            match &st.starting {
                Some((generation, fut)) => (*generation, fut.clone()),
                None => {
                    st.advance(LifecycleState::Starting, "start a session")?;
                    st.start_gen += 1;
                    let generation = st.start_gen;
                    let remote = self.remote.clone();
                    let fut = async move { remote.start_session().await.map_err(SessionError::from) }
                        .boxed()
                        .shared();
                    st.starting = Some((generation, fut.clone()));
                    (generation, fut)
                }
            }
        };

        let out = fut.await;

        let mut st = self.lock();
        if st.starting.as_ref().is_some_and(|(g, _)| *g == generation) {
            st.starting = None;
            match &out {
                Ok(id) => {
                    tracing::info!(session_id = %id, "session started");
                    st.id = Some(id.clone());
                    st.advance(LifecycleState::Active, "start a session")?;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "session start failed");
                    st.advance(LifecycleState::Idle, "start a session")?;
                }
            }
        }
        out
    }

    /// Upload a file into the session and, on success, fetch the resulting table.
    pub async fn upload_file(&self, path: &Path) -> Result<Uploaded, SessionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SessionError::Io(format!("read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let id = self.ensure_session().await?;
        self.lock().advance(LifecycleState::Uploading, "upload")?;
        tracing::debug!(file = %file_name, size = bytes.len(), "uploading");

        let res = self.remote.upload(&id, &file_name, bytes).await;
        self.finish_load(res).await
    }

    /// Ask the server to open its own local copy of the sheet.
    pub async fn open_local_file(&self) -> Result<Uploaded, SessionError> {
        let id = self.ensure_session().await?;
        self.lock().advance(LifecycleState::Uploading, "open the local file")?;
        let res = self.remote.open_local(&id).await;
        self.finish_load(res).await
    }

    async fn finish_load(
        &self,
        res: Result<crate::remote::Ack, RemoteError>,
    ) -> Result<Uploaded, SessionError> {
        match res {
            Ok(ack) => {
                self.lock().advance(LifecycleState::Active, "upload")?;
                let table = self.fetch_table().await;
                Ok(Uploaded {
                    path: ack.path,
                    table,
                })
            }
            Err(err) => {
                let next = if err.is_unreachable() {
                    LifecycleState::Error
                } else {
                    LifecycleState::Active
                };
                self.lock().advance(next, "upload")?;
                Err(err.into())
            }
        }
    }

    /// Current server table. Moves the session to `Ready` on success.
    pub async fn fetch_table(&self) -> Result<TableSnapshot, SessionError> {
        let id = self.require_id()?;
        let table = self.remote.table(&id).await?;
        let mut st = self.lock();
        if st.lifecycle.is_settled() {
            st.advance(LifecycleState::Ready, "fetch the table")?;
        }
        Ok(table)
    }

    /// Stream the current workbook to `dest`. Lifecycle is left untouched.
    pub async fn download_snapshot(&self, dest: &Path) -> Result<Downloaded, SessionError> {
        let id = self.ensure_session().await?;
        let mut download = self.remote.download(&id).await?;

        let io_err = |e: std::io::Error| SessionError::Io(format!("write {}: {}", dest.display(), e));
        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut bytes = 0u64;
        while let Some(chunk) = download.chunk().await? {
            file.write_all(&chunk).await.map_err(io_err)?;
            bytes += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;

        tracing::info!(path = %dest.display(), bytes, "download written");
        Ok(Downloaded {
            path: dest.to_path_buf(),
            bytes,
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("Session")
            .field("id", &st.id)
            .field("lifecycle", &st.lifecycle)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
