//! In-process stand-in for the session and voice services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use voicesheet::engine::Engine;
use voicesheet::model::EngineConfig;

pub const WORKBOOK_BYTES: &[u8] = b"PK\x03\x04fake-workbook-bytes";

/// Scripted replies and request counters shared with the handlers.
#[derive(Default)]
pub struct MockState {
    pub starts: AtomicUsize,
    pub uploads: AtomicUsize,
    pub table_fetches: AtomicUsize,
    pub downloads: AtomicUsize,
    pub voice_texts: Mutex<Vec<String>>,
    pub uploaded: Mutex<Vec<u8>>,
    pub start_delay: Mutex<Duration>,
    pub start_error: Mutex<Option<String>>,
    pub upload_error: Mutex<Option<String>>,
    pub open_local_error: Mutex<Option<String>>,
    pub table: Mutex<Value>,
    /// `(status, body)` for `POST /voice/text`.
    pub text_reply: Mutex<(StatusCode, Value)>,
    /// `(status, body)` for `POST /voice/command`.
    pub voice_reply: Mutex<(StatusCode, Value)>,
}

impl MockState {
    pub fn set_text_reply(&self, status: StatusCode, body: Value) {
        *self.text_reply.lock().unwrap() = (status, body);
    }

    pub fn set_voice_reply(&self, status: StatusCode, body: Value) {
        *self.voice_reply.lock().unwrap() = (status, body);
    }

    pub fn set_table(&self, table: Value) {
        *self.table.lock().unwrap() = table;
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn table_fetches(&self) -> usize {
        self.table_fetches.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MockBackend {
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            session_url: self.base_url.clone(),
            request_timeout_secs: 5,
            ..EngineConfig::default()
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config()).expect("engine")
    }
}

pub fn server_table() -> Value {
    json!({
        "headers": ["Name", "DSA", "Web", "ML", "Attendance"],
        "rows": [
            ["Priya Sharma", 85, 82, 90, "95%"],
            ["Rahul Kumar", 85, 88, 82, "94%"]
        ]
    })
}

pub async fn spawn_mock() -> Result<MockBackend> {
    let state = Arc::new(MockState::default());
    state.set_table(server_table());
    state.set_text_reply(
        StatusCode::OK,
        json!({
            "parsed": { "action": "add", "name": "priya", "subject": "dsa", "value": 85 },
            "steps": { "executed": true },
            "message": "Updated Priya Sharma DSA to 85"
        }),
    );
    state.set_voice_reply(
        StatusCode::OK,
        json!({
            "transcript": "Mark Rahul present",
            "speaker": { "name": "Meera", "score": 0.873 },
            "parsed": { "action": "attendance", "name": "rahul", "value": "present" },
            "steps": { "executed": true },
            "message": "Rahul Kumar marked present"
        }),
    );

    let app = Router::new()
        .route("/api/session/start", post(start))
        .route("/api/session/upload", post(upload))
        .route("/api/session/table", get(table))
        .route("/api/session/download", get(download))
        .route("/api/session/open-local", get(open_local))
        .route("/api/voice/text", post(voice_text))
        .route("/api/voice/command", post(voice_command))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind mock listener")?;
    let addr = listener.local_addr().context("mock local addr")?;
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend {
        base_url: format!("http://{}/api", addr),
        state,
        task,
    })
}

type Params = Query<HashMap<String, String>>;

fn error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn missing_session(params: &HashMap<String, String>) -> Option<Response> {
    match params.get("sessionId") {
        Some(id) if !id.is_empty() => None,
        _ => Some(error(StatusCode::BAD_REQUEST, "Missing sessionId")),
    }
}

async fn start(State(state): State<Arc<MockState>>) -> Response {
    let n = state.starts.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = *state.start_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let start_error = state.start_error.lock().unwrap().clone();
    if let Some(msg) = start_error {
        return error(StatusCode::SERVICE_UNAVAILABLE, &msg);
    }
    Json(json!({ "sessionId": format!("sess-{}", n) })).into_response()
}

async fn upload(
    State(state): State<Arc<MockState>>,
    Query(params): Params,
    body: axum::body::Bytes,
) -> Response {
    if let Some(resp) = missing_session(&params) {
        return resp;
    }
    state.uploads.fetch_add(1, Ordering::SeqCst);
    *state.uploaded.lock().unwrap() = body.to_vec();
    if let Some(msg) = state.upload_error.lock().unwrap().clone() {
        return error(StatusCode::BAD_REQUEST, &msg);
    }
    Json(json!({ "success": true, "path": "/srv/sheets/current.xlsx" })).into_response()
}

async fn table(State(state): State<Arc<MockState>>, Query(params): Params) -> Response {
    if let Some(resp) = missing_session(&params) {
        return resp;
    }
    state.table_fetches.fetch_add(1, Ordering::SeqCst);
    Json(state.table.lock().unwrap().clone()).into_response()
}

async fn download(State(state): State<Arc<MockState>>, Query(params): Params) -> Response {
    if let Some(resp) = missing_session(&params) {
        return resp;
    }
    state.downloads.fetch_add(1, Ordering::SeqCst);
    (
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"excel-current.xlsx\"",
            ),
        ],
        axum::body::Bytes::from_static(WORKBOOK_BYTES),
    )
        .into_response()
}

async fn open_local(State(state): State<Arc<MockState>>, Query(params): Params) -> Response {
    if let Some(resp) = missing_session(&params) {
        return resp;
    }
    if let Some(msg) = state.open_local_error.lock().unwrap().clone() {
        return error(StatusCode::BAD_REQUEST, &msg);
    }
    Json(json!({ "success": true, "path": "C:/Users/meera/marks.xlsx" })).into_response()
}

async fn voice_text(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let text = body
        .get("text")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    state.voice_texts.lock().unwrap().push(text);
    let (status, body) = state.text_reply.lock().unwrap().clone();
    (status, Json(body)).into_response()
}

async fn voice_command(State(state): State<Arc<MockState>>) -> Response {
    let (status, body) = state.voice_reply.lock().unwrap().clone();
    (status, Json(body)).into_response()
}
