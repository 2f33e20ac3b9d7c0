// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Programmable mock of the entries backend.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Scripted replies and a record of every call.
pub struct MockState {
    pub creates: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<(String, String)>>,
    pub deletes: Mutex<Vec<String>>,
    pub reports: Mutex<Vec<String>>,
    pub lists: AtomicUsize,
    pub status_checks: AtomicUsize,
    pub entries: Mutex<Vec<Value>>,
    /// Status and body for create, update and delete
    pub submit_reply: Mutex<(u16, Value)>,
    pub report_reply: Mutex<Value>,
    pub status_reply: Mutex<Value>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            creates: Mutex::default(),
            updates: Mutex::default(),
            deletes: Mutex::default(),
            reports: Mutex::default(),
            lists: AtomicUsize::new(0),
            status_checks: AtomicUsize::new(0),
            entries: Mutex::default(),
            submit_reply: Mutex::new((201, json!({"success": true}))),
            report_reply: Mutex::new(json!({})),
            status_reply: Mutex::new(json!({})),
        }
    }
}

impl MockState {
    pub fn reply_with(&self, status: u16, body: Value) {
        *self.submit_reply.lock().unwrap() = (status, body);
    }

    pub fn report_reply_with(&self, body: Value) {
        *self.report_reply.lock().unwrap() = body;
    }

    pub fn status_reply_with(&self, body: Value) {
        *self.status_reply.lock().unwrap() = body;
    }

    pub fn creates(&self) -> Vec<String> {
        self.creates.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    fn scripted(&self) -> (StatusCode, Json<Value>) {
        let (status, body) = self.submit_reply.lock().unwrap().clone();
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            Json(body),
        )
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Base URL to configure the guard with.
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }
}

/// Start a mock backend on an ephemeral port.
pub async fn start_mock_backend() -> MockBackend {
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route("/api/v1/entries", get(list).post(create))
        .route("/api/v1/entries/report-attack", post(report_attack))
        .route("/api/v1/entries/cooldown/status", get(cooldown_status))
        .route("/api/v1/entries/:id", put(update).delete(delete))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, state }
}

/// Base URL of a port with nothing listening.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1", addr)
}

async fn list(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.lists.fetch_add(1, Ordering::SeqCst);
    let entries = state.entries.lock().unwrap().clone();
    Json(json!({"success": true, "data": entries}))
}

async fn create(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let content = body["contenido"].as_str().unwrap_or_default().to_string();
    state.creates.lock().unwrap().push(content.clone());

    let (status, reply) = state.scripted();
    if status.is_success() {
        let mut entries = state.entries.lock().unwrap();
        let id = (entries.len() + 1).to_string();
        entries.push(json!({
            "id": id,
            "contenido": content,
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
        }));
    }
    (status, reply)
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let content = body["contenido"].as_str().unwrap_or_default().to_string();
    state.updates.lock().unwrap().push((id, content));
    state.scripted()
}

async fn delete(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.deletes.lock().unwrap().push(id);
    state.scripted()
}

async fn report_attack(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let attack_type = body["attackType"].as_str().unwrap_or_default().to_string();
    state.reports.lock().unwrap().push(attack_type);
    Json(state.report_reply.lock().unwrap().clone())
}

async fn cooldown_status(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.status_checks.fetch_add(1, Ordering::SeqCst);
    Json(state.status_reply.lock().unwrap().clone())
}
