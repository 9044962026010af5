//! Integration test common infrastructure.
//!
//! Spawns the roster app on an ephemeral port, plus a stub Projects service
//! that records the notifications it receives.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, post},
    Router,
};
use roster::{config::Config, server::create_app};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A running roster server
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Spawn with notifications sent to `projects_url` (or disabled when `None`)
    pub async fn spawn(projects_url: Option<String>) -> Self {
        let config = Config::ephemeral(projects_url);
        let app = create_app(&config).await.expect("Failed to build app");
        let addr = serve(app).await;

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.expect("POST failed")
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE failed")
    }

    /// Create a collaborator and return its id
    pub async fn create(&self, body: &Value) -> i64 {
        let response = self.post_json("/collaborators", body).await;
        assert_eq!(response.status(), 201, "create failed for {}", body);
        let created: Value = response.json().await.expect("invalid JSON");
        created["id"].as_i64().expect("missing id")
    }
}

/// A call received by the stub Projects service
#[derive(Debug, Clone, PartialEq)]
pub enum StubCall {
    AddMember { project_id: i64, body: Value },
    RemoveMember { project_id: i64, collaborator_id: i64 },
}

#[derive(Clone)]
struct StubState {
    calls: Arc<Mutex<Vec<StubCall>>>,
    status: Arc<AtomicU16>,
}

/// Stub Projects service answering every call with a configurable status
pub struct StubProjects {
    pub base_url: String,
    state: StubState,
}

impl StubProjects {
    pub async fn spawn() -> Self {
        let state = StubState {
            calls: Arc::new(Mutex::new(Vec::new())),
            status: Arc::new(AtomicU16::new(201)),
        };

        let app = Router::new()
            .route("/projects/{project_id}/members", post(add_member))
            .route(
                "/projects/{project_id}/members/{collaborator_id}",
                delete(remove_member),
            )
            .with_state(state.clone());
        let addr = serve(app).await;

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn respond_with(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.state.calls.lock().expect("poisoned").clone()
    }
}

async fn add_member(
    State(state): State<StubState>,
    Path(project_id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    state
        .calls
        .lock()
        .expect("poisoned")
        .push(StubCall::AddMember { project_id, body });
    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK)
}

async fn remove_member(
    State(state): State<StubState>,
    Path((project_id, collaborator_id)): Path<(i64, i64)>,
) -> StatusCode {
    state.calls.lock().expect("poisoned").push(StubCall::RemoveMember {
        project_id,
        collaborator_id,
    });
    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK)
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });
    addr
}

/// An address nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to get addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
