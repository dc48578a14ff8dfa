//! Stub generation service for integration tests.
//!
//! Serves `POST /api/generate` (records the multipart form, optionally
//! holds the response until released) and `GET /out/{*file}` for
//! downloads, on an ephemeral localhost port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Notify;

use thumbforge_client::{ForgeConfig, ThumbnailForge};
use thumbforge_core::types::{GenerationParams, Genre, ModelKind, PickedFile};

/// What the stub answers to a generation request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Self::status_json(StatusCode::OK, value)
    }

    pub fn status_json(status: StatusCode, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.to_string(),
        }
    }
}

/// One multipart request as the stub received it.
#[derive(Debug, Clone, Default)]
pub struct ReceivedForm {
    pub video: Vec<u8>,
    pub video_filename: Option<String>,
    pub video_content_type: Option<String>,
    pub fields: HashMap<String, String>,
}

impl ReceivedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone)]
struct StubState {
    reply: Arc<Reply>,
    files: Arc<HashMap<String, Vec<u8>>>,
    generate_hits: Arc<AtomicUsize>,
    download_hits: Arc<AtomicUsize>,
    forms: Arc<Mutex<Vec<ReceivedForm>>>,
    received: Arc<Notify>,
    release: Option<Arc<Notify>>,
}

/// Handle to a running stub service.
pub struct StubForge {
    pub base_url: String,
    state: StubState,
}

impl StubForge {
    pub fn config(&self) -> ForgeConfig {
        ForgeConfig::new(&self.base_url).unwrap()
    }

    /// Orchestrator pointed at this stub.
    pub fn forge(&self) -> ThumbnailForge {
        ThumbnailForge::with_client(test_client(), self.config())
    }

    pub fn generate_hits(&self) -> usize {
        self.state.generate_hits.load(Ordering::SeqCst)
    }

    pub fn download_hits(&self) -> usize {
        self.state.download_hits.load(Ordering::SeqCst)
    }

    pub fn forms(&self) -> Vec<ReceivedForm> {
        self.state.forms.lock().unwrap().clone()
    }

    /// Resolves once a generation request has been fully received.
    pub async fn wait_for_request(&self) {
        self.state.received.notified().await;
    }

    /// Let a held generation request answer.
    pub fn release(&self) {
        if let Some(release) = &self.state.release {
            release.notify_one();
        }
    }
}

/// Builder for [`StubForge`].
pub struct StubBuilder {
    reply: Reply,
    files: HashMap<String, Vec<u8>>,
    hold: bool,
}

impl StubBuilder {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            files: HashMap::new(),
            hold: false,
        }
    }

    /// Serve `bytes` at `/out/{name}`.
    pub fn file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.files.insert(name.to_string(), bytes.to_vec());
        self
    }

    /// Hold generation responses until [`StubForge::release`] is called.
    pub fn hold(mut self) -> Self {
        self.hold = true;
        self
    }

    pub async fn spawn(self) -> StubForge {
        let state = StubState {
            reply: Arc::new(self.reply),
            files: Arc::new(self.files),
            generate_hits: Arc::new(AtomicUsize::new(0)),
            download_hits: Arc::new(AtomicUsize::new(0)),
            forms: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Notify::new()),
            release: self.hold.then(|| Arc::new(Notify::new())),
        };

        let app = Router::new()
            .route("/api/generate", post(generate))
            .route("/out/{*file}", get(serve_file))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubForge {
            base_url: format!("http://{addr}"),
            state,
        }
    }
}

/// HTTP client that ignores proxy environment variables.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub async fn spawn_stub(reply: Reply) -> StubForge {
    StubBuilder::new(reply).spawn().await
}

/// Base URL of a port with nothing listening on it.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn generate(State(stub): State<StubState>, mut multipart: Multipart) -> Response {
    stub.generate_hits.fetch_add(1, Ordering::SeqCst);

    let mut form = ReceivedForm::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "video" {
            form.video_filename = field.file_name().map(str::to_string);
            form.video_content_type = field.content_type().map(str::to_string);
            form.video = field.bytes().await.unwrap().to_vec();
        } else {
            let value = field.text().await.unwrap();
            form.fields.insert(name, value);
        }
    }
    stub.forms.lock().unwrap().push(form);
    stub.received.notify_one();

    if let Some(release) = &stub.release {
        release.notified().await;
    }

    let reply = stub.reply.as_ref().clone();
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

async fn serve_file(State(stub): State<StubState>, Path(file): Path<String>) -> Response {
    stub.download_hits.fetch_add(1, Ordering::SeqCst);
    match stub.files.get(&file) {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/jpeg")],
            bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42fake-video";

pub fn clip() -> PickedFile {
    PickedFile::from_bytes("clip.mp4", "video/mp4", VIDEO_BYTES.to_vec())
}

pub fn drama_params() -> GenerationParams {
    GenerationParams::new("", Genre::Drama, ModelKind::Hybrid, 20)
}

pub fn one_thumbnail() -> serde_json::Value {
    serde_json::json!({"success": true, "thumbnails": [{"id": 1, "url": "/out/a.jpg"}]})
}
