//! End-to-end tests for the Bazaar console.
//!
//! [`FakeServer`] is an in-memory REST collection service speaking the same
//! four verbs as the real one. Each test starts its own server on an
//! ephemeral port, so tests run in parallel without shared state.
//!
//! ```rust,ignore
//! let server = FakeServer::start().await?;
//! server.seed("categories", vec![json!({"id": 1, "name": "Shoes", "image": ""})]);
//!
//! let config = server.config();
//! // ...drive a console against `config`...
//! assert_eq!(server.requests(&Method::POST), 1);
//! ```
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use bazaar_console::ConsoleConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub use axum::http::{Method, StatusCode};

type Shared = Arc<Mutex<Store>>;

#[derive(Debug, Default)]
struct Store {
    collections: HashMap<String, Vec<Value>>,
    requests: HashMap<Method, usize>,
    failures: HashMap<Method, StatusCode>,
}

impl Store {
    /// Count the request and take any failure queued for its method.
    fn intercept(&mut self, method: Method) -> Option<StatusCode> {
        let failure = self.failures.remove(&method);
        *self.requests.entry(method).or_default() += 1;
        failure
    }

    fn collection(&mut self, name: &str) -> &mut Vec<Value> {
        self.collections.entry(name.to_owned()).or_default()
    }
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Text form of a record id; numeric and string ids compare equal.
fn id_text(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn next_id(records: &[Value]) -> i64 {
    records
        .iter()
        .filter_map(|r| id_text(r)?.parse::<i64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

fn failure(status: StatusCode) -> Response {
    (status, "injected failure").into_response()
}

async fn list(State(store): State<Shared>, Path(collection): Path<String>) -> Response {
    let mut store = lock(&store);
    if let Some(status) = store.intercept(Method::GET) {
        return failure(status);
    }
    Json(store.collection(&collection).clone()).into_response()
}

async fn create(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut store = lock(&store);
    if let Some(status) = store.intercept(Method::POST) {
        return failure(status);
    }
    let records = store.collection(&collection);
    let Some(fields) = body.as_object_mut() else {
        return (StatusCode::BAD_REQUEST, "expected a JSON object").into_response();
    };
    fields.insert("id".to_owned(), json!(next_id(records)));
    records.push(body.clone());
    tracing::debug!(%collection, "Created record");
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut store = lock(&store);
    if let Some(status) = store.intercept(Method::PUT) {
        return failure(status);
    }
    let records = store.collection(&collection);
    let Some(stored) = records
        .iter_mut()
        .find(|r| id_text(r).as_deref() == Some(id.as_str()))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let (Some(fields), Some(original)) = (body.as_object_mut(), stored.get("id")) {
        fields.insert("id".to_owned(), original.clone());
    }
    stored.clone_from(&body);
    Json(body).into_response()
}

async fn remove(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let mut store = lock(&store);
    if let Some(status) = store.intercept(Method::DELETE) {
        return failure(status);
    }
    let records = store.collection(&collection);
    let before = records.len();
    records.retain(|r| id_text(r).as_deref() != Some(id.as_str()));
    if records.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({})).into_response()
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/{collection}", get(list).post(create))
        .route("/{collection}/{id}", put(update).delete(remove))
        .with_state(store)
}

/// In-memory collection server bound to `127.0.0.1` on an ephemeral port.
///
/// The server stops when this handle is dropped.
pub struct FakeServer {
    url: Url,
    store: Shared,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for FakeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeServer")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl FakeServer {
    /// Bind a listener and start serving in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let store = Shared::default();
        let app = router(Arc::clone(&store));
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake collection server stopped");
            }
        });

        Ok(Self { url, store, task })
    }

    /// Origin the server answers on.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Console configuration serving every collection from this server.
    ///
    /// Redirects are shortened so tests can wait them out.
    #[must_use]
    pub fn config(&self) -> ConsoleConfig {
        let mut config = ConsoleConfig::local(self.url.clone(), self.url.clone());
        config.redirect_delay = Duration::from_millis(5);
        config
    }

    /// Replace a collection's contents.
    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        *lock(&self.store).collection(collection) = records;
    }

    /// Answer the next request with `method` using `status` instead.
    pub fn fail_next(&self, method: Method, status: StatusCode) {
        lock(&self.store).failures.insert(method, status);
    }

    /// Number of requests received with `method`, failed ones included.
    #[must_use]
    pub fn requests(&self, method: &Method) -> usize {
        lock(&self.store).requests.get(method).copied().unwrap_or(0)
    }

    /// Current contents of a collection.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Value> {
        lock(&self.store).collection(collection).clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
