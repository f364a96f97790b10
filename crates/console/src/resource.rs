//! REST collection client.
//!
//! Every collection speaks the same four verbs:
//!
//! | Operation | Method | Path | Body |
//! |---|---|---|---|
//! | list   | GET    | `/<collection>`      | - |
//! | create | POST   | `/<collection>`      | fields without id |
//! | update | PUT    | `/<collection>/{id}` | full record |
//! | remove | DELETE | `/<collection>/{id}` | - |
//!
//! Any non-2xx status is returned as an error; nothing is swallowed here.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{EntityFields, Record};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::ConsoleConfig;
use crate::error::ResourceError;

/// The four operations of a REST collection.
///
/// [`ResourceClient`] is the HTTP implementation; the controllers are
/// generic over this trait so they can run against any backing store.
pub trait Collection<F: EntityFields>: Send + Sync {
    /// Fetch the whole collection in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<Record<F>>, ResourceError>> + Send;

    /// Create a record; the server assigns the id.
    fn create(&self, fields: &F) -> impl Future<Output = Result<Record<F>, ResourceError>> + Send;

    /// Replace the record stored under `id`.
    fn update(
        &self,
        id: &F::Id,
        fields: &F,
    ) -> impl Future<Output = Result<Record<F>, ResourceError>> + Send;

    /// Delete the record stored under `id`.
    fn remove(&self, id: &F::Id) -> impl Future<Output = Result<(), ResourceError>> + Send;
}

/// HTTP client shared by every collection client.
pub type HttpClient = reqwest::Client;

/// Build the shared HTTP client from configuration.
///
/// # Errors
///
/// Returns an error if the token is not a valid header value or the client
/// fails to build.
pub fn http_client(config: &ConsoleConfig) -> Result<HttpClient, ResourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = &config.api_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| ResourceError::InvalidUrl(format!("Invalid API token format: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.connect_timeout(Duration::from_secs(10)).build()?)
}

/// HTTP client for one REST collection.
pub struct ResourceClient<F> {
    inner: Arc<ResourceClientInner>,
    _fields: PhantomData<fn() -> F>,
}

struct ResourceClientInner {
    client: reqwest::Client,
    collection_url: Url,
}

impl<F> Clone for ResourceClient<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _fields: PhantomData,
        }
    }
}

impl<F> std::fmt::Debug for ResourceClient<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("collection_url", &self.inner.collection_url.as_str())
            .finish_non_exhaustive()
    }
}

/// PUT body: the id plus every field, borrowed rather than cloned.
#[derive(Serialize)]
#[serde(bound = "")]
struct FullRecord<'a, F: EntityFields> {
    id: &'a F::Id,
    #[serde(flatten)]
    fields: &'a F,
}

impl<F: EntityFields> ResourceClient<F> {
    /// Create a client for `F`'s collection under `origin`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidUrl` if `origin` cannot hold a path.
    pub fn new(client: reqwest::Client, origin: &Url) -> Result<Self, ResourceError> {
        let mut base = origin.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let collection_url = base
            .join(F::COLLECTION)
            .map_err(|e| ResourceError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ResourceClientInner {
                client,
                collection_url,
            }),
            _fields: PhantomData,
        })
    }

    /// Create a client using the origin configured for `F`'s collection.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidUrl` if the origin cannot hold a path.
    pub fn from_config(client: reqwest::Client, config: &ConsoleConfig) -> Result<Self, ResourceError> {
        Self::new(client, config.origin_for(F::COLLECTION))
    }

    /// Collection URL (`<origin>/<collection>`).
    #[must_use]
    pub fn collection_url(&self) -> &Url {
        &self.inner.collection_url
    }

    fn record_url(&self, id: &F::Id) -> Result<Url, ResourceError> {
        let mut url = self.inner.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| ResourceError::InvalidUrl(self.inner.collection_url.to_string()))?
            .push(&id.to_string());
        Ok(url)
    }

    /// Decode a success body, or turn the status into an error.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ResourceError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                ResourceError::Decode(format!("Failed to parse {} response: {e}", F::COLLECTION))
            });
        }

        Err(Self::parse_error(response).await)
    }

    /// Map a non-success response to an error.
    async fn parse_error(response: reqwest::Response) -> ResourceError {
        let status = response.status().as_u16();
        let url = response.url().path().to_owned();

        if status == 404 {
            return ResourceError::NotFound(url);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_owned());

        ResourceError::Status { status, message }
    }
}

impl<F: EntityFields> Collection<F> for ResourceClient<F> {
    #[instrument(skip(self), fields(collection = F::COLLECTION))]
    async fn list(&self) -> Result<Vec<Record<F>>, ResourceError> {
        let response = self
            .inner
            .client
            .get(self.inner.collection_url.clone())
            .send()
            .await?;
        let records: Vec<Record<F>> = Self::handle_response(response).await?;
        tracing::debug!(count = records.len(), "Fetched collection");
        Ok(records)
    }

    #[instrument(skip(self, fields), fields(collection = F::COLLECTION))]
    async fn create(&self, fields: &F) -> Result<Record<F>, ResourceError> {
        let response = self
            .inner
            .client
            .post(self.inner.collection_url.clone())
            .json(fields)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, fields), fields(collection = F::COLLECTION, id = %id))]
    async fn update(&self, id: &F::Id, fields: &F) -> Result<Record<F>, ResourceError> {
        let url = self.record_url(id)?;
        let response = self
            .inner
            .client
            .put(url)
            .json(&FullRecord::<F> { id, fields })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self), fields(collection = F::COLLECTION, id = %id))]
    async fn remove(&self, id: &F::Id) -> Result<(), ResourceError> {
        let url = self.record_url(id)?;
        let response = self.inner.client.delete(url).send().await?;

        // Body is ignored: servers answer 200 with `{}` or 204 with nothing.
        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }
}
