//! Thin Firestore REST client.
//!
//! Talks to the Firestore v1 REST API over HTTPS with a bearer token, or to a
//! local emulator over plain HTTP. Exposes just enough surface for the memory
//! adapter: a collection reference, document get/set/delete, and paged
//! listing.
//!
//! The access token is wrapped in [`SecretString`] and only exposed when the
//! `Authorization` header is built.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use firemem_types::config::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, FirestoreSettings};
use reqwest::{Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};

use super::error::FirestoreError;
use super::wire::{Document, FieldValue, ListDocumentsResponse};

/// Production REST endpoint.
pub const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Environment variable naming a local emulator (`host:port`).
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Environment variable holding an OAuth2 access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const DEFAULT_DATABASE: &str = "(default)";

/// The emulator accepts this fixed token with full privileges.
const EMULATOR_TOKEN: &str = "owner";

/// How requests are authorized.
#[derive(Clone)]
pub enum Credentials {
    /// Emulator owner token.
    Emulator,
    /// OAuth2 bearer token.
    Bearer(SecretString),
}

impl Credentials {
    fn header_value(&self) -> String {
        match self {
            Self::Emulator => format!("Bearer {EMULATOR_TOKEN}"),
            Self::Bearer(token) => format!("Bearer {}", token.expose_secret()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emulator => f.write_str("Emulator"),
            Self::Bearer(_) => f.write_str("Bearer([REDACTED])"),
        }
    }
}

/// Client construction options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Option<String>,
    pub emulator_host: Option<String>,
    pub database: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            emulator_host: None,
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientOptions {
    /// Defaults plus whatever `FIRESTORE_EMULATOR_HOST` and
    /// `GOOGLE_OAUTH_ACCESS_TOKEN` provide.
    pub fn from_env() -> Self {
        let emulator_host = non_empty_env(EMULATOR_HOST_ENV);
        let credentials = non_empty_env(ACCESS_TOKEN_ENV)
            .map(|token| Credentials::Bearer(SecretString::from(token)));

        Self {
            emulator_host,
            credentials,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Endpoint and credentials after applying the emulator override.
    fn resolve(&self) -> Result<(String, Credentials), FirestoreError> {
        if let Some(host) = &self.emulator_host {
            let credentials = self.credentials.clone().unwrap_or(Credentials::Emulator);
            return Ok((format!("http://{host}/v1"), credentials));
        }

        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| FIRESTORE_ENDPOINT.to_string());
        let credentials = self.credentials.clone().ok_or_else(|| {
            FirestoreError::Connection(format!(
                "no credentials: set {ACCESS_TOKEN_ENV} or {EMULATOR_HOST_ENV}"
            ))
        })?;
        Ok((endpoint, credentials))
    }
}

impl From<&FirestoreSettings> for ClientOptions {
    /// Settings-file values layered over [`ClientOptions::from_env`].
    fn from(settings: &FirestoreSettings) -> Self {
        let mut options = Self::from_env()
            .with_database(settings.database.clone())
            .with_page_size(settings.page_size);

        if settings.timeout_secs > 0 {
            options.timeout = Duration::from_secs(settings.timeout_secs);
        }
        if let Some(endpoint) = settings.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            options.endpoint = Some(endpoint.to_string());
        }
        if let Some(host) = settings
            .emulator_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
        {
            options.emulator_host = Some(host.to_string());
        }
        options
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

struct ClientInner {
    http: reqwest::Client,
    /// `{endpoint}/projects/{p}/databases/{d}/documents`
    documents_root: Url,
    project: String,
    database: String,
    credentials: Credentials,
    page_size: u32,
}

/// Handle to one Firestore database. Cheap to clone.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<ClientInner>,
}

impl FirestoreClient {
    /// Build a client for `project`.
    ///
    /// No request is made; construction fails only on missing credentials,
    /// an unusable endpoint, or an HTTP client that cannot be built.
    pub fn new(project: &str, options: ClientOptions) -> Result<Self, FirestoreError> {
        let (endpoint, credentials) = options.resolve()?;

        let mut documents_root = Url::parse(&endpoint).map_err(|e| {
            FirestoreError::Connection(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        documents_root
            .path_segments_mut()
            .map_err(|_| FirestoreError::Connection(format!("invalid endpoint '{endpoint}'")))?
            .pop_if_empty()
            .extend(["projects", project, "databases", options.database.as_str(), "documents"]);

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| FirestoreError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                documents_root,
                project: project.to_string(),
                database: options.database,
                credentials,
                page_size: options.page_size.max(1),
            }),
        })
    }

    pub fn project(&self) -> &str {
        &self.inner.project
    }

    pub fn database(&self) -> &str {
        &self.inner.database
    }

    pub fn collection(&self, id: &str) -> CollectionRef {
        CollectionRef {
            client: self.clone(),
            id: id.to_string(),
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.documents_root.clone();
        // documents_root was checked to be a base URL in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header("Authorization", self.inner.credentials.header_value())
    }

    /// Send `request`, turning non-2xx responses into classified errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, FirestoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(FirestoreError::from_response(status.as_u16(), &body))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, FirestoreError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| FirestoreError::Decode(format!("{e}; body={body}")))
    }
}

/// Reference to one collection.
#[derive(Clone)]
pub struct CollectionRef {
    client: FirestoreClient,
    id: String,
}

impl CollectionRef {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    /// Page through every document in the collection.
    pub fn documents(&self) -> DocumentPages {
        DocumentPages {
            collection: self.clone(),
            page_size: self.client.inner.page_size,
            page_token: None,
            exhausted: false,
        }
    }
}

/// Write precondition for deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// Fail with `NOT_FOUND` unless the document exists.
    Exists,
}

/// Reference to one document.
#[derive(Clone)]
pub struct DocumentRef {
    collection: CollectionRef,
    id: String,
}

impl DocumentRef {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full resource name of the document.
    pub fn name(&self) -> String {
        let client = &self.collection.client;
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            client.project(),
            client.database(),
            self.collection.id,
            self.id
        )
    }

    fn url(&self) -> Url {
        self.collection
            .client
            .url(&[self.collection.id.as_str(), self.id.as_str()])
    }

    /// Replace the document with `fields`, creating it if needed.
    ///
    /// A PATCH without an update mask overwrites every field.
    pub async fn set(
        &self,
        fields: HashMap<String, FieldValue>,
    ) -> Result<Document, FirestoreError> {
        let client = &self.collection.client;
        let request = client
            .request(Method::PATCH, self.url())
            .json(&Document::with_fields(fields));
        let response = client.send(request).await?;
        FirestoreClient::decode(response).await
    }

    pub async fn get(&self) -> Result<Document, FirestoreError> {
        let client = &self.collection.client;
        let response = client.send(client.request(Method::GET, self.url())).await?;
        FirestoreClient::decode(response).await
    }

    pub async fn delete(&self, precondition: Precondition) -> Result<(), FirestoreError> {
        let client = &self.collection.client;
        let mut request = client.request(Method::DELETE, self.url());
        if precondition == Precondition::Exists {
            request = request.query(&[("currentDocument.exists", "true")]);
        }
        client.send(request).await?;
        Ok(())
    }
}

/// Server-side cursor over a collection's documents.
pub struct DocumentPages {
    collection: CollectionRef,
    page_size: u32,
    page_token: Option<String>,
    exhausted: bool,
}

impl DocumentPages {
    /// Fetch the next page. Returns `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Document>>, FirestoreError> {
        if self.exhausted {
            return Ok(None);
        }

        let client = &self.collection.client;
        let mut request = client
            .request(Method::GET, client.url(&[self.collection.id.as_str()]))
            .query(&[("pageSize", self.page_size.to_string())]);
        if let Some(token) = &self.page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = client.send(request).await?;
        let page: ListDocumentsResponse = FirestoreClient::decode(response).await?;

        self.page_token = page.next_page_token.filter(|token| !token.is_empty());
        self.exhausted = self.page_token.is_none();
        Ok(Some(page.documents))
    }
}
