//! Platform REST client.
//!
//! Two API surfaces:
//! - **Auth admin** (`/auth/v1/admin/users`): identity upsert and lookup
//! - **REST** (`/rest/v1/{collection}`): document rows
//!
//! One call is one HTTP request. Retrying is the coordinator's decision.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use super::dto::{AdminUserBody, DocumentRow};
use super::settings::PlatformConfig;
use crate::application::contract::{transform_a_to_b, transform_b_to_a};
use crate::domain::{AuthIdentity, Backend, ContractError, Record, RecordKey, UserId};
use crate::error::{Result, StorageError};
use crate::port::outbound::storage::{IdentityDirectory, StorageBackend, WriteAck};

const MERGE_DUPLICATES: &str = "resolution=merge-duplicates";

/// HTTP client for the platform backend.
pub struct PlatformStore {
    http: HttpClient,
    base_url: String,
    service_key: Option<String>,
}

impl PlatformStore {
    /// Create a client with default HTTP settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>, service_key: Option<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: normalize(base_url.into()),
            service_key,
        }
    }

    /// Create a client whose every request is bounded by the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`](crate::error::Error::Http) if the HTTP client cannot be built.
    pub fn from_config(config: &PlatformConfig, service_key: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        if service_key.is_none() {
            warn!("Platform service key not set, requests will be anonymous");
        }

        Ok(Self {
            http,
            base_url: normalize(config.url.clone()),
            service_key,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn user_url(&self, id: &UserId) -> String {
        format!("{}/auth/v1/admin/users/{}", self.base_url, id)
    }

    /// Only plain table names reach the URL path.
    pub(crate) fn collection_url(&self, collection: &str) -> Result<String> {
        if !is_collection_name(collection) {
            return Err(ContractError::violation(
                "collection",
                format!("`{collection}` is not a plain table name"),
            )
            .into());
        }
        Ok(format!("{}/rest/v1/{}", self.base_url, collection))
    }

    pub(crate) fn health_url(&self) -> String {
        format!("{}/auth/v1/health", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.service_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_document(&self, collection: &str, id: uuid::Uuid) -> Result<Option<DocumentRow>> {
        let filter = format!("eq.{id}");
        let response = self
            .authorized(self.http.get(self.collection_url(collection)?))
            .query(&[("id", filter.as_str()), ("select", "*")])
            .send()
            .await?;
        let rows: Vec<DocumentRow> = ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

fn is_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn normalize(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Map a non-2xx response into a platform write error carrying the body.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Write {
        backend: Backend::Platform,
        reason: format!("HTTP {status}: {}", body.trim()),
    }
    .into())
}

#[async_trait]
impl StorageBackend for PlatformStore {
    fn backend(&self) -> Backend {
        Backend::Platform
    }

    async fn write(&self, record: &Record) -> Result<WriteAck> {
        let request = match record {
            Record::User(profile) => {
                let identity = transform_a_to_b(profile);
                self.http
                    .put(self.user_url(&profile.id))
                    .json(&AdminUserBody::from(&identity))
            }
            Record::Document(doc) => self
                .http
                .post(self.collection_url(&doc.collection)?)
                .header("Prefer", MERGE_DUPLICATES)
                .json(&DocumentRow::from(doc)),
        };
        let response = self.authorized(request).send().await?;
        ensure_success(response).await?;
        debug!(record_id = %record.id(), kind = record.kind(), "Platform write");
        Ok(WriteAck::new(1))
    }

    async fn read(&self, key: &RecordKey) -> Result<Option<Record>> {
        match key {
            RecordKey::User(id) => match self.fetch_identity(id).await? {
                Some(identity) => Ok(Some(Record::User(transform_b_to_a(&identity)?))),
                None => Ok(None),
            },
            RecordKey::Document { collection, id } => Ok(self
                .fetch_document(collection, *id)
                .await?
                .map(|row| Record::Document(row.into_document(collection.clone())))),
        }
    }

    async fn health_check(&self) -> bool {
        match self.authorized(self.http.get(self.health_url())).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "Platform health check failed");
                false
            }
        }
    }
}

#[async_trait]
impl IdentityDirectory for PlatformStore {
    async fn fetch_identity(&self, id: &UserId) -> Result<Option<AuthIdentity>> {
        let response = self
            .authorized(self.http.get(self.user_url(id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let identity = ensure_success(response).await?.json().await?;
        Ok(Some(identity))
    }
}
