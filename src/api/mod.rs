//! Remote data client for the scholarship API.
//!
//! Every call goes through [`ApiClient`], which reads the cached bearer token
//! from local storage right before the request and attaches it when present.
//! Resource-specific calls live in the submodules as inherent methods.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ApiCfg;
use crate::error::{error_message, ApiError};

pub mod applications;
pub mod payments;
pub mod reviews;
pub mod scholarships;
pub mod storage;
pub mod users;

pub use scholarships::{ScholarshipPage, ScholarshipQuery};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, ACCESS_TOKEN_KEY, SESSION_KEY};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, storage: Arc<dyn LocalStorage>) -> Result<Self, ApiError> {
        Self::with_http(reqwest::Client::new(), base_url, storage)
    }

    pub fn from_config(cfg: &ApiCfg, storage: Arc<dyn LocalStorage>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!("scholarstream/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_http(builder.build()?, &cfg.base_url, storage)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, storage: Arc<dyn LocalStorage>) -> Result<Self, ApiError> {
        // fail fast on a malformed base instead of on the first request
        url::Url::parse(base_url)?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), storage })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.storage
    }

    pub fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.storage.get(storage::ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn store_token(&self, token: &str) -> Result<(), ApiError> {
        self.storage.set(storage::ACCESS_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), ApiError> {
        self.storage.remove(storage::ACCESS_TOKEN_KEY)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut req = self.http.request(method, self.endpoint(path));
        match self.token() {
            Ok(Some(token)) => req = req.bearer_auth(token),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, %path, "token unreadable, sending request unauthenticated"),
        }
        Ok(req)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.request(Method::GET, path)?;
        self.send(req, Method::GET, path).await
    }

    pub(crate) async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::GET, path)?.query(query);
        self.send(req, Method::GET, path).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::POST, path)?.json(body);
        self.send(req, Method::POST, path).await
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::PATCH, path)?.json(body);
        self.send(req, Method::PATCH, path).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.request(Method::DELETE, path)?;
        self.send(req, Method::DELETE, path).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, method: Method, path: &str) -> Result<T, ApiError> {
        tracing::debug!(%method, %path, "api request");
        let response = req.send().await.map_err(|e| {
            tracing::error!(error = ?e, %method, %path, "api request failed to send");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::warn!(%status, %method, %path, %message, "api request rejected");
            return Err(ApiError::Status { status, message });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(error = ?e, %method, %path, "failed to decode api response");
            ApiError::Decode(e)
        })
    }
}

/// Percent-encodes a value used as a single path segment (ids, emails).
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
