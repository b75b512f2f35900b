//! HTTP client for the storefront REST API.
//!
//! Every request built here passes through the configured
//! [`RequestInterceptor`] exactly once before it is sent.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::interceptor::RequestInterceptor;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request path '{0}'")]
    InvalidPath(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    interceptor: Arc<dyn RequestInterceptor>,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient").field("base", &self.base.as_str()).finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(http: reqwest::Client, mut base: Url, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        // `Url::join` replaces the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            http,
            base,
            interceptor,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint path against the API base; a leading `/` is ignored.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidPath(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// Build, intercept, send. Non-2xx statuses become [`ApiError::Status`].
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|e| ApiError::Network(e.to_string()))?;
        let request = self.interceptor.intercept(request);

        let method = request.method().clone();
        let url = request.url().clone();
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "api response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.execute(self.request(Method::GET, path)?).await?;
        Self::json(resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(self.request(Method::POST, path)?.json(body)).await?;
        Self::json(resp).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(self.request(Method::PUT, path)?.json(body)).await?;
        Self::json(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}
