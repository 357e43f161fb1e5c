//! Embedded-runtime transport.
//!
//! The host provides a fetch primitive with no cookie jar and no
//! interceptor facility, so headers are built by hand and the envelope
//! check runs inline in every call.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use manka_core::{
    BoxError, ClientConfig, Envelope, HttpClient, HttpError, RawResponse, RequestConfig,
    RuntimeTarget, config::join_url,
};
use manka_session::AuthSession;
use reqwest::{
    Method, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;

use crate::guard::settle;

/// Request handed to the host fetch primitive.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Request method.
    pub method: Method,
    /// Headers in order; later entries override earlier ones.
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: Option<Bytes>,
    /// Timeout for this call.
    pub timeout: Option<Duration>,
}

/// Fetch primitive provided by the embedding host.
#[async_trait]
pub trait HostFetch: Send + Sync {
    /// Perform the request. Connection failures are returned unchanged.
    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<RawResponse, BoxError>;
}

/// Host fetch backed by a cookie-less reqwest client.
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Build the fetch primitive from configuration.
    ///
    /// # Errors
    /// Returns error if the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(HttpError::transport)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HostFetch for ReqwestFetch {
    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<RawResponse, BoxError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let _ = headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let mut builder = self.client.request(request.method, url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        Ok(RawResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            response.bytes().await?,
        ))
    }
}

/// HTTP client for the embedded runtime.
pub struct EmbeddedHttpClient {
    fetch: Arc<dyn HostFetch>,
    base_url: String,
    session: Arc<AuthSession>,
}

impl EmbeddedHttpClient {
    pub(crate) fn new(
        fetch: Arc<dyn HostFetch>,
        base_url: impl Into<String>,
        session: Arc<AuthSession>,
    ) -> Self {
        Self {
            fetch,
            base_url: base_url.into(),
            session,
        }
    }

    fn url(&self, path: &str, config: &RequestConfig) -> Result<String, HttpError> {
        let url = join_url(&self.base_url, path);
        if config.query.is_empty() {
            return Ok(url);
        }
        let url = Url::parse_with_params(&url, &config.query).map_err(HttpError::transport)?;
        Ok(url.into())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        let url = self.url(path, &config)?;
        tracing::debug!(%method, %url, "[embedded] request");

        // The host runtime rejects requests carrying its own origin.
        let mut headers = vec![("Origin".to_string(), String::new())];
        let body = match body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(Bytes::from(serde_json::to_vec(&body).map_err(HttpError::Encode)?))
            }
            None if method == Method::POST => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                None
            }
            None => None,
        };
        headers.extend(config.headers);

        let request = FetchRequest {
            method,
            headers,
            body,
            timeout: config.timeout,
        };
        let raw = self
            .fetch
            .fetch(&url, request)
            .await
            .map_err(HttpError::Transport)?;
        settle(&raw, &self.session)
    }
}

#[async_trait]
impl HttpClient for EmbeddedHttpClient {
    fn target(&self) -> RuntimeTarget {
        RuntimeTarget::Embedded
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_value(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        self.send(Method::GET, path, None, config).await
    }

    async fn post_value(
        &self,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        self.send(Method::POST, path, body, config).await
    }
}
