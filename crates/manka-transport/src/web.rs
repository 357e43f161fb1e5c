//! Browser transport.
//!
//! Cookies are kept by the client's own jar and forwarded on every call.
//! When a cookie store is supplied the jar is restored from it on startup
//! and written back after every response, so a login outlives the process.
//! Every response passes through a central interceptor chain whose first
//! member is always the envelope check.

use std::sync::Arc;

use async_trait::async_trait;
use manka_core::{
    ClientConfig, Envelope, HttpClient, HttpError, KeyValueStore, RawResponse, RequestConfig,
    RuntimeTarget, config::join_url,
};
use manka_session::AuthSession;
use reqwest::{
    Method, Url,
    cookie::{CookieStore, Jar},
};
use serde_json::Value;

use crate::guard::settle;

/// Response flowing through the interceptor chain.
#[derive(Debug)]
pub struct InterceptedResponse {
    /// Request method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Response as received.
    pub raw: RawResponse,
    /// Checked envelope, filled in by [`EnvelopeInterceptor`].
    pub envelope: Option<Envelope<Value>>,
}

/// Hook applied to every response the browser transport receives.
pub trait ResponseInterceptor: Send + Sync {
    /// Inspect or transform a response. Returning an error rejects the call.
    fn intercept(&self, response: InterceptedResponse) -> Result<InterceptedResponse, HttpError>;
}

/// Interceptor running the envelope check and the expiry side effect.
pub struct EnvelopeInterceptor {
    session: Arc<AuthSession>,
}

impl EnvelopeInterceptor {
    /// Create the interceptor for `session`.
    #[must_use]
    pub const fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }
}

impl ResponseInterceptor for EnvelopeInterceptor {
    fn intercept(
        &self,
        mut response: InterceptedResponse,
    ) -> Result<InterceptedResponse, HttpError> {
        response.envelope = Some(settle(&response.raw, &self.session)?);
        Ok(response)
    }
}

/// Store key the cookie header for the base URL is saved under.
pub const COOKIE_KEY: &str = "cookies";

/// Cookie jar mirrored to a key/value store.
struct SavedCookies {
    jar: Arc<Jar>,
    store: Arc<dyn KeyValueStore>,
    base: Url,
}

impl SavedCookies {
    fn restore(&self) {
        let header = match self.store.get(COOKIE_KEY) {
            Ok(Some(header)) => header,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore cookies");
                return;
            }
        };
        let mut restored = 0_usize;
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(&format!("{pair}; Path=/"), &self.base);
            restored += 1;
        }
        tracing::debug!(restored, "restored cookies");
    }

    fn save(&self) {
        let header = self
            .jar
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_string));
        let result = match header {
            Some(header) => self.store.set(COOKIE_KEY, &header),
            None => self.store.remove(COOKIE_KEY),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to save cookies");
        }
    }
}

/// Cookie-carrying HTTP client bound to a fixed base URL.
pub struct WebHttpClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<AuthSession>,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    saved: Option<SavedCookies>,
}

impl WebHttpClient {
    /// Build the client from configuration.
    ///
    /// With `cookie_store`, cookies are restored from and saved to it.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the underlying client
    /// cannot be built.
    pub(crate) fn new(
        config: &ClientConfig,
        session: Arc<AuthSession>,
        cookie_store: Option<Arc<dyn KeyValueStore>>,
    ) -> Result<Self, HttpError> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(HttpError::transport)?;

        let base_url = config.base_url();
        let saved = match cookie_store {
            Some(store) => {
                let base = Url::parse(&base_url).map_err(HttpError::transport)?;
                let saved = SavedCookies { jar, store, base };
                saved.restore();
                Some(saved)
            }
            None => None,
        };

        let envelope: Arc<dyn ResponseInterceptor> =
            Arc::new(EnvelopeInterceptor::new(Arc::clone(&session)));
        Ok(Self {
            client,
            base_url,
            session,
            interceptors: vec![envelope],
            saved,
        })
    }

    /// Append an interceptor after the ones already registered.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Issue any request through the interceptor chain.
    ///
    /// # Errors
    /// Network failures from the client, and every envelope failure.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%method, %url, "[web] request");

        let mut builder = self.client.request(method.clone(), &url);
        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(HttpError::transport)?;
        if let Some(saved) = &self.saved {
            saved.save();
        }
        let status = response.status();
        let raw = RawResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            response.bytes().await.map_err(HttpError::transport)?,
        );

        let mut intercepted = InterceptedResponse {
            method,
            url,
            raw,
            envelope: None,
        };
        for interceptor in &self.interceptors {
            intercepted = interceptor.intercept(intercepted)?;
        }

        match intercepted.envelope {
            Some(envelope) => Ok(envelope),
            None => settle(&intercepted.raw, &self.session),
        }
    }
}

#[async_trait]
impl HttpClient for WebHttpClient {
    fn target(&self) -> RuntimeTarget {
        RuntimeTarget::Browser
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_value(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        self.request(Method::GET, path, None, config).await
    }

    async fn post_value(
        &self,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError> {
        self.request(Method::POST, path, body, config).await
    }
}
