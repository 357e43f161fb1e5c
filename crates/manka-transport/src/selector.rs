//! Process-wide transport selection.
//!
//! The transport is chosen once from [`ClientConfig::target`] and shared by
//! every caller; call sites never branch on the runtime themselves.

use std::sync::{Arc, OnceLock};

use manka_core::{ClientConfig, HttpClient, HttpError, KeyValueStore, RuntimeTarget};
use manka_session::AuthSession;

use crate::{
    embedded::{EmbeddedHttpClient, HostFetch, ReqwestFetch},
    web::{ResponseInterceptor, WebHttpClient},
};

static CLIENT: OnceLock<Arc<dyn HttpClient>> = OnceLock::new();

/// Optional collaborators for the transport being built.
#[derive(Default)]
pub struct TransportOptions {
    /// Host fetch primitive for the embedded runtime. Defaults to [`ReqwestFetch`].
    pub fetch: Option<Arc<dyn HostFetch>>,
    /// Extra interceptors for the browser transport, run after the envelope check.
    pub interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    /// Where the browser transport keeps its cookies between runs.
    pub cookie_store: Option<Arc<dyn KeyValueStore>>,
}

/// Build the transport for `config.target`.
///
/// # Errors
/// Returns error if the underlying HTTP client cannot be built.
pub fn build_client(
    config: &ClientConfig,
    session: Arc<AuthSession>,
) -> Result<Arc<dyn HttpClient>, HttpError> {
    build_client_with(config, session, TransportOptions::default())
}

/// Build the transport with host-supplied collaborators.
///
/// Options that do not apply to the selected target are ignored.
///
/// # Errors
/// Returns error if the underlying HTTP client cannot be built.
pub fn build_client_with(
    config: &ClientConfig,
    session: Arc<AuthSession>,
    options: TransportOptions,
) -> Result<Arc<dyn HttpClient>, HttpError> {
    let client: Arc<dyn HttpClient> = match config.target {
        RuntimeTarget::Browser => {
            let client = WebHttpClient::new(config, session, options.cookie_store)?;
            let client = options
                .interceptors
                .into_iter()
                .fold(client, WebHttpClient::with_interceptor);
            Arc::new(client)
        }
        RuntimeTarget::Embedded => {
            let fetch: Arc<dyn HostFetch> = match options.fetch {
                Some(fetch) => fetch,
                None => Arc::new(ReqwestFetch::new(config)?),
            };
            Arc::new(EmbeddedHttpClient::new(fetch, config.base_url(), session))
        }
    };
    tracing::info!(runtime = %config.target, base_url = client.base_url(), "http client ready");
    Ok(client)
}

/// Install the shared handle. Only the first call builds a client; later
/// calls return the existing handle.
///
/// # Errors
/// Returns error if the first build fails.
pub fn install(
    config: &ClientConfig,
    session: Arc<AuthSession>,
) -> Result<Arc<dyn HttpClient>, HttpError> {
    install_with(config, session, TransportOptions::default())
}

/// [`install`] with host-supplied collaborators.
///
/// # Errors
/// Returns error if the first build fails.
pub fn install_with(
    config: &ClientConfig,
    session: Arc<AuthSession>,
    options: TransportOptions,
) -> Result<Arc<dyn HttpClient>, HttpError> {
    if let Some(existing) = CLIENT.get() {
        if existing.target() != config.target {
            tracing::warn!(
                installed = %existing.target(),
                requested = %config.target,
                "http client already installed; keeping the first selection"
            );
        }
        return Ok(Arc::clone(existing));
    }
    let client = build_client_with(config, session, options)?;
    Ok(Arc::clone(CLIENT.get_or_init(|| client)))
}

/// The shared handle.
///
/// # Errors
/// Returns `HttpError::NotInitialized` before [`install`] has succeeded.
pub fn http_client() -> Result<Arc<dyn HttpClient>, HttpError> {
    CLIENT.get().cloned().ok_or(HttpError::NotInitialized)
}
