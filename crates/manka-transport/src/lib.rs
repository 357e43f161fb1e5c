//! HTTP transports for the manka archive client.
//!
//! Provides:
//! - Browser transport (cookie-carrying client with a response interceptor chain)
//! - Embedded-runtime transport (host fetch primitive, explicit headers)
//! - Transport selector owning the process-wide client handle
//! - Typed backend API and wire types

pub mod api;
pub mod embedded;
pub mod guard;
pub mod protocol;
pub mod selector;
pub mod web;

pub use api::MankaApi;
pub use embedded::{EmbeddedHttpClient, FetchRequest, HostFetch, ReqwestFetch};
pub use guard::settle;
pub use selector::{
    TransportOptions, build_client, build_client_with, http_client, install, install_with,
};
pub use web::{
    COOKIE_KEY, EnvelopeInterceptor, InterceptedResponse, ResponseInterceptor, WebHttpClient,
};
