//! Core abstractions for the manka archive client.
//!
//! This crate provides the fundamental building blocks:
//! - `Envelope` - The `{code, msg, data}` wrapper every backend reply uses
//! - `check_response` - The single envelope check shared by every transport
//! - `HttpError` / `AppError` - Typed failure taxonomy
//! - `ClientConfig` / `RequestConfig` - Client and per-call configuration
//! - `HttpClient`, `Navigator` and `KeyValueStore` traits

pub mod config;
pub mod envelope;
pub mod error;
pub mod traits;

pub use config::{ClientConfig, RequestConfig, RuntimeTarget};
pub use envelope::{Envelope, RawResponse, check_response};
pub use error::{AppError, BoxError, HttpError, StorageError};
pub use traits::{HttpClient, HttpClientExt, KeyValueStore, Navigator};
