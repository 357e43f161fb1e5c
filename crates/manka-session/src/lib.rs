//! Authentication state and local persistence for the manka archive client.
//!
//! Provides:
//! - `AuthSession` - Authenticated/anonymous state machine reacting to expired sessions
//! - Navigator implementations (log, closure, recording)
//! - Storage implementations (memory, JSON file)

pub mod auth;
pub mod navigator;
pub mod storage;

pub use auth::{AUTH_KEY, AuthSession, AuthState, AuthTransition, LOGIN_PATH};
pub use navigator::{FnNavigator, LogNavigator, RecordingNavigator};
