//! Envelope check plus the authentication side effect.

use manka_core::{Envelope, HttpError, RawResponse, check_response};
use manka_session::AuthSession;
use serde_json::Value;

/// Run the envelope check and, on an authentication failure, expire the session.
///
/// The error is still returned after the side effect so callers never
/// proceed past a rejected call.
///
/// # Errors
/// Every error [`check_response`] produces.
pub fn settle(raw: &RawResponse, session: &AuthSession) -> Result<Envelope<Value>, HttpError> {
    let outcome = check_response(raw);
    if let Err(e) = &outcome {
        if e.is_unauthorized() {
            session.expire();
        }
    }
    outcome
}
