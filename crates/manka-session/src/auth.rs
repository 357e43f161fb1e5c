//! Authenticated/anonymous session state.
//!
//! `AuthSession` is the only mutable state shared by every transport call.
//! The flag lives in an atomic so reads are cheap and never block; the
//! key/value store only mirrors it so the state survives a restart.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use futures::{StreamExt, stream::BoxStream};
use manka_core::{KeyValueStore, Navigator};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Login entry point the session redirects to when it expires.
pub const LOGIN_PATH: &str = "/login";

/// Store key mirroring the authenticated flag.
pub const AUTH_KEY: &str = "isLogin";

const TRANSITION_CAPACITY: usize = 64;

/// Current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// A login succeeded and has not been revoked.
    Authenticated,
    /// No valid login.
    Anonymous,
}

/// Observable state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTransition {
    /// `anonymous -> authenticated` after a successful login.
    SignedIn,
    /// `authenticated -> anonymous` by explicit sign-out.
    SignedOut,
    /// The backend reported an expired session; a redirect to
    /// [`LOGIN_PATH`] was issued.
    Expired,
}

/// Session/auth middleware.
pub struct AuthSession {
    authenticated: AtomicBool,
    // Held across a flag change and its persist so the store never lags the flag.
    transition: Mutex<()>,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    sender: broadcast::Sender<AuthTransition>,
}

impl AuthSession {
    /// Create a session, restoring the flag from `store`.
    ///
    /// An unreadable store starts the session anonymous.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        let restored = match store.get(AUTH_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore session state");
                false
            }
        };
        let (sender, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            authenticated: AtomicBool::new(restored),
            transition: Mutex::new(()),
            store,
            navigator,
            sender,
        }
    }

    /// In-memory session that logs redirects instead of navigating.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(crate::storage::MemoryStore::new()),
            Arc::new(crate::navigator::LogNavigator),
        )
    }

    /// Whether a login is currently in effect. No I/O.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// Record a successful login.
    pub fn sign_in(&self) {
        let was = self.set_flag(true);
        if !was {
            tracing::info!("signed in");
            self.notify(AuthTransition::SignedIn);
        }
    }

    /// Drop the login on explicit user request.
    pub fn sign_out(&self) {
        let was = self.set_flag(false);
        if was {
            tracing::info!("signed out");
            self.notify(AuthTransition::SignedOut);
        }
    }

    /// React to an authentication-failure envelope.
    ///
    /// Always signs out and issues exactly one redirect to [`LOGIN_PATH`],
    /// whatever the previous state was.
    pub fn expire(&self) {
        self.set_flag(false);
        tracing::warn!(redirect = LOGIN_PATH, "session expired");
        self.notify(AuthTransition::Expired);
        self.navigator.redirect(LOGIN_PATH);
    }

    /// Receiver for future transitions.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthTransition> {
        self.sender.subscribe()
    }

    /// Stream of future transitions. Lagged entries are skipped.
    #[must_use]
    pub fn transitions(&self) -> BoxStream<'static, AuthTransition> {
        BroadcastStream::new(self.subscribe())
            .filter_map(|res| async move { res.ok() })
            .boxed()
    }

    fn notify(&self, transition: AuthTransition) {
        let _ = self.sender.send(transition); // no listeners is fine
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.transition.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap the flag and mirror it to the store as one step. Returns the
    /// previous value.
    fn set_flag(&self, authenticated: bool) -> bool {
        let _guard = self.lock();
        let was = self.authenticated.swap(authenticated, Ordering::SeqCst);
        self.persist(authenticated);
        was
    }

    fn persist(&self, authenticated: bool) {
        let result = if authenticated {
            self.store.set(AUTH_KEY, "true")
        } else {
            self.store.remove(AUTH_KEY)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, authenticated, "failed to persist session state");
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
