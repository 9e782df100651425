//! Session management for authentication

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use tokio::sync::OnceCell;

use crate::{AuthClient, AuthError, LoginCredentials, RegisterData, User};

/// Where the session is in its lifecycle.
///
/// `initialize()` is the only way out of `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Uninitialized,
    Checking,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the session as seen by views and route guards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    status: AuthStatus,
    user: Option<User>,
    busy: bool,
    error: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> Session {
        Session {
            user: self.user.clone(),
            authenticated: self.status == AuthStatus::Authenticated,
            loading: self.busy
                || matches!(self.status, AuthStatus::Uninitialized | AuthStatus::Checking),
            error: self.error.clone(),
        }
    }

    fn sign_out(&mut self) {
        self.status = AuthStatus::Unauthenticated;
        self.user = None;
    }
}

/// Holds the current user and the authenticated flag, persisting the token
/// through the auth client.
///
/// Clones share state. Initialization completes before any login or
/// registration starts; other overlapping calls are not coordinated and
/// whichever finishes last decides the state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    auth: AuthClient,
    state: Arc<RwLock<SessionState>>,
    initialized: Arc<OnceCell<()>>,
}

impl SessionStore {
    pub fn new(auth: AuthClient) -> Self {
        Self {
            auth,
            state: Arc::new(RwLock::new(SessionState {
                status: AuthStatus::Uninitialized,
                user: None,
                busy: false,
                error: None,
            })),
            initialized: Arc::new(OnceCell::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Current snapshot
    pub fn session(&self) -> Session {
        self.read().snapshot()
    }

    pub fn status(&self) -> AuthStatus {
        self.read().status
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Rehydrate the session from a persisted token.
    ///
    /// Runs once; callers arriving while the check is in flight wait for it,
    /// later calls return the current snapshot untouched. A token the server
    /// no longer accepts is discarded without surfacing an error.
    pub async fn initialize(&self) -> Session {
        if self.initialized.initialized() {
            debug!("Session already initialized");
        }
        self.initialized.get_or_init(|| self.restore()).await;
        self.session()
    }

    async fn restore(&self) {
        if !self.auth.is_authenticated() {
            debug!("No stored token, starting unauthenticated");
            self.write().sign_out();
            return;
        }

        self.write().status = AuthStatus::Checking;

        match self.auth.get_current_user().await {
            Ok(user) if self.auth.is_authenticated() => {
                info!("Restored session for user {}", user.id);
                let mut state = self.write();
                state.status = AuthStatus::Authenticated;
                state.user = Some(user);
            }
            Ok(_) => {
                debug!("Logged out while the stored token was being checked");
                self.write().sign_out();
            }
            Err(e) => {
                warn!("Stored token rejected, discarding it: {}", e);
                self.auth.logout();
                self.write().sign_out();
            }
        }
    }

    fn begin(&self) {
        let mut state = self.write();
        state.busy = true;
        state.error = None;
    }

    /// Log in and cache the current user.
    ///
    /// Failures are recorded in the session's `error` and never returned.
    pub async fn login(&self, identifier: &str, secret: &str) -> Session {
        self.initialize().await;
        self.begin();

        let credentials = LoginCredentials {
            username: identifier.to_string(),
            password: secret.to_string(),
        };

        if let Err(e) = self.auth.login(&credentials).await {
            warn!("Login failed: {}", e);
            let mut state = self.write();
            state.error = Some(AuthError::InvalidCredentials.to_string());
            state.busy = false;
            return state.snapshot();
        }

        match self.auth.get_current_user().await {
            Ok(user) => {
                info!("Logged in as user {}", user.id);
                let mut state = self.write();
                state.status = AuthStatus::Authenticated;
                state.user = Some(user);
                state.busy = false;
                state.snapshot()
            }
            Err(e) => {
                // a token without a user would leave the session half open
                warn!("Fetching the current user after login failed: {}", e);
                self.auth.logout();
                let mut state = self.write();
                state.sign_out();
                state.error = Some(AuthError::InvalidCredentials.to_string());
                state.busy = false;
                state.snapshot()
            }
        }
    }

    /// Register a new account without logging in.
    ///
    /// The failure message (server detail, or a generic one) is both stored
    /// in the session and returned for the calling form to show.
    pub async fn register(
        &self,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        self.initialize().await;
        self.begin();

        let data = RegisterData {
            email: email.to_string(),
            password: secret.to_string(),
            full_name: display_name.to_string(),
        };

        match self.auth.register(&data).await {
            Ok(user) => {
                self.write().busy = false;
                Ok(user)
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                let message = e
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| "Registration failed".to_string());
                let mut state = self.write();
                state.error = Some(message.clone());
                state.busy = false;
                Err(AuthError::Registration(message))
            }
        }
    }

    /// Forget the token and reset the session. No network call.
    pub fn logout(&self) {
        self.auth.logout();
        // an in-flight check keeps running; otherwise nothing is left to restore
        let _ = self.initialized.set(());

        let mut state = self.write();
        state.sign_out();
        state.busy = false;
        state.error = None;
        info!("Logged out");
    }
}
