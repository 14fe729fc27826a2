//! Session state machine: uninitialized -> loading -> authenticated |
//! unauthenticated. The manager owns the durable copy of the session and a
//! watch channel the UI layer subscribes to; screens never talk to the auth
//! API directly.

use tokio::sync::watch;

use crate::{
    api::{
        types::{AuthResponse, LoginRequest, RegisterRequest, UserProfile},
        ApiClient,
    },
    storage::{SessionStore, TOKEN_KEY, USER_KEY},
};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub loading: bool,
}

impl SessionState {
    /// Authenticated iff both the token and the profile snapshot are present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    fn unauthenticated() -> Self {
        SessionState {
            user: None,
            token: None,
            loading: false,
        }
    }
}

#[derive(Debug, Clone)]
/// Result pair surfaced to the UI; login/register never fail any other way.
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

pub struct SessionManager<S: SessionStore> {
    api: ApiClient,
    store: S,
    state: watch::Sender<SessionState>,
}

impl<S: SessionStore> SessionManager<S> {
    /// Starts in the loading state; call [`restore`](Self::restore) to settle
    /// into authenticated or unauthenticated.
    pub fn new(api: ApiClient, store: S) -> Self {
        let (state, _) = watch::channel(SessionState {
            user: None,
            token: None,
            loading: true,
        });
        Self { api, store, state }
    }

    /// Reactive projection for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current in-memory session.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Startup restoration. With no persisted session this settles into
    /// unauthenticated without any network call; with one, the cached token
    /// is verified against the server and a rejection clears it. A network
    /// failure keeps the cached session: the device may simply be offline.
    pub async fn restore(&self) {
        self.state.send_modify(|state| state.loading = true);

        let (token, user) = match self.load_cached() {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                self.state.send_replace(SessionState::unauthenticated());
                return;
            }
            Err(err) => {
                log::error!("failed to load persisted session: {err}");
                self.clear_session();
                return;
            }
        };

        // Expose the cached identity while verification runs.
        self.state.send_replace(SessionState {
            user: Some(user),
            token: Some(token.clone()),
            loading: true,
        });

        match self.api.me(&token).await {
            Ok(response) => {
                if let Err(err) = self.persist_user(&response.user) {
                    log::warn!("failed to refresh cached profile: {err}");
                }
                self.state.send_replace(SessionState {
                    user: Some(response.user),
                    token: Some(token),
                    loading: false,
                });
            }
            Err(err) if err.is_auth_rejection() => {
                log::info!("persisted token rejected by server, dropping session");
                self.clear_session();
            }
            Err(err) => {
                log::warn!("session verification unreachable, keeping cached session: {err}");
                self.state.send_modify(|state| state.loading = false);
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        self.state.send_modify(|state| state.loading = true);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(response) => self.install_session(response),
            Err(err) => {
                self.state.send_modify(|state| state.loading = false);
                AuthOutcome {
                    success: false,
                    message: err.user_message(),
                }
            }
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        bio: Option<String>,
    ) -> AuthOutcome {
        self.state.send_modify(|state| state.loading = true);

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            bio,
        };
        match self.api.register(&request).await {
            Ok(response) => self.install_session(response),
            Err(err) => {
                self.state.send_modify(|state| state.loading = false);
                AuthOutcome {
                    success: false,
                    message: err.user_message(),
                }
            }
        }
    }

    /// Clears the persisted token and snapshot. Purely client-side: no
    /// revocation exists, so there is nothing to tell the server.
    pub fn logout(&self) {
        self.clear_session();
    }

    /// Re-verifies the current token and refreshes the cached profile.
    pub async fn refresh_user(&self) {
        let token = self.state.borrow().token.clone();
        let Some(token) = token else {
            return;
        };

        match self.api.me(&token).await {
            Ok(response) => {
                if let Err(err) = self.persist_user(&response.user) {
                    log::warn!("failed to refresh cached profile: {err}");
                }
                self.state
                    .send_modify(|state| state.user = Some(response.user));
            }
            Err(err) if err.is_auth_rejection() => {
                log::info!("token rejected during refresh, dropping session");
                self.clear_session();
            }
            Err(err) => {
                log::warn!("profile refresh failed: {err}");
            }
        }
    }

    fn load_cached(&self) -> anyhow::Result<Option<(String, UserProfile)>> {
        let token = self.store.get(TOKEN_KEY)?;
        let snapshot = self.store.get(USER_KEY)?;
        match (token, snapshot) {
            (Some(token), Some(snapshot)) => {
                let user: UserProfile = serde_json::from_str(&snapshot)?;
                Ok(Some((token, user)))
            }
            _ => Ok(None),
        }
    }

    fn install_session(&self, response: AuthResponse) -> AuthOutcome {
        if let Err(err) = self.persist_session(&response.token, &response.user) {
            // A session that cannot be persisted would silently vanish on
            // restart; degrade to unauthenticated and tell the caller.
            log::error!("failed to persist session: {err}");
            self.clear_session();
            return AuthOutcome {
                success: false,
                message: "Could not save the session on this device".to_string(),
            };
        }

        self.state.send_replace(SessionState {
            user: Some(response.user),
            token: Some(response.token),
            loading: false,
        });
        AuthOutcome {
            success: true,
            message: response.message,
        }
    }

    fn persist_session(&self, token: &str, user: &UserProfile) -> anyhow::Result<()> {
        let snapshot = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &snapshot)?;
        Ok(())
    }

    fn persist_user(&self, user: &UserProfile) -> anyhow::Result<()> {
        let snapshot = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &snapshot)?;
        Ok(())
    }

    fn clear_session(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.store.remove(key) {
                log::warn!("failed to clear {key}: {err}");
            }
        }
        self.state.send_replace(SessionState::unauthenticated());
    }
}
