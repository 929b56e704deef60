use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::token::{AuthState, TokenInfo};

/// Status of a client that has not tried to authenticate yet
pub const STATUS_NEW: &str = "New";
/// Status after a successful login or token verification
pub const STATUS_READY: &str = "Token ready";
/// Status after a successful background renewal
pub const STATUS_RENEWED: &str = "token renewed";
/// Status after the background renewal has been stopped
pub const STATUS_RENEWAL_STOPPED: &str = "Renewal stopped";

struct State {
    token: TokenInfo,
    status: String,
    auth_state: AuthState,
    authenticated: bool,
}

/// The internal Container for the Token and the status of the client, which
/// can be read from multiple threads while the renewal updates it.
///
/// The TokenInfo is only ever replaced as a whole, so readers see either the
/// old or the new token but never a mix of both
pub(crate) struct TokenContainer {
    state: RwLock<State>,
}

impl TokenContainer {
    /// Used to obtain a new TokenContainer, optionally holding a static token
    /// that still has to be verified
    pub fn new(token_id: Option<String>) -> TokenContainer {
        let token = TokenInfo {
            id: token_id.unwrap_or_default(),
            ..Default::default()
        };

        TokenContainer {
            state: RwLock::new(State {
                token,
                status: STATUS_NEW.to_string(),
                auth_state: AuthState::Unauthenticated,
                authenticated: false,
            }),
        }
    }

    // The state is always replaced in one go, so a panic while holding the
    // lock can not leave it half written
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current Token itself
    pub fn token_id(&self) -> String {
        self.read().token.id.clone()
    }

    /// Returns a copy of the current TokenInfo
    pub fn token_info(&self) -> TokenInfo {
        self.read().token.clone()
    }

    /// Returns the seconds left on the current Token
    pub fn ttl(&self) -> u64 {
        self.read().token.ttl
    }

    pub fn status(&self) -> String {
        self.read().status.clone()
    }

    pub fn auth_state(&self) -> AuthState {
        self.read().auth_state
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().authenticated
    }

    /// Replaces the Token without touching the status, used while the login
    /// is still in progress
    pub fn set_token(&self, token: TokenInfo) {
        self.write().token = token;
    }

    /// Replaces the Token and marks the client as authenticated
    pub fn set_authenticated(&self, token: TokenInfo, status: &str) {
        let mut state = self.write();
        state.token = token;
        state.status = status.to_string();
        state.auth_state = AuthState::Authenticated;
        state.authenticated = true;
    }

    /// Updates the status, `authenticated` follows the given state
    pub fn set_status(&self, auth_state: AuthState, status: impl Into<String>) {
        let mut state = self.write();
        state.status = status.into();
        state.auth_state = auth_state;
        state.authenticated = auth_state == AuthState::Authenticated;
    }

    /// Updates only the status message
    pub fn set_status_message(&self, status: impl Into<String>) {
        self.write().status = status.into();
    }
}
