//! Who is logged in, with what token.
//!
//! The token and profile are mirrored into the local store under
//! `adminToken` / `adminUser` so a session survives restarts.

mod auth;

pub use auth::AdminAuth;

use parking_lot::RwLock;
use tracing::debug;

use crate::models::{AdminUser, Capability};
use crate::store::{LocalData, ADMIN_TOKEN_KEY, ADMIN_USER_KEY};

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    user: Option<AdminUser>,
}

pub struct Session {
    state: RwLock<SessionState>,
    local: LocalData,
}

impl Session {
    /// Start from whatever session was persisted last
    pub fn restore(local: LocalData) -> Self {
        let token: Option<String> = local
            .read_json::<String>(ADMIN_TOKEN_KEY)
            .filter(|t| !t.is_empty());
        let user = token
            .as_ref()
            .and_then(|_| local.read_json::<AdminUser>(ADMIN_USER_KEY));
        if token.is_some() {
            debug!("Restored persisted admin session");
        }
        Self {
            state: RwLock::new(SessionState { token, user }),
            local,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<AdminUser> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// False when logged out or when the profile is unknown
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.is_authenticated()
            && self
                .state
                .read()
                .user
                .as_ref()
                .is_some_and(|u| u.has_capability(capability))
    }

    pub fn set(&self, token: String, user: AdminUser) {
        let mut state = self.state.write();
        self.local.write_json(ADMIN_TOKEN_KEY, &token);
        self.local.write_json(ADMIN_USER_KEY, &user);
        state.token = Some(token);
        state.user = Some(user);
    }

    pub fn set_user(&self, user: AdminUser) {
        let mut state = self.state.write();
        self.local.write_json(ADMIN_USER_KEY, &user);
        state.user = Some(user);
    }

    /// Forget token and profile. Safe to call repeatedly.
    pub fn clear(&self) {
        let mut state = self.state.write();
        self.forget(&mut state);
    }

    /// Clear the session only if `token` is still the current one.
    ///
    /// A rejected request that was sent before a fresh login leaves the new
    /// session alone. Returns whether anything was cleared.
    pub fn expire(&self, token: &str) -> bool {
        let mut state = self.state.write();
        if state.token.as_deref() != Some(token) {
            return false;
        }
        self.forget(&mut state);
        true
    }

    fn forget(&self, state: &mut SessionState) {
        state.token = None;
        state.user = None;
        self.local.remove(ADMIN_TOKEN_KEY);
        self.local.remove(ADMIN_USER_KEY);
    }
}
