//! Volatile per-role token store.
//!
//! Nothing here outlives the process. The durable credential is the
//! HttpOnly refresh cookie held by the HTTP client's cookie jar; this store
//! only mirrors tokens the server chose to return in a JSON body. Expiry is
//! never tracked locally, a failed request is what reveals it.

use crate::role::Role;
use dashmap::DashMap;
use secrecy::{ExposeSecret, Secret};

pub struct Credentials {
    pub access_token: Secret<String>,
    pub refresh_token: Option<Secret<String>>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            refresh_token: refresh_token.map(Secret::new),
        }
    }
}

#[derive(Default)]
pub struct CredentialStore {
    tokens: DashMap<Role, Credentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both tokens for `role` in one step.
    pub fn set_tokens(&self, role: Role, credentials: Credentials) {
        self.tokens.insert(role, credentials);
        tracing::debug!(role = %role, "Stored session tokens");
    }

    pub fn clear_tokens(&self, role: Role) {
        if self.tokens.remove(&role).is_some() {
            tracing::debug!(role = %role, "Cleared session tokens");
        }
    }

    pub fn access_token(&self, role: Role) -> Option<Secret<String>> {
        self.tokens
            .get(&role)
            .map(|entry| Secret::new(entry.access_token.expose_secret().clone()))
    }

    pub fn refresh_token(&self, role: Role) -> Option<Secret<String>> {
        self.tokens.get(&role).and_then(|entry| {
            entry
                .refresh_token
                .as_ref()
                .map(|token| Secret::new(token.expose_secret().clone()))
        })
    }

    /// Install a refreshed access token, keeping the previous refresh token
    /// when the server did not rotate it.
    pub fn rotate(&self, role: Role, access_token: String, refresh_token: Option<String>) {
        let refresh_token = refresh_token.or_else(|| {
            self.refresh_token(role)
                .map(|token| token.expose_secret().clone())
        });
        self.set_tokens(role, Credentials::new(access_token, refresh_token));
    }
}
