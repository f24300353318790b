//! Route guard: gates a protected view on a live server-side session check.
//!
//! `Checking -> {Authorized, Unauthorized}`. The persisted profile is never
//! consulted; only the profile endpoint (or a successful refresh) admits the
//! view. Any failure other than a recoverable 401 is treated as "not signed
//! in", so an unreachable API also lands on the login page.

use crate::client::{ApiRequest, RefreshOutcome, RoleClient};
use crate::profile::{self, SessionProfile};
use crate::role::{RecheckPolicy, Role};
use metrics::counter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardState {
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl GuardState {
    pub const CHECKING: GuardState = GuardState {
        is_loading: true,
        is_authenticated: false,
    };
    pub const AUTHORIZED: GuardState = GuardState {
        is_loading: false,
        is_authenticated: true,
    };
    pub const UNAUTHORIZED: GuardState = GuardState {
        is_loading: false,
        is_authenticated: false,
    };
}

/// What the guarded route should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading(&'static str),
    /// Render the protected children.
    Children,
    Redirect { to: String, replace: bool },
}

pub struct RouteGuard {
    client: RoleClient,
    state: GuardState,
    checked_path: Option<String>,
}

impl RouteGuard {
    pub fn new(client: RoleClient) -> Self {
        Self {
            client,
            state: GuardState::CHECKING,
            checked_path: None,
        }
    }

    pub fn role(&self) -> Role {
        self.client.role()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn render(&self) -> View {
        let wiring = self.client.wiring();
        match self.state {
            GuardState {
                is_loading: true, ..
            } => View::Loading(wiring.loading_message),
            GuardState {
                is_authenticated: true,
                ..
            } => View::Children,
            GuardState { .. } => View::Redirect {
                to: wiring.login_route.to_string(),
                replace: wiring.replace_on_redirect,
            },
        }
    }

    /// First render of the protected view at `path`.
    pub async fn mount(&mut self, path: &str) -> View {
        self.check(path).await
    }

    /// The location changed while mounted. Only roles with
    /// [`RecheckPolicy::EveryNavigation`] re-validate.
    pub async fn navigate(&mut self, path: &str) -> View {
        let path_changed = self.checked_path.as_deref() != Some(path);
        match self.client.wiring().recheck {
            RecheckPolicy::EveryNavigation if path_changed => self.check(path).await,
            _ => self.render(),
        }
    }

    #[tracing::instrument(name = "route_guard", skip(self), fields(role = %self.role()))]
    async fn check(&mut self, path: &str) -> View {
        self.state = GuardState::CHECKING;
        self.checked_path = Some(path.to_string());

        let authorized = self.verify().await;
        let role = self.role();

        self.state = if authorized {
            GuardState::AUTHORIZED
        } else {
            profile::drop_profile(self.client.storage(), role);
            GuardState::UNAUTHORIZED
        };

        let outcome = if authorized { "authorized" } else { "unauthorized" };
        counter!("session_guard_checks_total", "role" => role.as_str(), "outcome" => outcome)
            .increment(1);
        tracing::debug!(authorized, "Route guard check finished");

        self.render()
    }

    async fn verify(&self) -> bool {
        let role = self.role();
        let request = ApiRequest::get(self.client.wiring().profile_path)
            .no_cache()
            .query("_t", chrono::Utc::now().timestamp_millis().to_string());

        match self.client.dispatch(&request).await {
            Ok(response) => match SessionProfile::from_response(role, &response.body) {
                Some(profile) => {
                    profile::persist_profile(self.client.storage(), role, &profile);
                    true
                }
                None => {
                    tracing::warn!("Profile response carried no principal");
                    false
                }
            },
            Err(err) if err.is_unauthorized() => match self.client.refresh().await {
                RefreshOutcome::Refreshed { profile } => {
                    if let Some(profile) = profile {
                        profile::persist_profile(self.client.storage(), role, &profile);
                    }
                    true
                }
                RefreshOutcome::Failed(reason) => {
                    tracing::info!(reason = %reason, "Session could not be refreshed");
                    false
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "Session check failed");
                false
            }
        }
    }
}
