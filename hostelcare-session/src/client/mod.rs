//! Role-scoped API client.
//!
//! Each call passes through three stages:
//! 1. request: attach the role's bearer token when one is held; cookies
//!    always travel through the shared jar;
//! 2. response: adopt any `access_token`/`refresh_token` pair in the body;
//! 3. auth failure: on a first 401, refresh once and replay the original
//!    request. A failed refresh or a second 401 ends the session: tokens and
//!    persisted profile are dropped and the browser is sent to the role's
//!    login page.

mod refresh;
mod request;

pub use refresh::{RefreshFailure, RefreshOutcome};
pub use request::{ApiRequest, ApiResponse};

use crate::config::ResolvedConfig;
use crate::error::{SessionError, SessionResult};
use crate::navigation::{Navigation, Navigator};
use crate::profile;
use crate::role::{Role, RoleWiring};
use crate::storage::ClientStorage;
use crate::store::{Credentials, CredentialStore};
use hostelcare_core::observability::TracedClientExt;
use metrics::counter;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct RoleClient {
    wiring: &'static RoleWiring,
    config: Arc<ResolvedConfig>,
    http: Client,
    store: Arc<CredentialStore>,
    storage: Arc<dyn ClientStorage>,
    navigator: Arc<dyn Navigator>,
}

impl RoleClient {
    pub fn new(
        role: Role,
        config: Arc<ResolvedConfig>,
        http: Client,
        store: Arc<CredentialStore>,
        storage: Arc<dyn ClientStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            wiring: role.wiring(),
            config,
            http,
            store,
            storage,
            navigator,
        }
    }

    pub fn role(&self) -> Role {
        self.wiring.role
    }

    pub fn wiring(&self) -> &'static RoleWiring {
        self.wiring
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn storage(&self) -> &dyn ClientStorage {
        self.storage.as_ref()
    }

    pub async fn get(&self, path: &str) -> SessionResult<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> SessionResult<ApiResponse> {
        self.execute(ApiRequest::post(path, body)).await
    }

    /// Issue `request`, recovering once from an expired access token.
    #[tracing::instrument(
        name = "session_request",
        skip(self, request),
        fields(role = %self.role(), method = %request.method, path = %request.path)
    )]
    pub async fn execute(&self, mut request: ApiRequest) -> SessionResult<ApiResponse> {
        loop {
            match self.dispatch(&request).await {
                Err(err) if err.is_unauthorized() => {}
                outcome => return outcome,
            }

            if request.retried {
                tracing::warn!("Request still unauthorized after refresh");
                return Err(self.end_session());
            }
            request.retried = true;

            if let RefreshOutcome::Failed(reason) = self.refresh().await {
                tracing::warn!(reason = %reason, "Token refresh failed");
                return Err(self.end_session());
            }
        }
    }

    /// Single attempt: bearer attached, tokens adopted, but no refresh and
    /// no redirect. Non-2xx responses come back as `SessionError::Api`.
    pub async fn dispatch(&self, request: &ApiRequest) -> SessionResult<ApiResponse> {
        let url = self.config.url(&request.path);

        let mut builder = self
            .http
            .traced_request(request.method.clone(), &url)
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.store.access_token(self.role()) {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to send request");
                SessionError::from_transport(&url, e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::from_transport(&url, e))?;
        let body = request::decode_body(text);

        counter!(
            "session_requests_total",
            "role" => self.role().as_str(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);

        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "API returned an error status");
            return Err(SessionError::Api { status, body });
        }

        self.adopt_tokens(&body);

        Ok(ApiResponse { status, body })
    }

    /// Login and refresh bodies may carry a fresh token pair.
    fn adopt_tokens(&self, body: &Value) {
        let access = body.get("access_token").and_then(Value::as_str);
        let refresh = body.get("refresh_token").and_then(Value::as_str);

        if let (Some(access), Some(refresh)) = (access, refresh) {
            self.store.set_tokens(
                self.role(),
                Credentials::new(access, Some(refresh.to_string())),
            );
        }
    }

    /// Drop all local session state for the role and leave for the login page.
    pub(crate) fn end_session(&self) -> SessionError {
        let role = self.role();
        self.store.clear_tokens(role);
        profile::drop_profile(self.storage.as_ref(), role);

        let login_url = self.config.login_url(role);
        tracing::info!(role = %role, login_url = %login_url, "Session expired, redirecting to login");
        counter!("session_expired_total", "role" => role.as_str()).increment(1);

        self.navigator.navigate(Navigation::Hard(login_url));
        SessionError::Unauthenticated { role }
    }
}

