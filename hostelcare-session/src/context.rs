//! The session context: created once at startup, owns every piece of shared
//! session state and hands out role-bound clients, guards, logins and logouts.

use crate::client::RoleClient;
use crate::config::{ResolvedConfig, Settings};
use crate::cookies::{CookieEnvironment, CookieJar, HttpCookieJar};
use crate::error::SessionResult;
use crate::guard::RouteGuard;
use crate::login::Login;
use crate::logout::{LogoutReport, LogoutSequence};
use crate::navigation::Navigator;
use crate::role::Role;
use crate::storage::{ClientStorage, MemoryStorage};
use crate::store::CredentialStore;
use hostelcare_core::CoreError;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::sync::Arc;

/// Collaborators supplied by the embedding application.
pub struct SessionParts {
    pub local: Arc<dyn ClientStorage>,
    pub session: Arc<dyn ClientStorage>,
    /// Defaults to the HTTP client's own cookie jar.
    pub cookies: Option<Arc<dyn CookieJar>>,
    pub navigator: Arc<dyn Navigator>,
}

impl SessionParts {
    /// In-memory storages around `navigator`.
    pub fn in_memory(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            local: Arc::new(MemoryStorage::new()),
            session: Arc::new(MemoryStorage::new()),
            cookies: None,
            navigator,
        }
    }
}

pub struct SessionContext {
    config: Arc<ResolvedConfig>,
    store: Arc<CredentialStore>,
    local: Arc<dyn ClientStorage>,
    session: Arc<dyn ClientStorage>,
    cookies: Arc<dyn CookieJar>,
    navigator: Arc<dyn Navigator>,
    user: RoleClient,
    warden: RoleClient,
    admin: RoleClient,
}

impl SessionContext {
    pub fn new(settings: &Settings, navigator: Arc<dyn Navigator>) -> SessionResult<Self> {
        Self::with_parts(settings, SessionParts::in_memory(navigator))
    }

    pub fn with_parts(settings: &Settings, parts: SessionParts) -> SessionResult<Self> {
        let config = Arc::new(settings.resolve());

        let jar = Arc::new(Jar::default());
        let http = build_http_client(&config, jar.clone())?;

        let cookies = match parts.cookies {
            Some(cookies) => cookies,
            None => {
                let api_url = Url::parse(&config.api_base_url)
                    .map_err(|e| CoreError::invalid_url(&config.api_base_url, e))?;
                Arc::new(HttpCookieJar::new(jar, api_url)) as Arc<dyn CookieJar>
            }
        };

        let store = Arc::new(CredentialStore::new());
        let client_for = |role: Role| {
            RoleClient::new(
                role,
                config.clone(),
                http.clone(),
                store.clone(),
                parts.local.clone(),
                parts.navigator.clone(),
            )
        };
        let (user, warden, admin) = (
            client_for(Role::User),
            client_for(Role::Warden),
            client_for(Role::Admin),
        );

        let environment = CookieEnvironment::for_config(&config);
        tracing::info!(
            api_base_url = %config.api_base_url,
            production = environment.production,
            cookie_domain = ?environment.cookie_domain,
            cookie_secure = environment.secure,
            same_site = environment.same_site,
            "Session context ready"
        );

        Ok(Self {
            config,
            store,
            local: parts.local,
            session: parts.session,
            cookies,
            navigator: parts.navigator,
            user,
            warden,
            admin,
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn local_storage(&self) -> &dyn ClientStorage {
        self.local.as_ref()
    }

    pub fn session_storage(&self) -> &dyn ClientStorage {
        self.session.as_ref()
    }

    pub fn client(&self, role: Role) -> &RoleClient {
        match role {
            Role::User => &self.user,
            Role::Warden => &self.warden,
            Role::Admin => &self.admin,
        }
    }

    pub fn guard(&self, role: Role) -> RouteGuard {
        RouteGuard::new(self.client(role).clone())
    }

    pub fn login(&self, role: Role) -> Login {
        Login::new(self.client(role).clone(), self.navigator.clone())
    }

    pub fn logout_sequence(&self, role: Role) -> LogoutSequence {
        LogoutSequence::new(
            self.client(role).clone(),
            self.local.clone(),
            self.session.clone(),
            self.cookies.clone(),
            self.navigator.clone(),
        )
    }

    pub async fn logout(&self, role: Role) -> LogoutReport {
        self.logout_sequence(role).run().await
    }
}

/// One HTTP client for all roles: a shared cookie jar so the HttpOnly
/// refresh cookies travel on every call, JSON content type and the
/// configured timeout.
fn build_http_client(config: &ResolvedConfig, jar: Arc<Jar>) -> Result<Client, CoreError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .cookie_provider(jar)
        .default_headers(headers)
        .timeout(config.timeout)
        .build()?;

    Ok(client)
}

/// Install logging for an application embedding the session client.
pub fn init_tracing(settings: &Settings) -> Result<(), CoreError> {
    hostelcare_core::observability::init_tracing(
        "hostelcare-session",
        &settings.logging.level,
        settings.logging.otlp_endpoint.as_deref(),
    )
}
