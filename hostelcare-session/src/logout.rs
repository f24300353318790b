//! Logout: tell the server (best effort), then tear down everything local.
//!
//! Local teardown never depends on the server call. Both storages are
//! cleared for every role, not just the one logging out, which matches the
//! portal's long-standing behaviour.

use crate::client::{ApiRequest, RoleClient};
use crate::cookies::{self, CookieJar};
use crate::navigation::{cache_busted, Navigation, Navigator};
use crate::storage::ClientStorage;
use metrics::counter;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutReport {
    pub server_acknowledged: bool,
    pub cookies_expired: usize,
    pub redirect: String,
}

pub struct LogoutSequence {
    client: RoleClient,
    local: Arc<dyn ClientStorage>,
    session: Arc<dyn ClientStorage>,
    cookies: Arc<dyn CookieJar>,
    navigator: Arc<dyn Navigator>,
}

impl LogoutSequence {
    pub fn new(
        client: RoleClient,
        local: Arc<dyn ClientStorage>,
        session: Arc<dyn ClientStorage>,
        cookies: Arc<dyn CookieJar>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            local,
            session,
            cookies,
            navigator,
        }
    }

    #[tracing::instrument(name = "logout", skip(self), fields(role = %self.client.role()))]
    pub async fn run(&self) -> LogoutReport {
        let role = self.client.role();
        let config = self.client.config();

        let request = ApiRequest::post(config.logout_path(role), json!({})).no_cache();
        let server_acknowledged = match self.client.dispatch(&request).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Logout call failed, clearing local state anyway");
                false
            }
        };

        self.client.store().clear_tokens(role);
        self.local.clear();
        self.session.clear();

        let plan = cookies::expiry_plan(&config.hostname, config.is_production());
        for expiry in &plan {
            self.cookies.expire(expiry);
        }

        let redirect = cache_busted(&config.login_url(role));
        counter!(
            "session_logout_total",
            "role" => role.as_str(),
            "acknowledged" => server_acknowledged.to_string()
        )
        .increment(1);
        tracing::info!(role = %role, cookies = plan.len(), "Logged out");

        self.navigator.navigate(Navigation::Hard(redirect.clone()));

        LogoutReport {
            server_acknowledged,
            cookies_expired: plan.len(),
            redirect,
        }
    }
}
