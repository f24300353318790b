use crate::client::{ApiRequest, RoleClient};
use crate::error::{SessionError, SessionResult};
use crate::navigation::{Navigation, Navigator};
use crate::profile::{self, SessionProfile};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success {
        profile: SessionProfile,
        landing_path: &'static str,
    },
    /// Wrong identifier or password.
    Invalid,
    /// The server declined for another reason; carries its message if any.
    Rejected(Option<String>),
}

/// Signs a principal into one role.
pub struct Login {
    client: RoleClient,
    navigator: Arc<dyn Navigator>,
}

impl Login {
    pub fn new(client: RoleClient, navigator: Arc<dyn Navigator>) -> Self {
        Self { client, navigator }
    }

    /// Post `credentials` to the role's login endpoint.
    ///
    /// The body shape is role specific (`{shid, pswd}` for students,
    /// `{mail, password}` for wardens, `{email, password}` for admins) and
    /// is passed through untouched. Tokens in the response are adopted by
    /// the client; the profile is persisted and the app moves to the role's
    /// landing page.
    #[tracing::instrument(name = "login", skip(self, credentials), fields(role = %self.client.role()))]
    pub async fn submit(&self, credentials: Value) -> SessionResult<LoginOutcome> {
        let role = self.client.role();
        let request = ApiRequest::post(self.client.wiring().login_path, credentials);

        let response = match self.client.dispatch(&request).await {
            Ok(response) => response,
            Err(SessionError::Api { status, body }) => {
                tracing::info!(status = %status, "Login refused");
                return Ok(if status == reqwest::StatusCode::UNAUTHORIZED {
                    LoginOutcome::Invalid
                } else {
                    LoginOutcome::Rejected(error_message(&body))
                });
            }
            Err(err) => return Err(err),
        };

        match response.status_field() {
            Some("success") => {}
            Some("invalid") => return Ok(LoginOutcome::Invalid),
            _ => return Ok(LoginOutcome::Rejected(error_message(&response.body))),
        }

        let Some(profile) = SessionProfile::from_response(role, &response.body) else {
            tracing::warn!("Login succeeded without a principal in the response");
            return Ok(LoginOutcome::Rejected(Some(
                "Login failed! Invalid response format.".to_string(),
            )));
        };

        profile::persist_profile(self.client.storage(), role, &profile);

        let landing_path = self.client.wiring().landing_path;
        tracing::info!(role = %role, "Logged in");
        self.navigator
            .navigate(Navigation::Push(landing_path.to_string()));

        Ok(LoginOutcome::Success {
            profile,
            landing_path,
        })
    }
}

fn error_message(body: &Value) -> Option<String> {
    ["message", "detail"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}
