use super::request::decode_body;
use super::RoleClient;
use crate::error::SessionError;
use crate::profile::SessionProfile;
use hostelcare_core::observability::TracedClientExt;
use metrics::counter;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The server minted a new session; the profile is present when the
    /// response carried the role's principal.
    Refreshed { profile: Option<SessionProfile> },
    Failed(RefreshFailure),
}

#[derive(Debug)]
pub enum RefreshFailure {
    Status(StatusCode),
    /// 2xx whose body did not report `status: "success"`.
    NotSuccessful(Option<String>),
    Transport(SessionError),
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshFailure::Status(status) => write!(f, "refresh endpoint returned {}", status),
            RefreshFailure::NotSuccessful(Some(status)) => {
                write!(f, "refresh reported status '{}'", status)
            }
            RefreshFailure::NotSuccessful(None) => f.write_str("refresh reported no status"),
            RefreshFailure::Transport(err) => write!(f, "refresh request failed: {}", err),
        }
    }
}

impl RoleClient {
    /// Ask the role's refresh endpoint for a new access token.
    ///
    /// Only the refresh cookie authenticates this call; no body is sent.
    /// Tokens returned in the body are installed before this returns.
    #[tracing::instrument(name = "session_refresh", skip(self), fields(role = %self.role()))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let role = self.role();
        let url = self.config.url(self.wiring.refresh_path);

        let outcome = match self
            .http
            .traced_post(&url)
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                match response.text().await {
                    Ok(text) => self.install_refreshed(decode_body(text)),
                    Err(e) => RefreshOutcome::Failed(RefreshFailure::Transport(
                        SessionError::from_transport(&url, e),
                    )),
                }
            }
            Ok(response) => RefreshOutcome::Failed(RefreshFailure::Status(response.status())),
            Err(e) => RefreshOutcome::Failed(RefreshFailure::Transport(
                SessionError::from_transport(&url, e),
            )),
        };

        let label = match &outcome {
            RefreshOutcome::Refreshed { .. } => "success",
            RefreshOutcome::Failed(_) => "failure",
        };
        counter!("session_refresh_total", "role" => role.as_str(), "outcome" => label)
            .increment(1);

        outcome
    }

    fn install_refreshed(&self, body: Value) -> RefreshOutcome {
        let status = body.get("status").and_then(Value::as_str);
        if status != Some("success") {
            return RefreshOutcome::Failed(RefreshFailure::NotSuccessful(
                status.map(str::to_string),
            ));
        }

        if let Some(access) = body.get("access_token").and_then(Value::as_str) {
            let refresh = body
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(str::to_string);
            self.store.rotate(self.role(), access.to_string(), refresh);
        }

        tracing::info!(role = %self.role(), "Session refreshed");
        RefreshOutcome::Refreshed {
            profile: SessionProfile::from_response(self.role(), &body),
        }
    }
}
