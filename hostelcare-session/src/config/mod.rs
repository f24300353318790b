use crate::role::Role;
use hostelcare_core::CoreError;
use serde::Deserialize;
use std::time::Duration;

/// Which deployment we are serving. Picked by explicit flag, never by
/// inspecting the current hostname.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    Development,
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: DeploymentEnvironment,
    pub api: ApiSettings,
    pub site: SiteSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Backend base URL used outside production.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Overrides `https://api.<production_domain>` in production.
    #[serde(default)]
    pub production_base_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    /// Registrable domain of the production deployment; the API lives on
    /// `api.<domain>` and role login pages on `<role>.<domain>`.
    #[serde(default = "default_production_domain")]
    pub production_domain: String,
    /// Hostname the frontend is served from; cookie scoping derives from it.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

fn default_production_domain() -> String {
    "govthostelcare.me".to_string()
}

fn default_hostname() -> String {
    "localhost".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

/// Load `hostelcare-session/config/base.yaml` overlaid with `APP_*` variables.
pub fn get_configuration() -> Result<Settings, CoreError> {
    hostelcare_core::config::load_settings("hostelcare-session")
}

impl Settings {
    /// Development settings against `base_url`, for embedding and tests.
    pub fn development(base_url: impl Into<String>) -> Self {
        Self {
            environment: DeploymentEnvironment::Development,
            api: ApiSettings {
                base_url: base_url.into(),
                timeout_secs: default_timeout_secs(),
                production_base_url: None,
            },
            site: SiteSettings {
                production_domain: default_production_domain(),
                hostname: default_hostname(),
            },
            logging: LoggingSettings::default(),
        }
    }

    /// Resolve environment-dependent values once.
    pub fn resolve(&self) -> ResolvedConfig {
        let api_base_url = match self.environment {
            DeploymentEnvironment::Production => match &self.api.production_base_url {
                Some(url) => url.trim_end_matches('/').to_string(),
                None => format!("https://api.{}", self.site.production_domain),
            },
            DeploymentEnvironment::Development => {
                self.api.base_url.trim_end_matches('/').to_string()
            }
        };

        ResolvedConfig {
            environment: self.environment,
            api_base_url,
            timeout: Duration::from_secs(self.api.timeout_secs),
            hostname: self.site.hostname.clone(),
            production_domain: self.site.production_domain.clone(),
        }
    }
}

/// Immutable configuration shared by every session component.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub environment: DeploymentEnvironment,
    pub api_base_url: String,
    pub timeout: Duration,
    pub hostname: String,
    pub production_domain: String,
}

impl ResolvedConfig {
    pub fn is_production(&self) -> bool {
        self.environment == DeploymentEnvironment::Production
    }

    /// Absolute API URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Where a role is sent when its session cannot be recovered.
    pub fn login_url(&self, role: Role) -> String {
        let wiring = role.wiring();
        if !self.is_production() {
            return wiring.login_route.to_string();
        }

        match wiring.login_subdomain {
            Some(subdomain) => format!(
                "https://{}.{}{}",
                subdomain, self.production_domain, wiring.production_login_path
            ),
            None => format!(
                "https://{}{}",
                self.production_domain, wiring.production_login_path
            ),
        }
    }

    /// Logout endpoint; production asks the server for the aggressive variant.
    pub fn logout_path(&self, role: Role) -> &'static str {
        if self.is_production() {
            role.wiring().nuclear_logout_path
        } else {
            role.wiring().logout_path
        }
    }
}
