//! Auth cookie expiry across the domain scopes a cookie may have been set under.
//!
//! The API and the role portals live on sibling subdomains in production,
//! so an auth cookie may be host-only, scoped to the current host, or scoped
//! to the registrable parent domain. Logout expires every known name under
//! every scope.

use crate::config::ResolvedConfig;
use dashmap::DashMap;
use reqwest::cookie::Jar;
use reqwest::Url;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

pub const KNOWN_AUTH_COOKIES: [&str; 12] = [
    "user_access_token",
    "user_refresh_token",
    "admin_access_token",
    "admin_refresh_token",
    "warden_access_token",
    "warden_refresh_token",
    "access_token",
    "refresh_token",
    "sessionid",
    "csrftoken",
    "auth_token",
    "session",
];

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 UTC";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CookieScope {
    HostOnly,
    /// Domain attribute, stored without a leading dot since browsers treat
    /// `example.com` and `.example.com` alike.
    Domain(String),
}

impl CookieScope {
    pub fn domain(domain: &str) -> Self {
        CookieScope::Domain(domain.trim_start_matches('.').to_string())
    }
}

/// One cookie name under one scope, to be expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieExpiry {
    pub name: String,
    pub scope: CookieScope,
}

impl CookieExpiry {
    /// `Set-Cookie` form for an HTTP cookie store.
    pub fn set_cookie_header(&self) -> String {
        match &self.scope {
            CookieScope::HostOnly => format!("{}=; Max-Age=0; Path=/", self.name),
            CookieScope::Domain(domain) => {
                format!("{}=; Max-Age=0; Path=/; Domain={}", self.name, domain)
            }
        }
    }
}

/// Renders the `document.cookie` assignment a browser would receive.
impl fmt::Display for CookieExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=; expires={}; path=/", self.name, EPOCH)?;
        if let CookieScope::Domain(domain) = &self.scope {
            write!(f, "; domain={}", domain)?;
        }
        Ok(())
    }
}

/// `.example.com` for `app.example.com`; `None` for single-label hosts and IPs.
pub fn registrable_parent(hostname: &str) -> Option<String> {
    if hostname.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = hostname.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }

    Some(format!(".{}", labels[labels.len() - 2..].join(".")))
}

/// Scopes to expire under. Development cookies are host-only.
pub fn domain_variants(hostname: &str, production: bool) -> Vec<CookieScope> {
    let mut scopes = vec![CookieScope::HostOnly];
    if !production {
        return scopes;
    }

    let candidates = std::iter::once(hostname.to_string()).chain(registrable_parent(hostname));
    for candidate in candidates {
        let scope = CookieScope::domain(&candidate);
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    scopes
}

/// Every known auth cookie under every applicable scope.
pub fn expiry_plan(hostname: &str, production: bool) -> Vec<CookieExpiry> {
    let scopes = domain_variants(hostname, production);
    KNOWN_AUTH_COOKIES
        .iter()
        .flat_map(|name| {
            scopes.iter().map(move |scope| CookieExpiry {
                name: name.to_string(),
                scope: scope.clone(),
            })
        })
        .collect()
}

pub trait CookieJar: Send + Sync {
    fn expire(&self, expiry: &CookieExpiry);
}

/// Cookie jar keyed by name and scope, mirroring what a browser holds.
#[derive(Default)]
pub struct MemoryCookieJar {
    cookies: DashMap<(String, CookieScope), String>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, scope: CookieScope, value: &str) {
        self.cookies
            .insert((name.to_string(), scope), value.to_string());
    }

    pub fn contains(&self, name: &str, scope: &CookieScope) -> bool {
        self.cookies.contains_key(&(name.to_string(), scope.clone()))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn expire(&self, expiry: &CookieExpiry) {
        self.cookies
            .remove(&(expiry.name.clone(), expiry.scope.clone()));
    }
}

/// The HTTP client's own jar, where the HttpOnly tokens actually live.
pub struct HttpCookieJar {
    jar: Arc<Jar>,
    api_url: Url,
}

impl HttpCookieJar {
    pub fn new(jar: Arc<Jar>, api_url: Url) -> Self {
        Self { jar, api_url }
    }

    fn url_for(&self, scope: &CookieScope) -> Option<Url> {
        match scope {
            CookieScope::HostOnly => Some(self.api_url.clone()),
            CookieScope::Domain(domain) => {
                Url::parse(&format!("{}://{}/", self.api_url.scheme(), domain)).ok()
            }
        }
    }
}

impl CookieJar for HttpCookieJar {
    fn expire(&self, expiry: &CookieExpiry) {
        match self.url_for(&expiry.scope) {
            Some(url) => self.jar.add_cookie_str(&expiry.set_cookie_header(), &url),
            None => tracing::debug!(cookie = %expiry.name, "Skipping cookie with unusable scope"),
        }
    }
}

/// Cookie policy in effect for the current deployment, logged at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEnvironment {
    pub production: bool,
    pub hostname: String,
    pub cookie_domain: Option<String>,
    pub secure: bool,
    pub same_site: &'static str,
}

impl CookieEnvironment {
    pub fn for_config(config: &ResolvedConfig) -> Self {
        let production = config.is_production();
        Self {
            production,
            hostname: config.hostname.clone(),
            cookie_domain: production.then(|| format!(".{}", config.production_domain)),
            secure: production,
            same_site: "lax",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_domain_uses_last_two_labels() {
        assert_eq!(
            registrable_parent("app.example.com"),
            Some(".example.com".to_string())
        );
        assert_eq!(
            registrable_parent("govthostelcare.me"),
            Some(".govthostelcare.me".to_string())
        );
        assert_eq!(registrable_parent("localhost"), None);
        assert_eq!(registrable_parent("127.0.0.1"), None);
    }

    #[test]
    fn production_variants_cover_host_and_parent() {
        assert_eq!(
            domain_variants("app.example.com", true),
            vec![
                CookieScope::HostOnly,
                CookieScope::domain("app.example.com"),
                CookieScope::domain(".example.com"),
            ]
        );
        // apex host and its parent collapse into one domain scope
        assert_eq!(
            domain_variants("example.com", true),
            vec![CookieScope::HostOnly, CookieScope::domain("example.com")]
        );
        assert_eq!(domain_variants("app.example.com", false), vec![CookieScope::HostOnly]);
    }

    #[test]
    fn renders_browser_expiry_assignment() {
        let expiry = CookieExpiry {
            name: "admin_access_token".to_string(),
            scope: CookieScope::domain(".example.com"),
        };
        assert_eq!(
            expiry.to_string(),
            "admin_access_token=; expires=Thu, 01 Jan 1970 00:00:00 UTC; path=/; domain=example.com"
        );
        assert_eq!(
            expiry.set_cookie_header(),
            "admin_access_token=; Max-Age=0; Path=/; Domain=example.com"
        );
    }

    #[test]
    fn plan_covers_every_known_name() {
        let plan = expiry_plan("app.example.com", true);
        assert_eq!(plan.len(), KNOWN_AUTH_COOKIES.len() * 3);
        assert_eq!(expiry_plan("localhost", false).len(), KNOWN_AUTH_COOKIES.len());
    }

    #[test]
    fn http_jar_drops_expired_cookie() {
        use reqwest::cookie::CookieStore;

        let jar = Arc::new(Jar::default());
        let url = Url::parse("http://localhost:8000/").unwrap();
        jar.add_cookie_str("user_refresh_token=abc; Path=/", &url);
        assert!(jar.cookies(&url).is_some());

        let http_jar = HttpCookieJar::new(jar.clone(), url.clone());
        http_jar.expire(&CookieExpiry {
            name: "user_refresh_token".to_string(),
            scope: CookieScope::HostOnly,
        });

        assert!(jar.cookies(&url).is_none());
    }

    #[test]
    fn http_jar_drops_domain_scoped_cookies_in_production() {
        use reqwest::cookie::CookieStore;

        let jar = Arc::new(Jar::default());
        let api = Url::parse("https://api.example.com/").unwrap();
        let app = Url::parse("https://app.example.com/").unwrap();
        jar.add_cookie_str("admin_access_token=a; Domain=.example.com; Path=/", &api);
        jar.add_cookie_str("admin_refresh_token=r; Domain=api.example.com; Path=/", &api);
        assert!(jar.cookies(&api).is_some());
        assert!(jar.cookies(&app).is_some());

        let http_jar = HttpCookieJar::new(jar.clone(), api.clone());
        for expiry in expiry_plan("app.example.com", true) {
            http_jar.expire(&expiry);
        }

        assert!(jar.cookies(&api).is_none());
        assert!(jar.cookies(&app).is_none());
    }
}
