//! The three isolated authentication domains and their static wiring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student; named `user` on the wire.
    User,
    Warden,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Warden, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Warden => "warden",
            Role::Admin => "admin",
        }
    }

    pub fn wiring(&self) -> &'static RoleWiring {
        match self {
            Role::User => &USER,
            Role::Warden => &WARDEN,
            Role::Admin => &ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "student" => Ok(Role::User),
            "warden" => Ok(Role::Warden),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// When the route guard re-validates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckPolicy {
    /// Re-check whenever the navigation path changes.
    EveryNavigation,
    OncePerMount,
}

/// Storage keys holding a role's persisted profile.
#[derive(Debug, Clone, Copy)]
pub struct ProfileKeys {
    /// Written by the route guard on every successful check.
    pub primary: &'static str,
    /// Duplicates of the profile blob written by older pages.
    pub mirrors: &'static [&'static str],
    /// `(storage key, profile field)` for a plain-string copy of the principal id.
    pub id_mirror: Option<(&'static str, &'static str)>,
}

impl ProfileKeys {
    /// Every key owned by the role, in write order.
    pub fn all(&self) -> Vec<&'static str> {
        let mut keys = vec![self.primary];
        keys.extend_from_slice(self.mirrors);
        if let Some((key, _)) = self.id_mirror {
            keys.push(key);
        }
        keys
    }
}

/// Per-role parameters for the client, guard, login and logout.
#[derive(Debug)]
pub struct RoleWiring {
    pub role: Role,
    pub login_path: &'static str,
    pub profile_path: &'static str,
    pub refresh_path: &'static str,
    pub logout_path: &'static str,
    pub nuclear_logout_path: &'static str,
    /// Field of login/profile/refresh responses carrying the principal.
    pub principal_field: &'static str,
    pub profile_keys: ProfileKeys,
    /// Subdomain hosting the login page in production (`None` = apex).
    pub login_subdomain: Option<&'static str>,
    pub production_login_path: &'static str,
    /// Client-side login route; also the redirect target outside production.
    pub login_route: &'static str,
    /// Client-side route opened after a successful login.
    pub landing_path: &'static str,
    pub recheck: RecheckPolicy,
    /// Whether the guard's redirect replaces the current history entry.
    pub replace_on_redirect: bool,
    pub loading_message: &'static str,
}

static USER: RoleWiring = RoleWiring {
    role: Role::User,
    login_path: "/auth/user/login",
    profile_path: "/auth/user/profile",
    refresh_path: "/auth/user/refresh",
    logout_path: "/auth/user/logout",
    nuclear_logout_path: "/auth/user/nuclear-logout",
    principal_field: "user",
    profile_keys: ProfileKeys {
        primary: "user_data",
        mirrors: &[],
        id_mirror: Some(("shid", "shid")),
    },
    login_subdomain: None,
    production_login_path: "/register",
    login_route: "/register",
    landing_path: "/dashboard",
    recheck: RecheckPolicy::EveryNavigation,
    replace_on_redirect: true,
    loading_message: "Checking user session...",
};

static WARDEN: RoleWiring = RoleWiring {
    role: Role::Warden,
    login_path: "/auth/warden/login",
    profile_path: "/auth/warden/profile",
    refresh_path: "/auth/warden/refresh",
    logout_path: "/auth/warden/logout",
    nuclear_logout_path: "/auth/warden/nuclear-logout",
    principal_field: "warden",
    profile_keys: ProfileKeys {
        primary: "warden_data",
        mirrors: &["warden"],
        id_mirror: None,
    },
    login_subdomain: Some("warden"),
    production_login_path: "/login",
    login_route: "/warden/login",
    landing_path: "/warden/dashboard",
    recheck: RecheckPolicy::OncePerMount,
    replace_on_redirect: false,
    loading_message: "Checking warden session...",
};

static ADMIN: RoleWiring = RoleWiring {
    role: Role::Admin,
    login_path: "/auth/admin/login",
    profile_path: "/admin/profile",
    refresh_path: "/auth/admin/refresh",
    logout_path: "/auth/admin/logout",
    nuclear_logout_path: "/auth/admin/nuclear-logout",
    principal_field: "admin",
    profile_keys: ProfileKeys {
        primary: "admin_data",
        mirrors: &[],
        id_mirror: None,
    },
    login_subdomain: Some("admin"),
    production_login_path: "/login",
    login_route: "/admin/login",
    landing_path: "/admin/welcome",
    recheck: RecheckPolicy::OncePerMount,
    replace_on_redirect: false,
    loading_message: "Checking admin session...",
};
