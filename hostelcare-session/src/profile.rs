//! Persisted, non-sensitive projection of the signed-in principal.
//!
//! Lets pages greet the user without a round trip. Its presence proves
//! nothing; only a successful server check does.

use crate::role::Role;
use crate::storage::ClientStorage;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionProfile(Value);

impl SessionProfile {
    /// Accepts only JSON objects; anything else is not a principal.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    /// The role's principal object out of a login/profile/refresh body.
    pub fn from_response(role: Role, body: &Value) -> Option<Self> {
        body.get(role.wiring().principal_field)
            .cloned()
            .and_then(Self::from_value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    /// Wardens carry `mail`, others `email`.
    pub fn email(&self) -> Option<&str> {
        self.field("email").or_else(|| self.field("mail"))
    }

    pub fn display_name(&self) -> String {
        self.name()
            .map(str::to_string)
            .or_else(|| {
                self.email()
                    .and_then(|email| email.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Write the profile under every key the role owns.
pub fn persist_profile(storage: &dyn ClientStorage, role: Role, profile: &SessionProfile) {
    let keys = &role.wiring().profile_keys;
    let blob = profile.0.to_string();

    storage.set(keys.primary, blob.clone());
    for mirror in keys.mirrors {
        storage.set(mirror, blob.clone());
    }
    if let Some((key, field)) = keys.id_mirror {
        match profile.field(field) {
            Some(id) => storage.set(key, id.to_string()),
            None => storage.remove(key),
        }
    }
}

pub fn drop_profile(storage: &dyn ClientStorage, role: Role) {
    for key in role.wiring().profile_keys.all() {
        storage.remove(key);
    }
}

pub fn cached_profile(storage: &dyn ClientStorage, role: Role) -> Option<SessionProfile> {
    storage
        .get(role.wiring().profile_keys.primary)
        .and_then(|blob| serde_json::from_str(&blob).ok())
        .and_then(SessionProfile::from_value)
}
