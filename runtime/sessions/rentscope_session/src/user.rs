use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// The user object cached alongside the session token.
///
/// Only the fields the client runtime cares about are typed; everything else the
/// backend sends is preserved in [`User::other`] and written back untouched.
pub struct User {
    /// The user's login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The role assigned to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Set by the backend for administrators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Any other field returned by the backend.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl User {
    /// A user with the given role and no other information.
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Default::default()
        }
    }

    /// The role embedded in the user object.
    ///
    /// The explicit `role` field takes precedence.
    /// Without it, administrators (`is_admin: true`) have the `admin` role.
    pub fn role(&self) -> Option<&str> {
        match (&self.role, self.is_admin) {
            (Some(role), _) => Some(role.as_str()),
            (None, Some(true)) => Some("admin"),
            (None, _) => None,
        }
    }
}
