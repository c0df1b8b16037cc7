//! User entity and its inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};
use crate::validation::{Validatable, Violations};

/// Maximum length of a display name or email.
pub const MAX_NAME_LENGTH: u64 = 255;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_at: Timestamp,
}

/// A user row ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub registered_at: Timestamp,
}

/// Payload for self-registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload for updating a user. A `None` password keeps the current one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

fn identity_rules(v: &mut Violations, name: &str, email: &str) {
    v.not_blank("name", name)
        .max_length("name", name, MAX_NAME_LENGTH)
        .not_blank("email", email)
        .max_length("email", email, MAX_NAME_LENGTH)
        .email("email", email);
}

impl Validatable for Registration {
    const ENTITY: &'static str = "User";

    fn collect_violations(&self, v: &mut Violations) {
        identity_rules(v, &self.name, &self.email);
        v.not_blank("password", &self.password);
    }
}

impl Validatable for UserUpdate {
    const ENTITY: &'static str = "User";

    fn collect_violations(&self, v: &mut Violations) {
        identity_rules(v, &self.name, &self.email);
        if let Some(password) = &self.password {
            v.not_blank("password", password);
        }
    }
}

/// Turns a plaintext credential into its stored form.
///
/// The HTTP layer supplies the concrete scheme.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, crate::error::BoxError>;
}

/// Per-user workload counts grouped by status name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPerformance {
    pub user_id: DbId,
    pub total_projects: usize,
    pub total_tasks: usize,
    pub projects_by_status: BTreeMap<&'static str, usize>,
    pub tasks_by_status: BTreeMap<&'static str, usize>,
}

#[cfg(test)]
mod tests {
    use crate::validation::validate;

    use super::*;

    #[test]
    fn registration_requires_every_field() {
        let fields: Vec<_> = validate(&Registration::default())
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let input = Registration {
            name: "Ada".into(),
            email: "ada-at-example".into(),
            password: "secret".into(),
        };
        let violations = validate(&input);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "email");
    }

    #[test]
    fn update_without_password_is_valid() {
        let input = UserUpdate {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: None,
        };
        assert!(validate(&input).is_empty());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            registered_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
