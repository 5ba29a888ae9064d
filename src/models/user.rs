//! User record and its projections
//!
//! - [`User`]: every column, used for reads
//! - [`UserIn`]: `username`, `hashed_password`, `email`, used for creation
//! - [`UserToken`]: `username`, `id`, `email`, used for issuing identity
//!   tokens; never carries the password hash

use crate::error::Result;
use crate::models::{column, Insertable, Record, Value};
use crate::password;
use crate::schema::USERS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub hashed_password: String,
    pub email: String,
    pub is_logged_in: bool,
    pub last_logged_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check a plaintext candidate against the stored digest.
    ///
    /// `Ok(false)` on mismatch; an error only when the stored digest is corrupt.
    pub fn verify_password(&self, candidate: &str) -> Result<bool> {
        password::verify(candidate, &self.hashed_password)
    }

    pub fn token(&self) -> UserToken {
        UserToken::from(self)
    }
}

impl Record for User {
    const TABLE: &'static str = USERS;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, USERS, "id")?,
            username: column(row, USERS, "username")?,
            hashed_password: column(row, USERS, "hashed_password")?,
            email: column(row, USERS, "email")?,
            is_logged_in: column(row, USERS, "is_logged_in")?,
            last_logged_date: column(row, USERS, "last_logged_date")?,
            created_at: column(row, USERS, "created_at")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("hashed_password", Value::Text(&self.hashed_password)),
            ("email", Value::Text(&self.email)),
            ("is_logged_in", Value::Bool(&self.is_logged_in)),
        ]
    }
}

/// Creation input. The password must already be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserIn {
    pub username: String,
    pub hashed_password: String,
    pub email: String,
}

impl UserIn {
    /// Build an input by hashing `plaintext` at `cost`
    pub async fn with_password(username: &str, plaintext: &str, email: &str, cost: u32) -> Result<Self> {
        Ok(Self {
            username: username.to_string(),
            hashed_password: password::hash_password(plaintext, cost).await?,
            email: email.to_string(),
        })
    }
}

impl Insertable for UserIn {
    type Record = User;

    fn values(&self) -> Vec<(&'static str, Value<'_>)> {
        vec![
            ("username", Value::Text(&self.username)),
            ("hashed_password", Value::Text(&self.hashed_password)),
            ("email", Value::Text(&self.email)),
        ]
    }
}

impl From<&User> for UserIn {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            hashed_password: user.hashed_password.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub username: String,
    pub id: i32,
    pub email: String,
}

impl From<&User> for UserToken {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::MIN_COST;
    use serde_json::Value as Json;
    use std::collections::BTreeSet;

    fn user_with_password(plaintext: &str) -> User {
        let now = Utc::now();
        User {
            id: 42,
            username: "alice".to_string(),
            hashed_password: bcrypt::hash(plaintext, MIN_COST).unwrap(),
            email: "alice@example.com".to_string(),
            is_logged_in: false,
            last_logged_date: now,
            created_at: now,
        }
    }

    fn keys(json: &Json) -> BTreeSet<String> {
        json.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_verify_password() {
        let user = user_with_password("s3cret!");

        assert!(user.verify_password("s3cret!").unwrap());
        assert!(!user.verify_password("s3cret").unwrap());
        assert!(!user.verify_password("S3CRET!").unwrap());
        assert!(!user.verify_password("").unwrap());
    }

    #[test]
    fn test_verify_password_with_corrupt_digest() {
        let mut user = user_with_password("s3cret!");
        user.hashed_password = "plaintext-by-mistake".to_string();

        assert!(user.verify_password("s3cret!").is_err());
    }

    #[test]
    fn test_full_projection_has_every_field() {
        let user = user_with_password("pw");
        let json = serde_json::to_value(&user).unwrap();

        let expected: BTreeSet<String> = [
            "id",
            "username",
            "hashed_password",
            "email",
            "is_logged_in",
            "last_logged_date",
            "created_at",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(keys(&json), expected);
    }

    #[test]
    fn test_input_projection_fields() {
        let user = user_with_password("pw");
        let json = serde_json::to_value(UserIn::from(&user)).unwrap();

        let expected: BTreeSet<String> = ["username", "hashed_password", "email"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys(&json), expected);
    }

    #[test]
    fn test_input_projection_rejects_extra_fields() {
        let payload = r#"{"username":"bob","hashed_password":"x","email":"b@x.io","id":3}"#;
        assert!(serde_json::from_str::<UserIn>(payload).is_err());

        let payload = r#"{"username":"bob","hashed_password":"x","email":"b@x.io"}"#;
        let input: UserIn = serde_json::from_str(payload).unwrap();
        assert_eq!(input.username, "bob");
    }

    #[test]
    fn test_token_projection_excludes_password() {
        let user = user_with_password("pw");
        let json = serde_json::to_value(user.token()).unwrap();

        let expected: BTreeSet<String> = ["username", "id", "email"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys(&json), expected);
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["id"], 42);
    }

    #[test]
    fn test_with_password_hashes() {
        let input = tokio_test::block_on(UserIn::with_password(
            "carol",
            "hunter2",
            "carol@example.com",
            MIN_COST,
        ))
        .unwrap();

        assert_ne!(input.hashed_password, "hunter2");
        assert!(password::verify("hunter2", &input.hashed_password).unwrap());
    }

    #[test]
    fn test_save_values_skip_managed_columns() {
        let user = user_with_password("pw");
        let columns: Vec<&str> = user.values().iter().map(|(c, _)| *c).collect();

        assert_eq!(columns, vec!["username", "hashed_password", "email", "is_logged_in"]);
    }
}
