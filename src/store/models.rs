use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as persisted in the accounts collection.
///
/// The password is stored and compared as plain text. That is the documented
/// contract inherited from the original system, not an oversight; see
/// `auth::verify_password` for the single place the comparison happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One in-flight password-reset code challenge.
///
/// `id` is always the normalized login id, so the upsert-by-id contract
/// guarantees at most one outstanding request per login: a new request for
/// the same login replaces the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub id: String,
    pub login_id: String,
    pub code: String,
    pub attempts: u32,
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResetRequest {
    pub fn attempts_left(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

/// Trim and lowercase a login identifier (username or email) for lookup
/// and keying purposes.
pub fn normalize_login_id(login_id: &str) -> String {
    login_id.trim().to_lowercase()
}
