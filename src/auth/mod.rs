//! Session issuing, validation, and the password-reset-by-code state machine.

mod sessions;

pub use sessions::{Session, SessionStore};

use chrono::{Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::store::{normalize_login_id, Account, AuthRepository, ResetRequest};

/// Fixed session lifetime.
const SESSION_TTL_HOURS: i64 = 8;
/// Fixed reset-code lifetime.
const RESET_CODE_TTL_MINUTES: i64 = 15;
/// Verification attempts allowed per reset request.
const MAX_RESET_ATTEMPTS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Outcome of one reset-code verification attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub valid: bool,
    pub attempts_left: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl VerifyOutcome {
    fn rejected() -> Self {
        Self {
            valid: false,
            attempts_left: 0,
            expired: None,
        }
    }
}

/// Compare a supplied password against the stored one.
///
/// Plain-text equality is the documented contract carried over from the
/// original system. Keeping the comparison behind this one function means a
/// salted hash with a constant-time compare can replace it later without
/// touching any caller.
pub fn verify_password(supplied: &str, stored: &str) -> bool {
    supplied == stored
}

/// Generate an opaque session token: 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Generate a uniformly random 6-digit numeric code.
fn generate_reset_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000u32))
}

pub struct AuthService {
    repo: AuthRepository,
    sessions: SessionStore,
    bootstrap: AuthConfig,
}

impl AuthService {
    pub fn new(repo: AuthRepository, bootstrap: AuthConfig) -> Self {
        Self {
            repo,
            sessions: SessionStore::new(),
            bootstrap,
        }
    }

    /// Idempotent bootstrap: seed the administrative account when the
    /// accounts collection is empty, otherwise do nothing. Called once at
    /// process start.
    pub async fn initialize(&self) -> Result<(), AuthError> {
        if !self.repo.list_accounts().await?.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let admin = Account {
            id: uuid::Uuid::new_v4().to_string(),
            username: self.bootstrap.admin_username.clone(),
            email: self.bootstrap.admin_email.clone(),
            password: self.bootstrap.admin_password.clone(),
            name: self.bootstrap.admin_name.clone(),
            created_at: now,
            updated_at: now,
        };
        info!(username = %admin.username, "Seeding bootstrap account");
        self.repo.upsert_account(admin).await?;
        Ok(())
    }

    /// Authenticate and mint a session with a fixed 8-hour lifetime.
    pub async fn login(&self, login_id: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .repo
            .find_account_by_login(login_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: generate_token(),
            user_id: account.id,
            username: account.username,
            email: account.email,
            name: account.name,
            issued_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        };
        self.sessions.insert(session.clone());
        info!(username = %session.username, "Login succeeded");
        Ok(session)
    }

    /// Drop the session if it exists. Unknown tokens are not an error.
    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Return the live session for the token, evicting it first if its
    /// deadline has passed.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token, Utc::now())
    }

    /// Create (or replace) the outstanding reset request for a login and
    /// return it. Expired requests across the whole collection are swept
    /// first. Delivering the code to the user is the caller's concern; this
    /// core only produces and persists it.
    pub async fn request_reset_code(&self, login_id: &str) -> Result<ResetRequest, AuthError> {
        let now = Utc::now();
        self.repo.sweep_expired_reset_requests(now).await?;

        let id = normalize_login_id(login_id);
        let request = ResetRequest {
            id: id.clone(),
            login_id: id,
            code: generate_reset_code(),
            attempts: 0,
            max_attempts: MAX_RESET_ATTEMPTS,
            created_at: now,
            expires_at: now + Duration::minutes(RESET_CODE_TTL_MINUTES),
        };
        self.repo.upsert_reset_request(request.clone()).await?;
        info!(login_id = %request.login_id, "Issued password reset code");
        Ok(request)
    }

    /// Run one step of the reset-code state machine.
    ///
    /// Ordering matters: a missing request and an expired request are
    /// answered before any attempt is consumed (expiry never costs an
    /// attempt); an exhausted budget is a hard lockout that not even the
    /// correct code escapes; otherwise the attempt is consumed and persisted
    /// before the code comparison happens, so the very last permitted
    /// attempt can still succeed while a wrong one locks the request for
    /// good.
    pub async fn verify_reset_code(
        &self,
        login_id: &str,
        code: &str,
    ) -> Result<VerifyOutcome, AuthError> {
        let mut request = match self.repo.find_reset_request_by_login(login_id).await? {
            Some(request) => request,
            None => return Ok(VerifyOutcome::rejected()),
        };

        let now = Utc::now();
        if now > request.expires_at {
            return Ok(VerifyOutcome {
                valid: false,
                attempts_left: request.attempts_left(),
                expired: Some(true),
            });
        }

        if request.attempts >= request.max_attempts {
            return Ok(VerifyOutcome::rejected());
        }

        request.attempts += 1;
        self.repo.upsert_reset_request(request.clone()).await?;

        if request.attempts >= request.max_attempts && code != request.code {
            warn!(login_id = %request.login_id, "Reset request locked out");
            return Ok(VerifyOutcome::rejected());
        }

        Ok(VerifyOutcome {
            valid: code == request.code,
            attempts_left: request.attempts_left(),
            expired: None,
        })
    }

    /// Overwrite the account password and drop any pending reset request
    /// for the login. Whether a code was ever verified is not checked here;
    /// that ordering is the caller's responsibility.
    pub async fn reset_password(
        &self,
        login_id: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut account = self
            .repo
            .find_account_by_login(login_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        account.password = new_password.to_string();
        account.updated_at = Utc::now();
        self.repo.upsert_account(account).await?;
        self.repo.delete_reset_request(login_id).await?;
        info!(login_id = %normalize_login_id(login_id), "Password reset");
        Ok(())
    }
}
