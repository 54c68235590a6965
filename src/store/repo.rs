//! Typed accessor over the two auth collections.
//!
//! Every operation here is a full read-modify-write of one collection file.
//! There is no locking: two concurrent writers to the same collection race,
//! and the later `write_all` silently discards the earlier writer's update.
//! That lost-update window is a known structural limitation of the flat-file
//! store, kept deliberately (and pinned by a test below) rather than hidden
//! behind a lock.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

use super::{normalize_login_id, Account, JsonStore, ResetRequest};

const ACCOUNTS_FILE: &str = "accounts.json";
const RESET_REQUESTS_FILE: &str = "reset-requests.json";

pub struct AuthRepository {
    accounts: JsonStore<Account>,
    reset_requests: JsonStore<ResetRequest>,
}

impl AuthRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            accounts: JsonStore::new(data_dir.join(ACCOUNTS_FILE)),
            reset_requests: JsonStore::new(data_dir.join(RESET_REQUESTS_FILE)),
        }
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.accounts.read_all().await
    }

    /// Find the first account whose username or email matches the login id
    /// case-insensitively (both sides trimmed and lowercased).
    pub async fn find_account_by_login(&self, login_id: &str) -> Result<Option<Account>> {
        let needle = normalize_login_id(login_id);
        let accounts = self.accounts.read_all().await?;
        Ok(accounts.into_iter().find(|a| {
            normalize_login_id(&a.username) == needle || normalize_login_id(&a.email) == needle
        }))
    }

    /// Replace the account with a matching id in place, or append it, then
    /// persist the whole collection.
    pub async fn upsert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.read_all().await?;
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
        self.accounts.write_all(&accounts).await
    }

    pub async fn find_reset_request_by_login(
        &self,
        login_id: &str,
    ) -> Result<Option<ResetRequest>> {
        let id = normalize_login_id(login_id);
        let requests = self.reset_requests.read_all().await?;
        Ok(requests.into_iter().find(|r| r.id == id))
    }

    pub async fn upsert_reset_request(&self, request: ResetRequest) -> Result<()> {
        let mut requests = self.reset_requests.read_all().await?;
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
        self.reset_requests.write_all(&requests).await
    }

    /// Remove any pending reset request for the login. A no-op (no write)
    /// when nothing matched.
    pub async fn delete_reset_request(&self, login_id: &str) -> Result<()> {
        let id = normalize_login_id(login_id);
        let mut requests = self.reset_requests.read_all().await?;
        let before = requests.len();
        requests.retain(|r| r.id != id);
        if requests.len() != before {
            self.reset_requests.write_all(&requests).await?;
        }
        Ok(())
    }

    /// Drop every reset request whose expiry is at or before `now`. Writes
    /// back only if something was removed.
    pub async fn sweep_expired_reset_requests(&self, now: DateTime<Utc>) -> Result<()> {
        let mut requests = self.reset_requests.read_all().await?;
        let before = requests.len();
        requests.retain(|r| r.expires_at > now);
        if requests.len() != before {
            debug!(swept = before - requests.len(), "Swept expired reset requests");
            self.reset_requests.write_all(&requests).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(id: &str, username: &str, email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            password: "secret".into(),
            name: username.into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn reset_request(login_id: &str, expires_at: DateTime<Utc>) -> ResetRequest {
        ResetRequest {
            id: normalize_login_id(login_id),
            login_id: normalize_login_id(login_id),
            code: "123456".into(),
            attempts: 0,
            max_attempts: 5,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn login_lookup_matches_username_and_email_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AuthRepository::new(dir.path());
        repo.upsert_account(account("1", "jdoe", "jane.doe@example.com"))
            .await
            .unwrap();

        assert!(repo.find_account_by_login("JDoe").await.unwrap().is_some());
        assert!(repo
            .find_account_by_login("  Jane.Doe@Example.COM ")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_account_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_and_appends_otherwise() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AuthRepository::new(dir.path());
        repo.upsert_account(account("1", "jdoe", "jane@example.com"))
            .await
            .unwrap();
        repo.upsert_account(account("2", "asmith", "alex@example.com"))
            .await
            .unwrap();

        let mut updated = account("1", "jdoe", "jane@example.com");
        updated.password = "new-secret".into();
        repo.upsert_account(updated).await.unwrap();

        let accounts = repo.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].password, "new-secret");
        assert_eq!(accounts[1].username, "asmith");
    }

    #[tokio::test]
    async fn second_reset_request_for_a_login_replaces_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AuthRepository::new(dir.path());
        let expires = Utc::now() + Duration::minutes(15);

        repo.upsert_reset_request(reset_request("jdoe", expires))
            .await
            .unwrap();
        let mut second = reset_request("JDoe", expires);
        second.code = "654321".into();
        repo.upsert_reset_request(second).await.unwrap();

        let stored = repo
            .find_reset_request_by_login("jdoe")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.code, "654321");
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_requests() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AuthRepository::new(dir.path());
        let now = Utc::now();

        repo.upsert_reset_request(reset_request("stale", now - Duration::minutes(1)))
            .await
            .unwrap();
        repo.upsert_reset_request(reset_request("boundary", now))
            .await
            .unwrap();
        repo.upsert_reset_request(reset_request("fresh", now + Duration::minutes(10)))
            .await
            .unwrap();

        repo.sweep_expired_reset_requests(now).await.unwrap();

        assert!(repo
            .find_reset_request_by_login("stale")
            .await
            .unwrap()
            .is_none());
        // expires_at <= now is expired, so the boundary case goes too
        assert!(repo
            .find_reset_request_by_login("boundary")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_reset_request_by_login("fresh")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn concurrent_writers_lose_the_earlier_update() {
        // Two writers each read the collection, then each write their own
        // modified copy. The later write_all wins and the earlier writer's
        // record disappears. This pins the store's documented lost-update
        // window.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let writer_a: JsonStore<Account> = JsonStore::new(&path);
        let writer_b: JsonStore<Account> = JsonStore::new(&path);

        let seen_by_a = writer_a.read_all().await.unwrap();
        let seen_by_b = writer_b.read_all().await.unwrap();

        let mut with_a = seen_by_a;
        with_a.push(account("a", "alice", "alice@example.com"));
        writer_a.write_all(&with_a).await.unwrap();

        let mut with_b = seen_by_b;
        with_b.push(account("b", "bob", "bob@example.com"));
        writer_b.write_all(&with_b).await.unwrap();

        let final_state = writer_a.read_all().await.unwrap();
        assert_eq!(final_state.len(), 1);
        assert_eq!(final_state[0].id, "b");
    }
}
