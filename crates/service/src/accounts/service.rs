use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::domain::{strip_reserved, CreatedUser, Profile, UserProfile, UserRecord};
use super::errors::AccountError;
use super::password;
use crate::storage::RecordStore;

/// Account operations over a keyed record store.
///
/// Every operation is one load-mutate-save round trip. Mutating operations
/// hold `write_lock` for the whole cycle, so two calls on the same service
/// never interleave their reads and writes.
pub struct AccountService<S> {
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: RecordStore<UserRecord>> AccountService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    /// Register a new user with a salted password hash.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::accounts::{AccountService, domain::{Profile, UserRecord}};
    /// use service::storage::record_store::memory::MemoryRecordStore;
    /// let svc = AccountService::new(Arc::new(MemoryRecordStore::<UserRecord>::default()));
    /// let created = tokio_test::block_on(svc.create_user("alice", "pw", Profile::new())).unwrap();
    /// assert_eq!(created.username, "alice");
    /// ```
    #[instrument(skip(self, password, extra), fields(username = %username))]
    pub async fn create_user(&self, username: &str, password: &str, extra: Profile) -> Result<CreatedUser, AccountError> {
        if username.trim().is_empty() {
            return Err(AccountError::Validation("username must not be empty".into()));
        }
        ensure_password(password)?;

        let _guard = self.write_lock.lock().await;
        if self.store.get(username).await?.is_some() {
            debug!("user exists");
            return Err(AccountError::AlreadyExists);
        }

        let digest = password::hash_password(password);
        let record = UserRecord {
            username: username.to_string(),
            password_hash: digest.hash,
            password_salt: digest.salt,
            created_at: Utc::now(),
            last_login: None,
            updated_at: None,
            password_changed_at: None,
            profile: strip_reserved(extra),
        };
        self.store.put(username, record).await?;
        info!("user_created");
        Ok(CreatedUser { username: username.to_string() })
    }

    /// Verify a password and stamp `lastLogin` on success.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::accounts::{AccountService, AccountError, domain::{Profile, UserRecord}};
    /// use service::storage::record_store::memory::MemoryRecordStore;
    /// let svc = AccountService::new(Arc::new(MemoryRecordStore::<UserRecord>::default()));
    /// tokio_test::block_on(svc.create_user("bob", "secret", Profile::new())).unwrap();
    /// let user = tokio_test::block_on(svc.authenticate_user("bob", "secret")).unwrap();
    /// assert!(user.last_login.is_some());
    /// let wrong = tokio_test::block_on(svc.authenticate_user("bob", "nope"));
    /// assert!(matches!(wrong, Err(AccountError::InvalidCredentials)));
    /// ```
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn authenticate_user(&self, username: &str, password: &str) -> Result<UserProfile, AccountError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.find(username).await?;
        if !password::verify_password(password, &record.password_hash, &record.password_salt) {
            warn!("authentication_failed");
            return Err(AccountError::InvalidCredentials);
        }

        record.last_login = Some(Utc::now());
        self.store.put(username, record.clone()).await?;
        info!("user_authenticated");
        Ok(UserProfile::from(&record))
    }

    /// Merge profile fields. Credential fields, the username and the
    /// store-managed timestamps are dropped from `updates`.
    #[instrument(skip(self, updates), fields(username = %username))]
    pub async fn update_user(&self, username: &str, updates: Profile) -> Result<UserProfile, AccountError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.find(username).await?;

        let updates = strip_reserved(updates);
        debug!(fields = updates.len(), "applying profile update");
        record.profile.extend(updates);
        record.updated_at = Some(Utc::now());

        self.store.put(username, record.clone()).await?;
        info!("user_updated");
        Ok(UserProfile::from(&record))
    }

    /// Replace the password after checking the current one. The new hash gets
    /// a fresh salt.
    #[instrument(skip(self, old_password, new_password), fields(username = %username))]
    pub async fn change_password(&self, username: &str, old_password: &str, new_password: &str) -> Result<(), AccountError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.find(username).await?;
        if !password::verify_password(old_password, &record.password_hash, &record.password_salt) {
            warn!("password_change_rejected");
            return Err(AccountError::InvalidCredentials);
        }
        ensure_password(new_password)?;

        let digest = password::hash_password(new_password);
        record.password_hash = digest.hash;
        record.password_salt = digest.salt;
        record.password_changed_at = Some(Utc::now());

        self.store.put(username, record).await?;
        info!("password_changed");
        Ok(())
    }

    /// Remove the account after confirming its password.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn delete_user(&self, username: &str, password: &str) -> Result<(), AccountError> {
        let _guard = self.write_lock.lock().await;
        let record = self.find(username).await?;
        if !password::verify_password(password, &record.password_hash, &record.password_salt) {
            warn!("account_deletion_rejected");
            return Err(AccountError::InvalidCredentials);
        }

        self.store.delete(username).await?;
        info!("user_deleted");
        Ok(())
    }

    /// Read-only lookup of the sanitized record.
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, AccountError> {
        let record = self.find(username).await?;
        Ok(UserProfile::from(&record))
    }

    async fn find(&self, username: &str) -> Result<UserRecord, AccountError> {
        self.store.get(username).await?.ok_or(AccountError::NotFound)
    }
}

fn ensure_password(password: &str) -> Result<(), AccountError> {
    if password.is_empty() {
        return Err(AccountError::Validation("password must not be empty".into()));
    }
    Ok(())
}
