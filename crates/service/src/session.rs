use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::accounts::domain::UserProfile;

/// Who is signed in. Cloning shares the same slot.
#[derive(Clone, Default)]
pub struct AuthSession {
    current: Arc<RwLock<Option<UserProfile>>>,
}

impl AuthSession {
    pub fn new() -> Self { Self::default() }

    pub async fn sign_in(&self, profile: UserProfile) {
        info!(username = %profile.username, "signed_in");
        *self.current.write().await = Some(profile);
    }

    /// Clears the session and returns the profile that was signed in.
    pub async fn sign_out(&self) -> Option<UserProfile> {
        let previous = self.current.write().await.take();
        if let Some(profile) = &previous {
            info!(username = %profile.username, "signed_out");
        }
        previous
    }

    /// Sign out only if `username` is the signed-in user.
    pub async fn sign_out_user(&self, username: &str) -> bool {
        let mut slot = self.current.write().await;
        if slot.as_ref().is_some_and(|p| p.username == username) {
            *slot = None;
            info!(username, "signed_out");
            return true;
        }
        false
    }

    pub async fn current(&self) -> Option<UserProfile> {
        self.current.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            username: name.to_string(),
            created_at: chrono::Utc::now(),
            last_login: None,
            updated_at: None,
            password_changed_at: None,
            profile: Map::new(),
        }
    }

    #[tokio::test]
    async fn sign_in_and_out() {
        let session = AuthSession::new();
        assert!(!session.is_signed_in().await);

        let shared = session.clone();
        shared.sign_in(profile("ash")).await;
        assert!(session.is_signed_in().await);
        assert_eq!(session.current().await.map(|p| p.username).as_deref(), Some("ash"));

        assert!(!session.sign_out_user("misty").await);
        assert!(session.is_signed_in().await);
        assert!(session.sign_out_user("ash").await);
        assert!(session.sign_out().await.is_none());
    }
}
