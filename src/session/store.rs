use std::sync::Arc;

use parking_lot::RwLock;
use time::OffsetDateTime;

use super::storage::{SessionStorage, StorageKey};
use super::token;
use crate::schemas::auth::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    token: String,
    profile: Profile,
    /// Kept in memory only; a restored session has none.
    refresh_token: Option<String>,
}

/// Who is logged in. A token never exists without its profile and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: String, profile: Profile) -> Self {
        Self { credentials: Some(Credentials { token, profile, refresh_token: None }) }
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        if let Some(credentials) = self.credentials.as_mut() {
            credentials.refresh_token = refresh_token;
        }
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|credentials| credentials.token.as_str())
    }

    pub fn user(&self) -> Option<&Profile> {
        self.credentials.as_ref().map(|credentials| &credentials.profile)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.as_ref().and_then(|credentials| credentials.refresh_token.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Single source of truth for the current session, mirrored to durable storage.
pub struct SessionStore {
    current: RwLock<Session>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { current: RwLock::new(Session::anonymous()), storage }
    }

    /// A consistent copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.current.read().clone()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.current.read().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().token().map(str::to_string)
    }

    /// Installs a new session. Persistence failures are logged; the in-memory session is
    /// replaced regardless.
    pub async fn login(&self, token: String, profile: Profile) {
        self.install(token, None, profile).await;
    }

    /// Like [`SessionStore::login`], also keeping the refresh token for this process.
    pub async fn login_with_refresh(&self, token: String, refresh_token: Option<String>, profile: Profile) {
        self.install(token, refresh_token, profile).await;
    }

    async fn install(&self, token: String, refresh_token: Option<String>, profile: Profile) {
        let user_json = serde_json::to_string(&profile);
        let user_id = profile.id.clone();
        let role = profile.role;

        *self.current.write() = Session::authenticated(token.clone(), profile).with_refresh_token(refresh_token);
        tracing::info!(user_id = %user_id, role = %role, "session started");

        let user_json = match user_json {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize profile; session not persisted");
                return;
            }
        };

        if let Err(err) = self.storage.write(StorageKey::User, &user_json).await {
            tracing::warn!(error = %err, "Failed to persist session profile");
            return;
        }
        if let Err(err) = self.storage.write(StorageKey::Token, &token).await {
            tracing::warn!(error = %err, "Failed to persist session token");
        }
    }

    /// Clears the session in memory and in durable storage. Safe to call repeatedly.
    pub async fn logout(&self) {
        let previous = std::mem::take(&mut *self.current.write());
        if let Some(user) = previous.user() {
            tracing::info!(user_id = %user.id, "session ended");
        }
        self.clear_storage().await;
    }

    /// Ends the session because the backend rejected its credentials.
    pub async fn invalidate(&self, reason: &str) {
        if self.current.read().is_authenticated() {
            tracing::warn!(reason, "session invalidated");
        }
        self.logout().await;
    }

    /// Swaps in a refreshed access token, keeping the profile. Returns false when no
    /// session is active.
    pub async fn replace_token(&self, token: String, refresh_token: Option<String>) -> bool {
        {
            let mut current = self.current.write();
            let Some(credentials) = current.credentials.as_mut() else {
                return false;
            };
            credentials.token = token.clone();
            credentials.refresh_token = refresh_token;
            tracing::info!(user_id = %credentials.profile.id, "session token refreshed");
        }

        if let Err(err) = self.storage.write(StorageKey::Token, &token).await {
            tracing::warn!(error = %err, "Failed to persist refreshed token");
        }
        true
    }

    /// Replaces the cached profile of the active session; without a session this is a no-op.
    pub async fn update_profile(&self, profile: Profile) {
        {
            let mut current = self.current.write();
            let Some(credentials) = current.credentials.as_mut() else {
                return;
            };
            credentials.profile = profile.clone();
        }

        match serde_json::to_string(&profile) {
            Ok(user_json) => {
                if let Err(err) = self.storage.write(StorageKey::User, &user_json).await {
                    tracing::warn!(error = %err, "Failed to persist updated profile");
                }
            }
            Err(err) => tracing::warn!(error = %err, "Failed to serialize profile"),
        }
    }

    /// Loads a previously persisted session. Both entries must be present and the profile
    /// must parse; an expired JWT clears the stored entries instead.
    pub async fn restore(&self) -> Option<Profile> {
        let token = self.read_entry(StorageKey::Token).await;
        let user_json = self.read_entry(StorageKey::User).await;

        let (Some(token), Some(user_json)) = (token, user_json) else {
            return None;
        };

        let profile = match serde_json::from_str::<Profile>(&user_json) {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(error = %err, "Stored profile is unreadable; discarding session");
                self.clear_storage().await;
                return None;
            }
        };

        if token::is_expired(&token, OffsetDateTime::now_utc()) {
            tracing::info!(user_id = %profile.id, "stored session expired; discarding");
            self.clear_storage().await;
            return None;
        }

        *self.current.write() = Session::authenticated(token, profile.clone());
        tracing::info!(user_id = %profile.id, role = %profile.role, "session restored");
        Some(profile)
    }

    async fn read_entry(&self, key: StorageKey) -> Option<String> {
        match self.storage.read(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, key = key.as_str(), "Failed to read session storage");
                None
            }
        }
    }

    async fn clear_storage(&self) {
        for key in [StorageKey::Token, StorageKey::User] {
            if let Err(err) = self.storage.remove(key).await {
                tracing::warn!(error = %err, key = key.as_str(), "Failed to clear session storage");
            }
        }
    }
}
