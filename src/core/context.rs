use std::sync::Arc;

use crate::api::{ApiClient, ClientError};
use crate::auth::{self, GateDecision};
use crate::core::config::Settings;
use crate::schemas::auth::{LoginRequest, Profile};
use crate::session::{FileStorage, Session, SessionStorage, SessionStore};

/// Everything a view needs: settings, the session store and the API client. Cheap to
/// clone; every clone shares the same session.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<InnerContext>,
}

struct InnerContext {
    settings: Settings,
    session: Arc<SessionStore>,
    api: ApiClient,
}

impl AppContext {
    /// Builds the context with file-backed session storage and restores any persisted
    /// session.
    pub async fn init(settings: Settings) -> anyhow::Result<Self> {
        let storage = Arc::new(FileStorage::new(settings.session().dir()));
        Self::with_storage(settings, storage).await
    }

    pub async fn with_storage(
        settings: Settings,
        storage: Arc<dyn SessionStorage>,
    ) -> anyhow::Result<Self> {
        let session = Arc::new(SessionStore::new(storage));
        let api = ApiClient::from_settings(&settings, session.clone())?;

        if let Some(profile) = session.restore().await {
            tracing::debug!(user_id = %profile.id, "resumed persisted session");
        }

        tracing::info!(
            api_url = %settings.backend().api_url().as_str(),
            environment = settings.runtime().environment.as_str(),
            "application context ready"
        );

        Ok(Self { inner: Arc::new(InnerContext { settings, session, api }) })
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn snapshot(&self) -> Session {
        self.inner.session.snapshot()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.inner.session.current_user()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.settings.listing().page_size()
    }

    pub fn navigate(&self, path: &str) -> GateDecision {
        auth::navigate(path, &self.snapshot())
    }

    /// Authenticates against the backend and installs the returned session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Profile, ClientError> {
        let request = LoginRequest { username: username.trim().to_string(), password: password.to_string() };
        let response = self.inner.api.login(&request).await?;
        let profile = response.user;
        self.inner.session.login_with_refresh(response.token, response.refresh_token, profile.clone()).await;
        Ok(profile)
    }

    /// Trades the refresh token from this login for a new access token. The backend may
    /// rotate the refresh token; otherwise the current one is kept.
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let refresh_token = self
            .inner
            .session
            .snapshot()
            .refresh_token()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Validation("No refresh token; log in again".to_string()))?;

        let response = self.inner.api.refresh(&refresh_token).await?;
        let next = response.refresh_token.unwrap_or(refresh_token);
        if !self.inner.session.replace_token(response.token, Some(next)).await {
            return Err(ClientError::Authorization(GateDecision::RedirectToLogin));
        }
        Ok(())
    }

    /// Ends the session locally even when the backend cannot be told about it.
    pub async fn logout(&self) {
        if self.inner.session.snapshot().is_authenticated() {
            if let Err(err) = self.inner.api.logout_remote().await {
                tracing::warn!(error = %err, "Backend logout failed; clearing local session anyway");
            }
        }
        self.inner.session.logout().await;
    }

    /// Re-reads the profile from the backend and caches it in the session.
    pub async fn refresh_profile(&self) -> Result<Profile, ClientError> {
        let profile = self.inner.api.profile().await?;
        self.inner.session.update_profile(profile.clone()).await;
        Ok(profile)
    }

    pub async fn shutdown(self) {
        let authenticated = self.inner.session.snapshot().is_authenticated();
        tracing::info!(authenticated, "application context shut down");
    }
}
