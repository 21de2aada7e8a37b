use reqwest::Method;
use serde_json::Value;
use validator::Validate;

use super::files::FileUpload;
use super::{segment, ApiClient, ClientError, Envelope, PageRequest, Paginated};
use crate::schemas::achievement::{
    Achievement, AchievementDraft, AchievementHistory, RejectRequest, VerifyRequest,
};
use crate::workflow::AchievementStatus;

/// Filters for the achievement listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementQuery {
    pub page: PageRequest,
    pub status: Option<AchievementStatus>,
}

impl AchievementQuery {
    pub fn new(page: PageRequest) -> Self {
        Self { page, status: None }
    }

    pub fn with_status(mut self, status: Option<AchievementStatus>) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn to_query(self) -> Vec<(&'static str, String)> {
        let mut query = self.page.to_query();
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}

impl ApiClient {
    pub async fn list_achievements(
        &self,
        query: AchievementQuery,
    ) -> Result<Paginated<Achievement>, ClientError> {
        self.get_page("/achievements", &query.to_query(), "achievements").await
    }

    pub async fn achievement(&self, id: &str) -> Result<Achievement, ClientError> {
        self.get(&format!("/achievements/{}", segment(id)?)).await?.into_data()
    }

    pub async fn create_achievement(
        &self,
        draft: &AchievementDraft,
    ) -> Result<Envelope<Value>, ClientError> {
        draft.validate().map_err(ClientError::invalid)?;
        self.send(Method::POST, "/achievements", draft).await
    }

    pub async fn update_achievement(
        &self,
        id: &str,
        draft: &AchievementDraft,
    ) -> Result<Envelope<Value>, ClientError> {
        draft.validate().map_err(ClientError::invalid)?;
        self.send(Method::PUT, &format!("/achievements/{}", segment(id)?), draft).await
    }

    pub async fn delete_achievement(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::DELETE, &format!("/achievements/{}", segment(id)?)).await
    }

    pub async fn submit_achievement(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::POST, &format!("/achievements/{}/submit", segment(id)?)).await
    }

    pub async fn verify_achievement(
        &self,
        id: &str,
        request: &VerifyRequest,
    ) -> Result<Envelope<Value>, ClientError> {
        self.send(Method::POST, &format!("/achievements/{}/verify", segment(id)?), request).await
    }

    pub async fn reject_achievement(
        &self,
        id: &str,
        request: &RejectRequest,
    ) -> Result<Envelope<Value>, ClientError> {
        if request.reason.trim().is_empty() {
            return Err(ClientError::Validation("Rejection reason is required".to_string()));
        }
        self.send(Method::POST, &format!("/achievements/{}/reject", segment(id)?), request).await
    }

    pub async fn achievement_history(&self, id: &str) -> Result<AchievementHistory, ClientError> {
        self.get(&format!("/achievements/{}/history", segment(id)?)).await?.into_data()
    }

    pub async fn upload_attachment(
        &self,
        id: &str,
        file: FileUpload,
    ) -> Result<Envelope<Value>, ClientError> {
        let path = format!("/achievements/{}/attachments", segment(id)?);
        self.send_multipart(&path, file.into_form()?).await
    }
}
