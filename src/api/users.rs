use reqwest::Method;
use serde_json::Value;
use validator::Validate;

use super::{segment, ApiClient, ClientError, Envelope, PageRequest, Paginated};
use crate::schemas::user::{AssignRole, RoleRecord, User, UserCreate, UserUpdate};

impl ApiClient {
    pub async fn list_users(&self, page: PageRequest) -> Result<Paginated<User>, ClientError> {
        self.get_page("/users", &page.to_query(), "users").await
    }

    pub async fn list_deleted_users(&self, page: PageRequest) -> Result<Paginated<User>, ClientError> {
        self.get_page("/users/deleted", &page.to_query(), "users").await
    }

    pub async fn user(&self, id: &str) -> Result<User, ClientError> {
        self.get(&format!("/users/{}", segment(id)?)).await?.into_data()
    }

    pub async fn create_user(&self, request: &UserCreate) -> Result<Envelope<Value>, ClientError> {
        request.validate().map_err(ClientError::invalid)?;
        self.send(Method::POST, "/users", request).await
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: &UserUpdate,
    ) -> Result<Envelope<Value>, ClientError> {
        request.validate().map_err(ClientError::invalid)?;
        self.send(Method::PUT, &format!("/users/{}", segment(id)?), request).await
    }

    /// Soft delete; the account moves to the deleted listing.
    pub async fn delete_user(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::DELETE, &format!("/users/{}", segment(id)?)).await
    }

    pub async fn restore_user(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::POST, &format!("/users/{}/restore", segment(id)?)).await
    }

    pub async fn hard_delete_user(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::DELETE, &format!("/users/{}/hard-delete", segment(id)?)).await
    }

    pub async fn assign_role(
        &self,
        id: &str,
        request: &AssignRole,
    ) -> Result<Envelope<Value>, ClientError> {
        self.send(Method::PUT, &format!("/users/{}/role", segment(id)?), request).await
    }

    pub async fn roles(&self) -> Result<Vec<RoleRecord>, ClientError> {
        self.get("/roles").await?.into_data()
    }
}
