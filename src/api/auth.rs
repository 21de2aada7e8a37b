use reqwest::Method;
use serde_json::Value;
use validator::Validate;

use super::{ApiClient, ClientError, Envelope};
use crate::schemas::auth::{
    LoginRequest, LoginResponse, Profile, RefreshRequest, RefreshResponse, RegisterRequest,
};

impl ApiClient {
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        request.validate().map_err(ClientError::invalid)?;
        self.send(Method::POST, "/auth/login", request).await?.into_data()
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Envelope<Value>, ClientError> {
        request.validate().map_err(ClientError::invalid)?;
        self.send(Method::POST, "/auth/register", request).await
    }

    /// Tells the backend the token is no longer used. Local session state is not touched.
    pub async fn logout_remote(&self) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::POST, "/auth/logout").await
    }

    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.get("/auth/profile").await?.into_data()
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let request = RefreshRequest { refresh_token: refresh_token.to_string() };
        self.send(Method::POST, "/auth/refresh", &request).await?.into_data()
    }
}
