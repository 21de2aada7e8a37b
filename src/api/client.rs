use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::envelope::{error_message, is_error_envelope, Envelope, EnvelopeStatus, Paginated};
use super::errors::ClientError;
use crate::core::config::{ApiUrl, Settings};
use crate::core::metrics;
use crate::session::SessionStore;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Thin wrapper over the REST backend. One typed call is one HTTP request: no retries,
/// no caching, no business rules.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: ApiUrl,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn from_settings(settings: &Settings, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let backend = settings.backend();
        let http = Client::builder()
            .connect_timeout(backend.connect_timeout())
            .timeout(backend.request_timeout())
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self { http, base_url: backend.api_url().clone(), session })
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        let body = self.dispatch(Method::GET, path, &[], Body::Empty).await?;
        decode(body)
    }

    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        key: &str,
    ) -> Result<Paginated<T>, ClientError> {
        let body = self.dispatch(Method::GET, path, query, Body::Empty).await?;
        Paginated::from_value(body, key)
    }

    pub(crate) async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<Envelope<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(payload)
            .map_err(|err| ClientError::Validation(format!("invalid request body: {err}")))?;
        decode(self.dispatch(method, path, &[], Body::Json(payload)).await?)
    }

    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Envelope<T>, ClientError> {
        decode(self.dispatch(method, path, &[], Body::Empty).await?)
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<Envelope<T>, ClientError> {
        decode(self.dispatch(Method::POST, path, &[], Body::Multipart(form)).await?)
    }

    fn prepare(&self, method: &Method, path: &str, request_id: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url.as_str(), path);
        let mut builder = self.http.request(method.clone(), url).header(REQUEST_ID_HEADER, request_id);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Value, ClientError> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self.prepare(&method, path, &request_id);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = match body {
            Body::Empty => builder,
            Body::Json(payload) => builder.json(&payload),
            Body::Multipart(form) => builder.multipart(form),
        };

        metrics::record_request(&method);
        let started = Instant::now();
        tracing::debug!(method = %method, path, request_id = %request_id, "api request");

        let result = self.execute(builder).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                tracing::debug!(method = %method, path, request_id = %request_id, elapsed_ms, "api response");
            }
            Err(err) => {
                metrics::record_failure(&method, err.kind());
                tracing::warn!(
                    method = %method,
                    path,
                    request_id = %request_id,
                    elapsed_ms,
                    status = err.status(),
                    error = %err,
                    "api request failed"
                );
                if err.is_unauthorized() {
                    self.session.invalidate("backend rejected credentials").await;
                }
            }
        }

        result
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, ClientError> {
        let response = builder.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        let raw = response.text().await.map_err(ClientError::Network)?;

        let parsed = if raw.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&raw)
        };

        match parsed {
            Ok(body) if !status.is_success() || is_error_envelope(&body) => {
                Err(ClientError::Server { status: status.as_u16(), message: failure_message(status, &body) })
            }
            Ok(body) => Ok(body),
            Err(_) if !status.is_success() => {
                Err(ClientError::Server { status: status.as_u16(), message: fallback_message(status, &raw) })
            }
            Err(err) => Err(ClientError::Decode(format!("response is not JSON: {err}"))),
        }
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<Envelope<T>, ClientError> {
    if body.is_null() {
        return Ok(Envelope { status: EnvelopeStatus::Success, message: None, data: None, error: None });
    }
    serde_json::from_value(body).map_err(|err| ClientError::Decode(err.to_string()))
}

fn failure_message(status: StatusCode, body: &Value) -> String {
    error_message(body).unwrap_or_else(|| fallback_message(status, ""))
}

fn fallback_message(status: StatusCode, raw: &str) -> String {
    let raw = raw.trim();
    if !raw.is_empty() && raw.len() <= 200 {
        return raw.to_string();
    }
    status.canonical_reason().unwrap_or("Request failed").to_string()
}
