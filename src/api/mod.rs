//! Typed access to the REST backend.

mod academic;
mod achievements;
mod auth;
mod client;
mod envelope;
mod errors;
mod files;
mod notifications;
mod reports;
mod users;

pub use achievements::AchievementQuery;
pub use client::ApiClient;
pub use envelope::{Envelope, EnvelopeStatus, PageRequest, Paginated};
pub use errors::ClientError;
pub use files::{FileUpload, MAX_UPLOAD_BYTES};

/// Validates a value interpolated into a request path.
pub(crate) fn segment(value: &str) -> Result<&str, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        return Err(ClientError::Validation(format!("Invalid identifier: {value:?}")));
    }
    Ok(trimmed)
}
