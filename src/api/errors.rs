use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::GateDecision;
use crate::workflow::WorkflowError;

/// Every way a client operation can fail. None of them is fatal: each is recovered by
/// retrying the action, correcting input or logging in again.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),
    /// The backend answered with a non-2xx status or an error envelope. `message` is
    /// the backend's own text.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    /// Client-side input checks failed; nothing was sent.
    #[error("{0}")]
    Validation(String),
    #[error("navigation denied")]
    Authorization(GateDecision),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl ClientError {
    pub(crate) fn invalid(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }

    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the server. Check your connection.".to_string(),
            Self::Authorization(_) => "You are not allowed to open this page.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Server { .. } => "server",
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::Authorization(_) => "authorization",
            Self::Workflow(_) => "workflow",
        }
    }
}
