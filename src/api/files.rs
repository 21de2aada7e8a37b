use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

use super::{segment, ApiClient, ClientError, Envelope};
use crate::schemas::achievement::UploadedFile;

/// Largest upload the backend accepts.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A file to send as the `file` field of a multipart body.
#[derive(Debug, Clone)]
pub struct FileUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::Validation("File must have a name".to_string()))?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ClientError::Validation(format!("Failed to read {}: {err}", path.display()))
        })?;
        let content_type = content_type_for(&file_name).to_string();
        Ok(Self { file_name, content_type, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub(crate) fn into_form(self) -> Result<Form, ClientError> {
        if self.bytes.is_empty() {
            return Err(ClientError::Validation("File is empty".to_string()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ClientError::Validation("File exceeds the 10 MB limit".to_string()));
        }

        let part = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|err| ClientError::Validation(format!("Invalid content type: {err}")))?;
        Ok(Form::new().part("file", part))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

impl ApiClient {
    pub async fn upload_file(&self, file: FileUpload) -> Result<UploadedFile, ClientError> {
        self.send_multipart("/files/upload", file.into_form()?).await?.into_data()
    }

    pub async fn delete_file(&self, file_name: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::DELETE, &format!("/files/{}", segment(file_name)?)).await
    }
}
