use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::errors::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// `{status, message?, data?, error?}`, returned to callers as received.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, ClientError> {
        self.data.ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }
}

/// One page of a listing. The backend wraps rows either as
/// `{pagination: {page, limit, total, total_pages, data: {<key>: [..]}}}` or as
/// `{data: {<key>: [..], pagination: {page, limit, total}}}`; both decode here.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub message: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub items: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self { message: None, page: 1, limit: 0, total: 0, total_pages: 0, items: Vec::new() }
    }
}

impl<T: DeserializeOwned> Paginated<T> {
    pub(crate) fn from_value(mut body: Value, key: &str) -> Result<Self, ClientError> {
        let message = body.get("message").and_then(Value::as_str).map(str::to_string);

        let (meta, rows) = match body.get_mut("pagination").map(Value::take) {
            Some(mut pagination) if pagination.get("data").is_some() => {
                let rows = extract_rows(pagination.get_mut("data").map(Value::take), key);
                (Some(pagination), rows)
            }
            _ => {
                let mut data = body.get_mut("data").map(Value::take);
                let meta = data.as_mut().and_then(|data| data.get_mut("pagination")).map(Value::take);
                (meta, extract_rows(data, key))
            }
        };

        let items: Vec<T> = serde_json::from_value(rows)
            .map_err(|err| ClientError::Decode(format!("invalid {key} listing: {err}")))?;

        let field = |name: &str| meta.as_ref().and_then(|meta| meta.get(name)).and_then(Value::as_u64);
        let item_count = items.len() as u64;
        let page = field("page").unwrap_or(1).max(1) as u32;
        let limit = field("limit").unwrap_or(item_count) as u32;
        let total = field("total").unwrap_or(item_count);
        let total_pages = field("total_pages")
            .or_else(|| field("totalPages"))
            .map(|pages| pages as u32)
            .unwrap_or_else(|| page_count(total, limit));

        Ok(Self { message, page, limit, total, total_pages, items })
    }
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `page`/`limit` query for listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    pub(crate) fn to_query(self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}

fn extract_rows(data: Option<Value>, key: &str) -> Value {
    match data {
        Some(Value::Array(rows)) => Value::Array(rows),
        Some(mut data) => match data.get_mut(key).map(Value::take) {
            Some(Value::Array(rows)) => Value::Array(rows),
            _ => Value::Array(Vec::new()),
        },
        None => Value::Array(Vec::new()),
    }
}

fn page_count(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit)) as u32
}

/// Message of an error envelope: `message`, else `error`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .into_iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

pub(crate) fn is_error_envelope(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some("error")
}
