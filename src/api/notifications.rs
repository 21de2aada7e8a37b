use reqwest::Method;
use serde_json::Value;

use super::{segment, ApiClient, ClientError, Envelope, PageRequest, Paginated};
use crate::schemas::notification::{Notification, UnreadCount};

impl ApiClient {
    pub async fn notifications(
        &self,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, ClientError> {
        self.get_page("/notifications", &page.to_query(), "notifications").await
    }

    pub async fn unread_notification_count(&self) -> Result<u64, ClientError> {
        let count: UnreadCount = self.get("/notifications/unread/count").await?.into_data()?;
        Ok(count.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::PUT, &format!("/notifications/{}/read", segment(id)?)).await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<Envelope<Value>, ClientError> {
        self.send_empty(Method::PUT, "/notifications/read-all").await
    }
}
