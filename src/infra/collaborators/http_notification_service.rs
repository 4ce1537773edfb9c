use crate::domain::models::job::NotificationNotice;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct NotificationPayload<'a> {
    recipient_id: &'a str,
    booking_id: &'a str,
    event_code: &'a str,
    title: &'a str,
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn notify(&self, notice: &NotificationNotice) -> Result<(), AppError> {
        let payload = NotificationPayload {
            recipient_id: &notice.recipient_id,
            booking_id: &notice.booking_id,
            event_code: notice.event_code.as_str(),
            title: notice.event_code.title(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::Collaborator(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Collaborator(msg));
        }

        Ok(())
    }
}
