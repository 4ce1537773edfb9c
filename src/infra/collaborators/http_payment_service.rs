use crate::domain::models::job::PaymentNotice;
use crate::domain::ports::PaymentService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

/// Posts escrow release / refund notices to the payment service.
pub struct HttpPaymentService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl PaymentService for HttpPaymentService {
    async fn notify(&self, notice: &PaymentNotice) -> Result<(), AppError> {
        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(notice)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment service connection error: {}", e);
                error!("{}", msg);
                AppError::Collaborator(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Collaborator(msg));
        }

        Ok(())
    }
}
