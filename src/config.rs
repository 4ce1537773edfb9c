use std::env;

use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub payment_service_url: String,
    pub notification_service_url: String,
    pub collaborator_token: String,
    pub worker_poll_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Validation("DATABASE_URL must be set".into()))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| AppError::Validation("PORT must be a number".into()))?;

        let worker_poll_secs = env::var("WORKER_POLL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| AppError::Validation("WORKER_POLL_SECS must be a number".into()))?;

        Ok(Self {
            database_url,
            port,
            payment_service_url: env::var("PAYMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8100/api/v1/escrow/events".to_string()),
            notification_service_url: env::var("NOTIFICATION_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8200/api/v1/notifications".to_string()),
            collaborator_token: env::var("COLLABORATOR_TOKEN")
                .unwrap_or_else(|_| "dev-token".to_string()),
            worker_poll_secs,
        })
    }
}
