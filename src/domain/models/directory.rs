use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Provider {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StaffMember {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn new(provider_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            name,
            created_at: Utc::now(),
        }
    }
}
