use crate::domain::{models::directory::StaffMember, ports::StaffDirectory};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteStaffRepo {
    pool: SqlitePool,
}

impl SqliteStaffRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffDirectory for SqliteStaffRepo {
    async fn create(&self, staff: &StaffMember) -> Result<StaffMember, AppError> {
        sqlx::query_as::<_, StaffMember>(
            "INSERT INTO staff_members (id, provider_id, name, created_at) VALUES (?, ?, ?, ?) RETURNING *"
        )
            .bind(&staff.id)
            .bind(&staff.provider_id)
            .bind(&staff.name)
            .bind(staff.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StaffMember>, AppError> {
        sqlx::query_as::<_, StaffMember>("SELECT * FROM staff_members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_provider(&self, provider_id: &str) -> Result<Vec<StaffMember>, AppError> {
        sqlx::query_as::<_, StaffMember>(
            "SELECT * FROM staff_members WHERE provider_id = ? ORDER BY created_at ASC"
        )
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
