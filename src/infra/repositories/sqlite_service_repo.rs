use crate::domain::models::service::Service;
use crate::domain::ports::ServiceRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteServiceRepo {
    pool: SqlitePool,
}

impl SqliteServiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepo {
    async fn create(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, shelter_id, category_id, name, description, duration_min, capacity, cost_cents, timezone, schedule_json, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&service.id)
        .bind(&service.shelter_id)
        .bind(&service.category_id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_min)
        .bind(service.capacity)
        .bind(service.cost_cents)
        .bind(&service.timezone)
        .bind(&service.schedule_json)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, shelter_id: &str, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE shelter_id = ? AND id = ?")
            .bind(shelter_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_shelter(&self, shelter_id: &str) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE shelter_id = ? ORDER BY name ASC",
        )
        .bind(shelter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn update(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services
             SET name = ?, description = ?, duration_min = ?, capacity = ?, cost_cents = ?,
                 timezone = ?, schedule_json = ?, is_active = ?, updated_at = ?
             WHERE id = ? AND shelter_id = ?
             RETURNING *",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_min)
        .bind(service.capacity)
        .bind(service.cost_cents)
        .bind(&service.timezone)
        .bind(&service.schedule_json)
        .bind(service.is_active)
        .bind(service.updated_at)
        .bind(&service.id)
        .bind(&service.shelter_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn deactivate(&self, shelter_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE services SET is_active = 0, updated_at = ? WHERE id = ? AND shelter_id = ?",
        )
        .bind(chrono::Utc::now())
        .bind(id)
        .bind(shelter_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".into()));
        }
        Ok(())
    }
}
