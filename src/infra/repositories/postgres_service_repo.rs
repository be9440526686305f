use crate::domain::models::service::Service;
use crate::domain::ports::ServiceRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresServiceRepo {
    pool: PgPool,
}

impl PostgresServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepo {
    async fn create(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, shelter_id, category_id, name, description, duration_min, capacity, cost_cents, timezone, schedule_json, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
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
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE shelter_id = $1 AND id = $2")
            .bind(shelter_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_shelter(&self, shelter_id: &str) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE shelter_id = $1 ORDER BY name ASC",
        )
        .bind(shelter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn update(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services
             SET name = $1, description = $2, duration_min = $3, capacity = $4, cost_cents = $5,
                 timezone = $6, schedule_json = $7, is_active = $8, updated_at = $9
             WHERE id = $10 AND shelter_id = $11
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
            "UPDATE services SET is_active = FALSE, updated_at = $1 WHERE id = $2 AND shelter_id = $3",
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
