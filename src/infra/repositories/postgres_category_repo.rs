use crate::domain::models::category::ServiceCategory;
use crate::domain::ports::ServiceCategoryRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCategoryRepo {
    pool: PgPool,
}

impl PostgresCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceCategoryRepository for PostgresCategoryRepo {
    async fn create(&self, category: &ServiceCategory) -> Result<ServiceCategory, AppError> {
        sqlx::query_as::<_, ServiceCategory>(
            "INSERT INTO service_categories (id, name, requires_appointment, max_duration_min, advance_booking_days, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.requires_appointment)
        .bind(category.max_duration_min)
        .bind(category.advance_booking_days)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
