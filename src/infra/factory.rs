use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::booking_service::BookingService;
use crate::infra::notify::http_reminder_notifier::HttpReminderNotifier;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_category_repo::PostgresCategoryRepo,
    postgres_service_repo::PostgresServiceRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_category_repo::SqliteCategoryRepo, sqlite_service_repo::SqliteServiceRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let notifier = Arc::new(HttpReminderNotifier::new(
        config.notify_webhook_url.clone(),
        config.notify_webhook_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let category_repo = Arc::new(PostgresCategoryRepo::new(pool.clone()));
        let service_repo = Arc::new(PostgresServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(PostgresBookingRepo::new(pool.clone()));

        build_state(config, category_repo, service_repo, booking_repo, notifier)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let category_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));

        build_state(config, category_repo, service_repo, booking_repo, notifier)
    }
}

fn build_state(
    config: &Config,
    category_repo: Arc<dyn crate::domain::ports::ServiceCategoryRepository>,
    service_repo: Arc<dyn crate::domain::ports::ServiceRepository>,
    booking_repo: Arc<dyn crate::domain::ports::BookingRepository>,
    notifier: Arc<dyn crate::domain::ports::ReminderNotifier>,
) -> AppState {
    let availability = Arc::new(AvailabilityService::new(
        service_repo.clone(),
        booking_repo.clone(),
    ));
    let booking_service = Arc::new(BookingService::new(
        service_repo.clone(),
        category_repo.clone(),
        booking_repo.clone(),
        availability.clone(),
        notifier.clone(),
    ));

    AppState {
        config: config.clone(),
        category_repo,
        service_repo,
        booking_repo,
        notifier,
        availability,
        booking_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
