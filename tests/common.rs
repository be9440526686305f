#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use shelter_booking::{
    domain::models::{
        booking::{AttendeeInfo, Booking},
        category::ServiceCategory,
        service::{BreakWindow, NewServiceParams, ScheduleWindow, Service},
    },
    domain::ports::{ReminderNotifier, ServiceCategoryRepository, ServiceRepository},
    domain::services::availability::AvailabilityService,
    domain::services::booking_service::{BookRequest, BookingService},
    domain::services::schedule::validate_schedule,
    error::AppError,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_category_repo::SqliteCategoryRepo,
        sqlite_service_repo::SqliteServiceRepo,
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const SHELTER: &str = "shelter-1";
pub const PARTICIPANT: &str = "participant-1";

/// Captures reminder signals instead of calling a webhook.
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl ReminderNotifier for RecordingNotifier {
    async fn reminder_requested(&self, booking: &Booking) -> Result<(), AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Notification("simulated webhook outage".into()));
        }
        self.calls.lock().unwrap().push(booking.id.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub category_repo: Arc<SqliteCategoryRepo>,
    pub service_repo: Arc<SqliteServiceRepo>,
    pub booking_repo: Arc<SqliteBookingRepo>,
    pub availability: Arc<AvailabilityService>,
    pub booking_service: Arc<BookingService>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let category_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let notifier = Arc::new(RecordingNotifier::new());

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

        Self {
            pool,
            db_filename,
            category_repo,
            service_repo,
            booking_repo,
            availability,
            booking_service,
            notifier,
        }
    }

    pub async fn seed_category(&self) -> ServiceCategory {
        let category = ServiceCategory::new(
            format!("counseling-{}", Uuid::new_v4()),
            true,
            240,
            60,
        );
        self.category_repo
            .create(&category)
            .await
            .expect("Failed to seed category")
    }

    pub async fn seed_service(
        &self,
        windows: Vec<ScheduleWindow>,
        duration_min: i32,
        capacity: i32,
    ) -> Service {
        let category = self.seed_category().await;
        validate_schedule(&windows).expect("test schedule must be valid");

        let service = Service::new(NewServiceParams {
            shelter_id: SHELTER.to_string(),
            category_id: category.id,
            name: "Legal Aid".to_string(),
            description: "Walk-in legal counseling".to_string(),
            duration_min,
            capacity,
            cost_cents: 0,
            timezone: "UTC".to_string(),
            windows,
        })
        .expect("Failed to build service");

        self.service_repo
            .create(&service)
            .await
            .expect("Failed to seed service")
    }

    pub async fn book_at(
        &self,
        service: &Service,
        start: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        self.booking_service
            .book(BookRequest {
                shelter_id: service.shelter_id.clone(),
                service_id: service.id.clone(),
                participant_id: PARTICIPANT.to_string(),
                start_time: start,
                attendee: attendee(),
                notes: None,
            })
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub fn attendee() -> AttendeeInfo {
    AttendeeInfo {
        name: "Sam Doe".to_string(),
        email: "sam@example.org".to_string(),
        phone: Some("555-0100".to_string()),
        emergency_contact: Some("Alex Doe 555-0101".to_string()),
    }
}

pub fn window(weekday: u8, start: &str, end: &str) -> ScheduleWindow {
    ScheduleWindow {
        weekday,
        start: start.to_string(),
        end: end.to_string(),
        break_window: None,
    }
}

pub fn window_with_break(
    weekday: u8,
    start: &str,
    end: &str,
    break_start: &str,
    break_end: &str,
) -> ScheduleWindow {
    ScheduleWindow {
        weekday,
        start: start.to_string(),
        end: end.to_string(),
        break_window: Some(BreakWindow {
            start: break_start.to_string(),
            end: break_end.to_string(),
        }),
    }
}

/// The next calendar date (strictly after today, UTC) falling on the given
/// weekday (0 = Sunday .. 6 = Saturday). Kept at least two days out so
/// "cannot book in the past" never trips on early-morning slots.
pub fn next_date_for_weekday(weekday: u8) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(2);
    while date.weekday().num_days_from_sunday() as u8 != weekday {
        date += Duration::days(1);
    }
    date
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
}
