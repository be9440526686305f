use crate::domain::models::{
    booking::{Booking, BookingStatus},
    category::ServiceCategory,
    service::Service,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ServiceCategoryRepository: Send + Sync {
    async fn create(&self, category: &ServiceCategory) -> Result<ServiceCategory, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ServiceCategory>, AppError>;
    async fn list(&self) -> Result<Vec<ServiceCategory>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, shelter_id: &str, id: &str) -> Result<Option<Service>, AppError>;
    async fn list_by_shelter(&self, shelter_id: &str) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    /// Logical deactivation. Services are never hard-deleted while bookings
    /// reference them.
    async fn deactivate(&self, shelter_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking only if the number of pending/confirmed bookings
    /// overlapping its interval is still below `capacity`. The count and the
    /// insert happen atomically in the store; when the guard fails the error
    /// is `SlotUnavailable` with the occupancy observed at write time.
    async fn create_within_capacity(
        &self,
        booking: &Booking,
        capacity: i32,
    ) -> Result<Booking, AppError>;

    async fn find_by_id(&self, shelter_id: &str, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError>;

    /// Pending/confirmed bookings whose interval overlaps [start, end).
    async fn list_active_in_range(
        &self,
        service_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;

    async fn count_active_overlap(
        &self,
        service_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Compare-and-set status write: persists `booking` only where the stored
    /// status still equals `expected`. A losing writer gets
    /// `ConcurrentModification` carrying the status found instead.
    async fn transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<Booking, AppError>;

    async fn list_by_participant(
        &self,
        shelter_id: &str,
        participant_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError>;

    async fn list_by_shelter(
        &self,
        shelter_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError>;
}

/// Fire-and-forget signal to the external notification system that a
/// reminder should be scheduled for a freshly created booking.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn reminder_requested(&self, booking: &Booking) -> Result<(), AppError>;
}
