use crate::domain::models::booking::{
    generate_confirmation_code, AttendeeInfo, Booking, BookingStatus, NewBookingParams, Outcome,
};
use crate::domain::models::service::Service;
use crate::domain::ports::{
    BookingRepository, ReminderNotifier, ServiceCategoryRepository, ServiceRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::error::{is_unique_violation, AppError};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

const MAX_CODE_ATTEMPTS: u32 = 5;

pub struct BookRequest {
    pub shelter_id: String,
    pub service_id: String,
    pub participant_id: String,
    pub start_time: DateTime<Utc>,
    pub attendee: AttendeeInfo,
    pub notes: Option<String>,
}

/// Sole writer of booking records. Creation re-validates the schedule and
/// delegates the capacity check to the store's atomic guarded insert; every
/// status change goes through one of the named transition operations, so the
/// state machine cannot be corrupted by ad-hoc writes elsewhere.
pub struct BookingService {
    services: Arc<dyn ServiceRepository>,
    categories: Arc<dyn ServiceCategoryRepository>,
    bookings: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityService>,
    notifier: Arc<dyn ReminderNotifier>,
}

impl BookingService {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        categories: Arc<dyn ServiceCategoryRepository>,
        bookings: Arc<dyn BookingRepository>,
        availability: Arc<AvailabilityService>,
        notifier: Arc<dyn ReminderNotifier>,
    ) -> Self {
        Self {
            services,
            categories,
            bookings,
            availability,
            notifier,
        }
    }

    async fn load_service(&self, shelter_id: &str, service_id: &str) -> Result<Service, AppError> {
        let service = self
            .services
            .find_by_id(shelter_id, service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;
        if !service.is_active {
            return Err(AppError::NotFound("Service is no longer offered".into()));
        }
        Ok(service)
    }

    pub async fn book(&self, request: BookRequest) -> Result<Booking, AppError> {
        let service = self
            .load_service(&request.shelter_id, &request.service_id)
            .await?;
        let category = self
            .categories
            .find_by_id(&service.category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service category not found".into()))?;

        let now = Utc::now();
        if request.start_time < now {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }
        let horizon = now + Duration::days(category.advance_booking_days as i64);
        if request.start_time > horizon {
            return Err(AppError::Validation(format!(
                "Bookings for '{}' open at most {} days in advance",
                category.name, category.advance_booking_days
            )));
        }

        // Schedule check first so "not offered then" and "full" stay
        // distinguishable for the caller. The occupancy figure here is
        // advisory; the store's guarded insert is authoritative.
        let availability = self
            .availability
            .check(&service, request.start_time, service.duration_min)
            .await?;
        if !availability.available {
            warn!(
                service_id = %service.id,
                start = %request.start_time,
                booked = availability.booked_count,
                capacity = availability.capacity,
                "booking rejected: slot full"
            );
            return Err(AppError::SlotUnavailable {
                capacity: availability.capacity,
                booked: availability.booked_count,
            });
        }

        let mut booking = Booking::new(NewBookingParams {
            shelter_id: request.shelter_id,
            service_id: request.service_id,
            participant_id: request.participant_id,
            start: request.start_time,
            duration_min: service.duration_min,
            attendee: request.attendee,
            notes: request.notes,
        });

        for _attempt in 0..MAX_CODE_ATTEMPTS {
            let code = generate_confirmation_code();
            if self.bookings.find_by_code(&code).await?.is_some() {
                continue;
            }
            booking.confirmation_code = code;

            return match self
                .bookings
                .create_within_capacity(&booking, service.capacity)
                .await
            {
                // A code inserted between our check and the write tripped the
                // unique index. Regenerate.
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    warn!(booking_id = %booking.id, "confirmation code collision, regenerating");
                    continue;
                }
                Err(e) => Err(e),
                Ok(created) => {
                    info!(
                        booking_id = %created.id,
                        service_id = %created.service_id,
                        code = %created.confirmation_code,
                        start = %created.start_time,
                        "booking created"
                    );
                    if let Err(e) = self.notifier.reminder_requested(&created).await {
                        warn!(booking_id = %created.id, error = %e, "reminder signal failed");
                    }
                    Ok(created)
                }
            };
        }

        error!(
            service_id = %booking.service_id,
            "confirmation code space exhausted after {} attempts",
            MAX_CODE_ATTEMPTS
        );
        Err(AppError::CodeGeneration {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    async fn load_booking(&self, shelter_id: &str, booking_id: &str) -> Result<Booking, AppError> {
        self.bookings
            .find_by_id(shelter_id, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }

    pub async fn confirm(&self, shelter_id: &str, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.load_booking(shelter_id, booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                action: "confirm",
            });
        }

        let mut next = booking.clone();
        next.status = BookingStatus::Confirmed;
        next.updated_at = Utc::now();
        let updated = self.bookings.transition(&next, BookingStatus::Pending).await?;
        info!(booking_id = %updated.id, "booking confirmed");
        Ok(updated)
    }

    pub async fn cancel(
        &self,
        shelter_id: &str,
        booking_id: &str,
        reason: Option<String>,
    ) -> Result<Booking, AppError> {
        let booking = self.load_booking(shelter_id, booking_id).await?;
        if booking.status.is_terminal() {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                action: "cancel",
            });
        }

        let expected = booking.status;
        let mut next = booking.clone();
        next.status = BookingStatus::Cancelled;
        next.cancellation_reason = reason;
        next.updated_at = Utc::now();
        let updated = self.bookings.transition(&next, expected).await?;
        info!(booking_id = %updated.id, "booking cancelled");
        Ok(updated)
    }

    pub async fn mark_no_show(
        &self,
        shelter_id: &str,
        booking_id: &str,
    ) -> Result<Booking, AppError> {
        let booking = self.load_booking(shelter_id, booking_id).await?;
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                action: "mark_no_show",
            });
        }

        let mut next = booking.clone();
        next.status = BookingStatus::NoShow;
        next.updated_at = Utc::now();
        let updated = self
            .bookings
            .transition(&next, BookingStatus::Confirmed)
            .await?;
        info!(booking_id = %updated.id, "booking marked no-show");
        Ok(updated)
    }

    pub async fn complete(
        &self,
        shelter_id: &str,
        booking_id: &str,
        outcome: Outcome,
    ) -> Result<Booking, AppError> {
        if let Some(rating) = outcome.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Validation(format!(
                    "rating {rating} out of range (1-5)"
                )));
            }
        }

        let booking = self.load_booking(shelter_id, booking_id).await?;
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                action: "complete",
            });
        }

        let mut next = booking.clone();
        next.status = BookingStatus::Completed;
        next.outcome_attended = Some(outcome.attended);
        next.outcome_rating = outcome.rating;
        next.outcome_feedback = outcome.feedback;
        next.outcome_follow_up = Some(outcome.follow_up_required);
        next.updated_at = Utc::now();
        let updated = self
            .bookings
            .transition(&next, BookingStatus::Confirmed)
            .await?;
        info!(booking_id = %updated.id, "booking completed");
        Ok(updated)
    }

    pub async fn set_provider_notes(
        &self,
        shelter_id: &str,
        booking_id: &str,
        notes: String,
    ) -> Result<Booking, AppError> {
        let booking = self.load_booking(shelter_id, booking_id).await?;

        let expected = booking.status;
        let mut next = booking.clone();
        next.provider_notes = Some(notes);
        next.updated_at = Utc::now();
        self.bookings.transition(&next, expected).await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        self.bookings.find_by_code(code).await
    }

    /// Bookings of one participant, newest appointment first.
    pub async fn participant_bookings(
        &self,
        shelter_id: &str,
        participant_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        self.bookings
            .list_by_participant(shelter_id, participant_id, status)
            .await
    }

    /// All bookings of a shelter, newest appointment first.
    pub async fn shelter_bookings(
        &self,
        shelter_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        self.bookings.list_by_shelter(shelter_id, status).await
    }
}
