use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, ReminderNotifier, ServiceCategoryRepository, ServiceRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::booking_service::BookingService;
use std::sync::Arc;

/// Wiring for the engine: repositories behind trait objects plus the two
/// domain services built over them. The host application embeds this and
/// calls the services directly.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub category_repo: Arc<dyn ServiceCategoryRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub notifier: Arc<dyn ReminderNotifier>,
    pub availability: Arc<AvailabilityService>,
    pub booking_service: Arc<BookingService>,
}
