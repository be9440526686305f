use crate::domain::models::booking::Booking;
use crate::domain::ports::ReminderNotifier;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Posts the "reminder needed" signal to the external notification system.
/// Delivery and scheduling of the actual reminder happen entirely on the
/// other side of this webhook.
pub struct HttpReminderNotifier {
    client: Client,
    webhook_url: String,
    token: String,
}

impl HttpReminderNotifier {
    pub fn new(webhook_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            token,
        }
    }
}

#[derive(Serialize)]
struct ReminderPayload<'a> {
    booking_id: &'a str,
    service_id: &'a str,
    participant_id: &'a str,
    attendee_name: &'a str,
    attendee_email: &'a str,
    attendee_phone: Option<&'a str>,
    start_time: DateTime<Utc>,
}

#[async_trait]
impl ReminderNotifier for HttpReminderNotifier {
    async fn reminder_requested(&self, booking: &Booking) -> Result<(), AppError> {
        let payload = ReminderPayload {
            booking_id: &booking.id,
            service_id: &booking.service_id,
            participant_id: &booking.participant_id,
            attendee_name: &booking.attendee_name,
            attendee_email: &booking.attendee_email,
            attendee_phone: booking.attendee_phone.as_deref(),
            start_time: booking.start_time,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "reminder webhook rejected the request");
            return Err(AppError::Notification(format!(
                "webhook returned {status}"
            )));
        }

        Ok(())
    }
}
