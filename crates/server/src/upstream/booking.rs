//! Appointment booking client

use async_trait::async_trait;
use salu_core::AppointmentData;

use super::{ClientError, check_status};
use crate::runtime::BookingApi;

/// Client for the appointment booking API
#[derive(Clone)]
pub struct BookingClient {
    http: reqwest::Client,
    url: String,
}

impl BookingClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BookingApi for BookingClient {
    /// POST the full appointment record; any non-success status fails
    async fn submit(&self, record: &AppointmentData) -> Result<(), ClientError> {
        let response = self.http.post(&self.url).json(record).send().await?;
        check_status("booking API", response).await?;

        tracing::info!(specialty = ?record.specialty, date = ?record.date, "Appointment booked");
        Ok(())
    }
}
