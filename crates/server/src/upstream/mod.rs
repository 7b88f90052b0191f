//! HTTP clients for the specialty catalog and booking APIs

pub mod booking;
pub mod catalog;

pub use booking::BookingClient;
pub use catalog::CatalogClient;

use thiserror::Error;

/// Failure talking to an upstream service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected response from {service}: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },
}

/// Build the shared HTTP client used by every upstream
pub fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Turn a non-success response into a `ClientError::Status`
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        service,
        status,
        body,
    })
}
