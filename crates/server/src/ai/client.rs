//! Ollama client for the `/api/generate` endpoint

use serde::{Deserialize, Serialize};

use crate::upstream::ClientError;

const SERVICE: &str = "inference endpoint";

/// Client for a non-streaming Ollama generate endpoint
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

/// Request body for `/api/generate`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from `/api/generate`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Error body returned by Ollama
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

impl OllamaClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the model's raw text
    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self.http.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error,
                Err(_) => body,
            };
            return Err(ClientError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<GenerateResponse>(&body)
            .map(|r| r.response)
            .map_err(|e| ClientError::Decode {
                service: SERVICE,
                detail: e.to_string(),
            })
    }
}
