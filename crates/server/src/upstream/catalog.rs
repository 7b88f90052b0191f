//! Specialty catalog client

use async_trait::async_trait;
use serde::Deserialize;

use super::{ClientError, check_status};
use crate::runtime::SpecialtySource;

const SERVICE: &str = "specialty catalog";

/// Client for the specialty catalog API
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    url: String,
}

/// The catalog answers `{"data": [...]}`; a bare array is accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Envelope { data: Vec<SpecialtyEntry> },
    Bare(Vec<SpecialtyEntry>),
}

#[derive(Debug, Deserialize)]
struct SpecialtyEntry {
    #[serde(default)]
    name: Option<String>,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

/// Names in catalog order; entries without a name are skipped
fn names_from_body(body: &str) -> Result<Vec<String>, ClientError> {
    let parsed: CatalogResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode {
            service: SERVICE,
            detail: e.to_string(),
        })?;

    let entries = match parsed {
        CatalogResponse::Envelope { data } => data,
        CatalogResponse::Bare(entries) => entries,
    };
    Ok(entries.into_iter().filter_map(|e| e.name).collect())
}

#[async_trait]
impl SpecialtySource for CatalogClient {
    async fn fetch_specialties(&self) -> Result<Vec<String>, ClientError> {
        let response = self.http.get(&self.url).send().await?;
        let response = check_status(SERVICE, response).await?;
        let body = response.text().await?;
        let names = names_from_body(&body)?;

        tracing::debug!(count = names.len(), "Fetched specialty catalog");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_enveloped_catalog() {
        let body = r#"{"data": [{"id": 1, "name": "Cardiología"}, {"id": 2, "name": "No Aplica"}]}"#;
        assert_eq!(
            names_from_body(body).unwrap(),
            vec!["Cardiología", "No Aplica"]
        );
    }

    #[test]
    fn reads_bare_array_and_skips_unnamed() {
        let body = r#"[{"name": "Pediatría"}, {"id": 7}]"#;
        assert_eq!(names_from_body(body).unwrap(), vec!["Pediatría"]);
    }

    #[test]
    fn rejects_unexpected_shapes() {
        let err = names_from_body(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
