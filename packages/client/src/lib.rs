#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Typed HTTP client for the incident map REST API.
//!
//! Every operation maps one-to-one onto a server endpoint. Failures are
//! terminal for the triggering operation: there are no retries and no
//! backoff — the views surface the error as a notice and move on, and
//! the next real-time invalidation or manual refresh starts from scratch.

use async_trait::async_trait;
use incident_map_incident_models::{Incident, IncidentStatus, IncidentType, NewIncident, StatusPatch};

/// Errors raised by API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status} for {method} {path}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request method.
        method: &'static str,
        /// Request path.
        path: String,
    },
}

/// Abstract incident API, implemented by [`ApiClient`] and by test mocks.
///
/// Views depend on this trait rather than on the concrete client so the
/// "exactly one request" properties can be asserted without a server.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Fetches the full incident list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_incidents(&self) -> Result<Vec<Incident>, ClientError>;

    /// Fetches the subject/detail reference data for the report form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_incident_types(&self) -> Result<Vec<IncidentType>, ClientError>;

    /// Submits a new incident report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn create_incident(&self, incident: &NewIncident) -> Result<(), ClientError>;

    /// Updates the resolution status of an incident.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn update_status(&self, id: i64, status: IncidentStatus) -> Result<(), ClientError>;

    /// Deletes an incident.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn delete_incident(&self, id: i64) -> Result<(), ClientError>;

    /// Persists a boolean user setting server-side.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn save_user_setting(&self, key: &str, value: bool) -> Result<(), ClientError>;
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the API at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetches an arbitrary `GeoJSON` document (the boundary file).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the server
    /// answers with a non-success status.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ClientError> {
        let response = self.client.get(url).send().await?;
        let response = check_status(response, "GET", url)?;
        Ok(response.text().await?)
    }
}

fn check_status(
    response: reqwest::Response,
    method: &'static str,
    path: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            method,
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl IncidentApi for ApiClient {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>, ClientError> {
        let path = "/api/incidents";
        let response = self.client.get(self.url(path)).send().await?;
        let response = check_status(response, "GET", path)?;
        Ok(response.json().await?)
    }

    async fn fetch_incident_types(&self) -> Result<Vec<IncidentType>, ClientError> {
        let path = "/api/incident_types";
        let response = self.client.get(self.url(path)).send().await?;
        let response = check_status(response, "GET", path)?;
        Ok(response.json().await?)
    }

    async fn create_incident(&self, incident: &NewIncident) -> Result<(), ClientError> {
        let path = "/api/incidents";
        let response = self.client.post(self.url(path)).json(incident).send().await?;
        check_status(response, "POST", path)?;
        Ok(())
    }

    async fn update_status(&self, id: i64, status: IncidentStatus) -> Result<(), ClientError> {
        let path = format!("/api/incidents/{id}");
        let response = self
            .client
            .patch(self.url(&path))
            .json(&StatusPatch { status })
            .send()
            .await?;
        check_status(response, "PATCH", &path)?;
        Ok(())
    }

    async fn delete_incident(&self, id: i64) -> Result<(), ClientError> {
        let path = format!("/api/incidents/{id}");
        let response = self.client.delete(self.url(&path)).send().await?;
        check_status(response, "DELETE", &path)?;
        Ok(())
    }

    async fn save_user_setting(&self, key: &str, value: bool) -> Result<(), ClientError> {
        let path = "/save_user_settings";
        let body = serde_json::json!({ key: value });
        let response = self.client.post(self.url(path)).json(&body).send().await?;
        check_status(response, "POST", path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let client = ApiClient::new("http://localhost:5000///");
        assert_eq!(client.url("/api/incidents"), "http://localhost:5000/api/incidents");
    }

    #[test]
    fn builds_per_incident_paths() {
        let client = ApiClient::new("http://localhost:5000");
        assert_eq!(client.url("/api/incidents/42"), "http://localhost:5000/api/incidents/42");
    }
}
