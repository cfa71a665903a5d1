#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Map and table view state for the incident map client.
//!
//! The browser build kept its marker list in a module-scoped array and
//! coordinated views through `window` globals; here each view is an
//! explicit state object and cross-component coordination goes through
//! the [`Refresh`] trait. A view owns a transient copy of the incident
//! list and rebuilds it wholesale on every refresh — the server is the
//! only authority.

pub mod form;
pub mod table;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use incident_map_client::{ClientError, IncidentApi};
use incident_map_incident_models::{Incident, IncidentStatus, MarkerIcon, NewIncident};

/// Errors raised by view operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The underlying API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A destructive control was used without an admin session.
    #[error("admin controls require an active admin session")]
    NotAdmin,
}

/// A view that can be re-rendered from a fresh server fetch.
///
/// The real-time client depends only on this trait: an invalidation
/// event re-invokes `refresh` on every registered view, whichever views
/// happen to be active.
#[async_trait]
pub trait Refresh: Send {
    /// Re-fetches the view's data and rebuilds its state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the fetch fails. The failure is
    /// terminal for this refresh; the next invalidation starts over.
    async fn refresh(&mut self) -> Result<(), ClientError>;
}

/// Which resolution statuses the map should render.
///
/// Mirrors the two filter checkboxes; both default to checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    /// Render solved (grey) incidents.
    pub show_solved: bool,
    /// Render unsolved (red) incidents.
    pub show_unsolved: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            show_solved: true,
            show_unsolved: true,
        }
    }
}

impl FilterState {
    /// Whether an incident in `status` passes the filter.
    #[must_use]
    pub const fn matches(self, status: IncidentStatus) -> bool {
        if status.is_solved() {
            self.show_solved
        } else {
            self.show_unsolved
        }
    }
}

/// Rendered popup content for one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    /// Report subject.
    pub subject: String,
    /// Report detail.
    pub detail: String,
    /// Human-readable submission time.
    pub timestamp_text: String,
    /// Free-text comment (optimistic report markers only).
    pub comment: Option<String>,
    /// Whether the status selector and delete button are rendered.
    pub admin_controls: bool,
}

/// One marker on the map.
#[derive(Debug, Clone)]
pub struct Marker {
    /// Server incident ID; `None` for an optimistic report marker that
    /// has not been confirmed by a refresh yet.
    pub incident_id: Option<i64>,
    /// Marker latitude.
    pub latitude: f64,
    /// Marker longitude.
    pub longitude: f64,
    /// Marker icon color.
    pub icon: MarkerIcon,
    /// Popup shown when the marker is clicked.
    pub popup: PopupContent,
}

/// The live map of incident markers.
///
/// `refresh` rebuilds the marker list from scratch. Overlapping
/// refreshes are last-write-wins by completion order — there is no
/// cancellation and no ordering guarantee, matching the fetch model of
/// the original client.
pub struct MapView {
    api: Arc<dyn IncidentApi>,
    filter: FilterState,
    admin: bool,
    markers: Vec<Marker>,
}

impl MapView {
    /// Creates an empty map view over the given API.
    #[must_use]
    pub fn new(api: Arc<dyn IncidentApi>) -> Self {
        Self {
            api,
            filter: FilterState::default(),
            admin: false,
            markers: Vec::new(),
        }
    }

    /// Updates the filter checkboxes. Takes effect on the next refresh.
    pub const fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// Current filter state.
    #[must_use]
    pub const fn filter(&self) -> FilterState {
        self.filter
    }

    /// Sets whether popups render admin controls. The session object
    /// decides; the view only mirrors it at render time.
    pub const fn set_admin(&mut self, admin: bool) {
        self.admin = admin;
    }

    /// Currently rendered markers.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Changes an incident's status: admin-only. Issues the PATCH and,
    /// on success, swaps the marker icon in place without a full
    /// refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotAdmin`] without an admin session, or the
    /// underlying [`ClientError`] if the request fails (no retry).
    pub async fn set_status(&mut self, id: i64, status: IncidentStatus) -> Result<(), ViewError> {
        if !self.admin {
            return Err(ViewError::NotAdmin);
        }
        self.api.update_status(id, status).await?;
        if let Some(marker) = self
            .markers
            .iter_mut()
            .find(|m| m.incident_id == Some(id))
        {
            marker.icon = status.icon();
        }
        Ok(())
    }

    /// Deletes an incident: admin-only. Issues the DELETE and, on
    /// success, removes the marker locally.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotAdmin`] without an admin session, or the
    /// underlying [`ClientError`] if the request fails (no retry).
    pub async fn delete(&mut self, id: i64) -> Result<(), ViewError> {
        if !self.admin {
            return Err(ViewError::NotAdmin);
        }
        self.api.delete_incident(id).await?;
        self.markers.retain(|m| m.incident_id != Some(id));
        Ok(())
    }

    /// Drops an optimistic red marker for a just-submitted report.
    ///
    /// The marker is placed before the POST resolves and is never rolled
    /// back on failure; the next successful refresh replaces it with the
    /// server's copy (or drops it if the POST never landed).
    pub fn place_optimistic_marker(&mut self, report: &NewIncident) {
        self.markers.push(Marker {
            incident_id: None,
            latitude: report.latitude,
            longitude: report.longitude,
            icon: MarkerIcon::Red,
            popup: PopupContent {
                subject: report.kind.clone(),
                detail: report.description.clone(),
                timestamp_text: format_timestamp(report.timestamp),
                comment: Some(report.comment.clone()),
                admin_controls: false,
            },
        });
    }

    fn build_marker(&self, incident: &Incident) -> Marker {
        Marker {
            incident_id: Some(incident.id),
            latitude: incident.latitude,
            longitude: incident.longitude,
            icon: incident.icon(),
            popup: PopupContent {
                subject: incident.kind.clone(),
                detail: incident.description.clone(),
                timestamp_text: format_timestamp(incident.timestamp),
                comment: None,
                admin_controls: self.admin,
            },
        }
    }
}

#[async_trait]
impl Refresh for MapView {
    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.markers.clear();
        let incidents = self.api.fetch_incidents().await?;
        self.markers = incidents
            .iter()
            .filter(|incident| self.filter.matches(incident.status))
            .map(|incident| self.build_marker(incident))
            .collect();
        log::debug!("Map refreshed: {} markers", self.markers.len());
        Ok(())
    }
}

/// Formats a timestamp for popup display.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}
