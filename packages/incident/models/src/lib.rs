#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Core data model for the incident map client.
//!
//! These types mirror the JSON wire format of the incident API. They are
//! the client's transient, non-authoritative copy of server-owned data:
//! every view rebuilds itself from a fresh fetch rather than mutating
//! these records in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Resolution status of an incident.
///
/// The wire format is English (`"unsolved"` / `"solved"`), but older rows
/// still carry the French values (`"non résolu"` / `"résolu"`), so
/// deserialization is lenient: anything that is not recognisably solved
/// counts as unsolved.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentStatus {
    /// Open incident, shown with a red marker.
    #[default]
    Unsolved,
    /// Resolved incident, shown with a grey marker.
    Solved,
}

impl IncidentStatus {
    /// Parses a wire status, accepting legacy French values.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "solved" | "résolu" | "resolu" => Self::Solved,
            _ => Self::Unsolved,
        }
    }

    /// Whether this status counts as solved.
    #[must_use]
    pub const fn is_solved(self) -> bool {
        matches!(self, Self::Solved)
    }

    /// Marker icon for an incident in this status.
    #[must_use]
    pub const fn icon(self) -> MarkerIcon {
        match self {
            Self::Unsolved => MarkerIcon::Red,
            Self::Solved => MarkerIcon::Grey,
        }
    }
}

impl From<String> for IncidentStatus {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

/// Marker icon color, derived from the incident status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerIcon {
    /// Unsolved incidents.
    Red,
    /// Solved incidents.
    Grey,
}

impl MarkerIcon {
    /// URL of the colored marker image used by the map layer.
    #[must_use]
    pub const fn icon_url(self) -> &'static str {
        match self {
            Self::Red => {
                "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-red.png"
            },
            Self::Grey => {
                "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-grey.png"
            },
        }
    }

    /// URL of the shared marker drop shadow image.
    #[must_use]
    pub const fn shadow_url() -> &'static str {
        "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/images/marker-shadow.png"
    }
}

/// An incident as returned by `GET /api/incidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident ID (server-assigned).
    pub id: i64,
    /// Report subject (the wire field is `type`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Report detail text.
    #[serde(default)]
    pub description: String,
    /// Latitude of the report location.
    pub latitude: f64,
    /// Longitude of the report location.
    pub longitude: f64,
    /// When the report was submitted (ISO 8601).
    pub timestamp: DateTime<Utc>,
    /// Resolution status.
    #[serde(default)]
    pub status: IncidentStatus,
}

impl Incident {
    /// Marker icon for this incident's current status.
    #[must_use]
    pub const fn icon(&self) -> MarkerIcon {
        self.status.icon()
    }
}

/// Body of `POST /api/incidents` for a new report.
///
/// The server assigns the ID and defaults the status to unsolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    /// Selected subject text.
    #[serde(rename = "type")]
    pub kind: String,
    /// Selected detail text.
    pub description: String,
    /// Free-text comment, at most 150 words.
    #[serde(default)]
    pub comment: String,
    /// Latitude of the clicked location.
    pub latitude: f64,
    /// Longitude of the clicked location.
    pub longitude: f64,
    /// Submission time (ISO 8601).
    pub timestamp: DateTime<Utc>,
}

/// Body of `PATCH /api/incidents/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusPatch {
    /// The new resolution status.
    pub status: IncidentStatus,
}

/// One subject with its dependent detail options, as returned by
/// `GET /api/incident_types`. Drives the cascading report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentType {
    /// Subject shown in the first selector.
    pub subject: String,
    /// Detail options enabled once the subject is chosen.
    pub details: Vec<String>,
}
