//! Tabular incident summary shown on the report page.
//!
//! Holds the full fetched list plus per-status counts. Registered with
//! the real-time client alongside the map view, so both re-fetch on the
//! same invalidation signal.

use std::sync::Arc;

use async_trait::async_trait;
use incident_map_client::{ClientError, IncidentApi};
use incident_map_incident_models::Incident;

use crate::Refresh;

/// Per-status counts for the summary header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    /// All incidents.
    pub total: usize,
    /// Solved incidents.
    pub solved: usize,
    /// Unsolved incidents.
    pub unsolved: usize,
}

/// The incident table and its summary counts.
pub struct IncidentTable {
    api: Arc<dyn IncidentApi>,
    incidents: Vec<Incident>,
}

impl IncidentTable {
    /// Creates an empty table over the given API.
    #[must_use]
    pub fn new(api: Arc<dyn IncidentApi>) -> Self {
        Self {
            api,
            incidents: Vec::new(),
        }
    }

    /// The rows of the table, unfiltered.
    #[must_use]
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Summary counts over the current rows.
    #[must_use]
    pub fn summary(&self) -> TableSummary {
        let solved = self
            .incidents
            .iter()
            .filter(|i| i.status.is_solved())
            .count();
        TableSummary {
            total: self.incidents.len(),
            solved,
            unsolved: self.incidents.len() - solved,
        }
    }
}

#[async_trait]
impl Refresh for IncidentTable {
    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.incidents = self.api.fetch_incidents().await?;
        log::debug!("Table refreshed: {} rows", self.incidents.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use incident_map_incident_models::IncidentStatus;

    use super::*;
    use crate::test_support::{RecordingApi, incident};

    #[tokio::test]
    async fn summary_counts_by_status() {
        let api = Arc::new(RecordingApi {
            incidents: vec![
                incident(1, IncidentStatus::Unsolved),
                incident(2, IncidentStatus::Solved),
                incident(3, IncidentStatus::Unsolved),
            ],
            ..RecordingApi::default()
        });
        let mut table = IncidentTable::new(api);
        assert_eq!(table.summary(), TableSummary::default());

        table.refresh().await.unwrap();
        assert_eq!(
            table.summary(),
            TableSummary {
                total: 3,
                solved: 1,
                unsolved: 2,
            }
        );
        assert_eq!(table.incidents().len(), 3);
    }
}
