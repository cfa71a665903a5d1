//! The cascading incident report form.
//!
//! Opening the form fetches the subject/detail reference data; choosing
//! a subject enables its dependent detail options. Submission validates
//! locally (word cap first, then the two selections, matching the order
//! the original form checked them in) and produces exactly one creation
//! request. Validation failures never reach the network.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use incident_map_client::{ClientError, IncidentApi};
use incident_map_incident_models::{IncidentType, NewIncident};

/// Maximum comment length, in whitespace-separated words.
pub const MAX_COMMENT_WORDS: usize = 150;

/// Validation failures, each carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The comment exceeds [`MAX_COMMENT_WORDS`].
    #[error("Le commentaire ne doit pas dépasser 150 mots.")]
    CommentTooLong {
        /// The offending word count.
        words: usize,
    },

    /// No subject selected.
    #[error("Veuillez sélectionner un sujet avant de soumettre le signalement.")]
    MissingSubject,

    /// No detail selected.
    #[error("Veuillez sélectionner un détail avant de soumettre le signalement.")]
    MissingDetail,
}

/// Counts whitespace-separated words in a comment.
#[must_use]
pub fn word_count(comment: &str) -> usize {
    comment.split_whitespace().count()
}

/// Live counter text shown under the comment box, e.g. `"12 / 150 mots"`.
#[must_use]
pub fn word_count_text(comment: &str) -> String {
    format!("{} / {MAX_COMMENT_WORDS} mots", word_count(comment))
}

/// An open report form anchored at one clicked map location.
pub struct ReportForm {
    api: Arc<dyn IncidentApi>,
    types: Vec<IncidentType>,
    latitude: f64,
    longitude: f64,
    subject: Option<usize>,
    detail: Option<usize>,
}

impl ReportForm {
    /// Opens a form for a click at (`latitude`, `longitude`), fetching
    /// the incident type reference data.
    ///
    /// The caller is responsible for only opening forms inside the
    /// boundary; the out-of-bounds notice is shown instead of a form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the reference data fetch fails.
    pub async fn open(
        api: Arc<dyn IncidentApi>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, ClientError> {
        let types = api.fetch_incident_types().await?;
        Ok(Self {
            api,
            types,
            latitude,
            longitude,
            subject: None,
            detail: None,
        })
    }

    /// Available subjects, in selector order.
    #[must_use]
    pub fn subjects(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.subject.as_str()).collect()
    }

    /// Detail options for the currently selected subject. Empty (the
    /// selector stays disabled) until a subject is chosen.
    #[must_use]
    pub fn details(&self) -> Vec<&str> {
        self.subject
            .and_then(|idx| self.types.get(idx))
            .map(|t| t.details.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Selects a subject by index, resetting any prior detail choice.
    /// Out-of-range indices clear the selection (the placeholder row).
    pub fn select_subject(&mut self, idx: usize) {
        self.subject = (idx < self.types.len()).then_some(idx);
        self.detail = None;
    }

    /// Selects a detail by index within the current subject's options.
    /// Ignored until a subject is chosen.
    pub fn select_detail(&mut self, idx: usize) {
        self.detail = self
            .subject
            .and_then(|s| self.types.get(s))
            .filter(|t| idx < t.details.len())
            .map(|_| idx);
    }

    /// Validates the form. Checks run in display order: word cap, then
    /// subject, then detail.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`FormError`].
    pub fn validate(&self, comment: &str) -> Result<(), FormError> {
        let words = word_count(comment);
        if words > MAX_COMMENT_WORDS {
            return Err(FormError::CommentTooLong { words });
        }
        if self.subject.is_none() {
            return Err(FormError::MissingSubject);
        }
        if self.detail.is_none() {
            return Err(FormError::MissingDetail);
        }
        Ok(())
    }

    /// Builds the creation request for the current selections.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if validation fails; no request body is
    /// produced in that case.
    pub fn build_report(
        &self,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<NewIncident, FormError> {
        self.validate(comment)?;
        // validate() guarantees both selections are set and in range.
        let subject_idx = self.subject.ok_or(FormError::MissingSubject)?;
        let detail_idx = self.detail.ok_or(FormError::MissingDetail)?;
        let incident_type = &self.types[subject_idx];
        Ok(NewIncident {
            kind: incident_type.subject.clone(),
            description: incident_type.details[detail_idx].clone(),
            comment: comment.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: now,
        })
    }

    /// Validates and submits the report, placing the optimistic marker
    /// through `map` before the POST resolves.
    ///
    /// A POST failure is logged and swallowed: the optimistic marker is
    /// deliberately not rolled back, matching the original client.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if validation fails (nothing is sent).
    pub async fn submit(
        &self,
        map: &mut crate::MapView,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<NewIncident, FormError> {
        let report = self.build_report(comment, now)?;
        map.place_optimistic_marker(&report);
        if let Err(e) = self.api.create_incident(&report).await {
            log::error!("Failed to submit incident report: {e}");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::MapView;
    use crate::test_support::{Recorded, RecordingApi};

    fn types() -> Vec<IncidentType> {
        vec![
            IncidentType {
                subject: "Route".to_string(),
                details: vec!["Nid-de-poule".to_string(), "Signalisation".to_string()],
            },
            IncidentType {
                subject: "Faune".to_string(),
                details: vec!["Ours aperçu".to_string()],
            },
        ]
    }

    fn api() -> Arc<RecordingApi> {
        Arc::new(RecordingApi {
            types: types(),
            ..RecordingApi::default()
        })
    }

    async fn open_form(api: Arc<RecordingApi>) -> ReportForm {
        ReportForm::open(api, 51.089, -115.359).await.unwrap()
    }

    #[test]
    fn counts_words_by_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("un deux  trois\nquatre"), 4);
        assert_eq!(word_count_text("un deux"), "2 / 150 mots");
    }

    #[tokio::test]
    async fn subject_selection_drives_detail_options() {
        let mut form = open_form(api()).await;
        assert_eq!(form.subjects(), vec!["Route", "Faune"]);
        assert!(form.details().is_empty());

        form.select_subject(0);
        assert_eq!(form.details(), vec!["Nid-de-poule", "Signalisation"]);

        form.select_subject(1);
        assert_eq!(form.details(), vec!["Ours aperçu"]);
    }

    #[tokio::test]
    async fn changing_subject_resets_detail() {
        let mut form = open_form(api()).await;
        form.select_subject(0);
        form.select_detail(1);
        form.select_subject(1);
        assert!(matches!(
            form.validate(""),
            Err(FormError::MissingDetail)
        ));
    }

    #[tokio::test]
    async fn validation_order_matches_the_form() {
        let mut form = open_form(api()).await;
        let long_comment = "mot ".repeat(151);

        // Word cap is checked before the selections.
        assert!(matches!(
            form.validate(&long_comment),
            Err(FormError::CommentTooLong { words: 151 })
        ));
        assert!(matches!(form.validate("ok"), Err(FormError::MissingSubject)));

        form.select_subject(0);
        assert!(matches!(form.validate("ok"), Err(FormError::MissingDetail)));

        form.select_detail(0);
        assert!(form.validate("ok").is_ok());
    }

    #[tokio::test]
    async fn comment_of_exactly_150_words_is_accepted() {
        let mut form = open_form(api()).await;
        form.select_subject(0);
        form.select_detail(0);
        let comment = "mot ".repeat(150);
        assert!(form.validate(&comment).is_ok());
    }

    #[tokio::test]
    async fn valid_submit_sends_exactly_one_request() {
        let api = api();
        let mut map = MapView::new(api.clone());
        let mut form = open_form(api.clone()).await;
        form.select_subject(0);
        form.select_detail(1);

        let now = chrono::Utc::now();
        let report = form.submit(&mut map, "lampadaire penché", now).await.unwrap();

        assert_eq!(report.kind, "Route");
        assert_eq!(report.description, "Signalisation");
        assert_eq!(report.comment, "lampadaire penché");
        assert!((report.latitude - 51.089).abs() < f64::EPSILON);
        assert_eq!(report.timestamp, now);
        assert_eq!(api.recorded(), vec![Recorded::Create(report)]);

        // Optimistic marker placed before the POST resolved.
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].incident_id, None);
    }

    #[tokio::test]
    async fn overlong_comment_sends_zero_requests() {
        let api = api();
        let mut map = MapView::new(api.clone());
        let mut form = open_form(api.clone()).await;
        form.select_subject(0);
        form.select_detail(0);

        let comment = "mot ".repeat(151);
        let result = form.submit(&mut map, &comment, chrono::Utc::now()).await;

        assert!(matches!(result, Err(FormError::CommentTooLong { .. })));
        assert!(api.recorded().is_empty());
        assert!(map.markers().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_indices_are_ignored() {
        let mut form = open_form(api()).await;
        form.select_subject(99);
        assert!(matches!(form.validate(""), Err(FormError::MissingSubject)));

        form.select_subject(1);
        form.select_detail(5);
        assert!(matches!(form.validate(""), Err(FormError::MissingDetail)));
    }
}
