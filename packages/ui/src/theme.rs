//! Dark-mode theme state and the settings modal.
//!
//! Enabling dark mode records the dark stylesheet link and the
//! `dark-mode` body class, repaints the modal palette, and persists the
//! preference both locally and server-side. Disabling reverses all of
//! it. The persisted flag is restored on the next start.

use incident_map_client::IncidentApi;
use incident_map_prefs::{PrefsStore, keys};

/// CSS class added to the body while dark mode is active.
pub const DARK_MODE_CLASS: &str = "dark-mode";

/// Background/text color pair for the settings modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalPalette {
    /// Modal background color.
    pub background: &'static str,
    /// Modal text color.
    pub text: &'static str,
}

/// Light palette (the default).
pub const LIGHT_PALETTE: ModalPalette = ModalPalette {
    background: "#ffffff",
    text: "#333333",
};

/// Dark palette.
pub const DARK_PALETTE: ModalPalette = ModalPalette {
    background: "#23272a",
    text: "#e0e0e0",
};

/// The theme and settings-modal view state.
#[derive(Debug, Clone)]
pub struct ThemeState {
    dark_css: String,
    dark: bool,
    modal_open: bool,
}

impl ThemeState {
    /// Creates a light-mode theme pointing at the dark stylesheet URL.
    #[must_use]
    pub fn new(dark_css: impl Into<String>) -> Self {
        Self {
            dark_css: dark_css.into(),
            dark: false,
            modal_open: false,
        }
    }

    /// Restores the persisted preference from the local store.
    #[must_use]
    pub fn restore(dark_css: impl Into<String>, prefs: &PrefsStore) -> Self {
        let mut state = Self::new(dark_css);
        state.dark = prefs.get_bool(keys::DARK_MODE_GLOBAL);
        state
    }

    /// Whether dark mode is active.
    #[must_use]
    pub const fn is_dark(&self) -> bool {
        self.dark
    }

    /// The dark stylesheet link, present only while dark mode is on.
    #[must_use]
    pub fn stylesheet_link(&self) -> Option<&str> {
        self.dark.then_some(self.dark_css.as_str())
    }

    /// The body classes contributed by the theme.
    #[must_use]
    pub fn body_classes(&self) -> Vec<&'static str> {
        if self.dark { vec![DARK_MODE_CLASS] } else { Vec::new() }
    }

    /// The current modal palette.
    #[must_use]
    pub const fn modal_palette(&self) -> ModalPalette {
        if self.dark { DARK_PALETTE } else { LIGHT_PALETTE }
    }

    /// Opens the settings modal.
    pub const fn open_settings(&mut self) {
        self.modal_open = true;
    }

    /// Closes the settings modal.
    pub const fn close_settings(&mut self) {
        self.modal_open = false;
    }

    /// Whether the settings modal is shown.
    #[must_use]
    pub const fn is_settings_open(&self) -> bool {
        self.modal_open
    }

    /// Toggles dark mode, persisting the preference locally and
    /// server-side. The server write is fire-and-forget: a failure is
    /// logged and the local state keeps the new value.
    pub async fn set_dark(&mut self, on: bool, prefs: &mut PrefsStore, api: &dyn IncidentApi) {
        self.dark = on;
        prefs.set_bool(keys::DARK_MODE_GLOBAL, on);
        if let Err(e) = api.save_user_setting(keys::DARK_MODE_GLOBAL, on).await {
            log::warn!("Failed to save theme preference server-side: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use incident_map_client::ClientError;
    use incident_map_incident_models::{Incident, IncidentStatus, IncidentType, NewIncident};

    use super::*;

    /// Records `save_user_setting` calls; other operations are unused.
    #[derive(Default)]
    struct SettingsApi {
        saved: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl IncidentApi for SettingsApi {
        async fn fetch_incidents(&self) -> Result<Vec<Incident>, ClientError> {
            Ok(Vec::new())
        }

        async fn fetch_incident_types(&self) -> Result<Vec<IncidentType>, ClientError> {
            Ok(Vec::new())
        }

        async fn create_incident(&self, _incident: &NewIncident) -> Result<(), ClientError> {
            Ok(())
        }

        async fn update_status(&self, _id: i64, _status: IncidentStatus) -> Result<(), ClientError> {
            Ok(())
        }

        async fn delete_incident(&self, _id: i64) -> Result<(), ClientError> {
            Ok(())
        }

        async fn save_user_setting(&self, key: &str, value: bool) -> Result<(), ClientError> {
            self.saved.lock().unwrap().push((key.to_string(), value));
            Ok(())
        }
    }

    const DARK_CSS: &str = "/static/css/dark.css";

    #[tokio::test]
    async fn enabling_adds_link_class_and_persists_true() {
        let mut prefs = PrefsStore::in_memory();
        let api = SettingsApi::default();
        let mut theme = ThemeState::new(DARK_CSS);

        theme.set_dark(true, &mut prefs, &api).await;

        assert!(theme.is_dark());
        assert_eq!(theme.stylesheet_link(), Some(DARK_CSS));
        assert_eq!(theme.body_classes(), vec![DARK_MODE_CLASS]);
        assert_eq!(theme.modal_palette(), DARK_PALETTE);
        assert_eq!(prefs.get(keys::DARK_MODE_GLOBAL), Some("true"));
        assert_eq!(
            api.saved.lock().unwrap().as_slice(),
            &[(keys::DARK_MODE_GLOBAL.to_string(), true)]
        );
    }

    #[tokio::test]
    async fn disabling_removes_both_and_persists_false() {
        let mut prefs = PrefsStore::in_memory();
        let api = SettingsApi::default();
        let mut theme = ThemeState::new(DARK_CSS);

        theme.set_dark(true, &mut prefs, &api).await;
        theme.set_dark(false, &mut prefs, &api).await;

        assert!(!theme.is_dark());
        assert_eq!(theme.stylesheet_link(), None);
        assert!(theme.body_classes().is_empty());
        assert_eq!(theme.modal_palette(), LIGHT_PALETTE);
        assert_eq!(prefs.get(keys::DARK_MODE_GLOBAL), Some("false"));
    }

    #[test]
    fn restores_persisted_state() {
        let mut prefs = PrefsStore::in_memory();
        prefs.set_bool(keys::DARK_MODE_GLOBAL, true);

        let theme = ThemeState::restore(DARK_CSS, &prefs);
        assert!(theme.is_dark());
        assert_eq!(theme.stylesheet_link(), Some(DARK_CSS));

        let light = ThemeState::restore(DARK_CSS, &PrefsStore::in_memory());
        assert!(!light.is_dark());
    }

    #[test]
    fn settings_modal_opens_and_closes() {
        let mut theme = ThemeState::new(DARK_CSS);
        assert!(!theme.is_settings_open());
        theme.open_settings();
        assert!(theme.is_settings_open());
        theme.close_settings();
        assert!(!theme.is_settings_open());
    }
}
