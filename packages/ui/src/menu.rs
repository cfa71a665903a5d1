//! Dropdown menu open/close state.
//!
//! One boolean per panel. Clicking a trigger closes every other panel
//! and flips its own; a click anywhere outside the menus closes all.

/// The set of dropdown panels in the navigation bar.
#[derive(Debug, Clone, Default)]
pub struct DropdownMenu {
    panels: Vec<Panel>,
}

#[derive(Debug, Clone)]
struct Panel {
    id: String,
    open: bool,
}

impl DropdownMenu {
    /// Creates the menu with the given panel ids, all closed.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            panels: ids
                .into_iter()
                .map(|id| Panel {
                    id: id.into(),
                    open: false,
                })
                .collect(),
        }
    }

    /// Handles a click on a panel's trigger: closes the others, toggles
    /// this one. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &str) {
        if !self.panels.iter().any(|p| p.id == id) {
            return;
        }
        for panel in &mut self.panels {
            if panel.id == id {
                panel.open = !panel.open;
            } else {
                panel.open = false;
            }
        }
    }

    /// Handles a click outside any dropdown: closes everything.
    pub fn outside_click(&mut self) {
        for panel in &mut self.panels {
            panel.open = false;
        }
    }

    /// Whether the panel with `id` is currently open.
    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.panels.iter().any(|p| p.id == id && p.open)
    }

    /// Ids of all open panels.
    #[must_use]
    pub fn open_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.open)
            .map(|p| p.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> DropdownMenu {
        DropdownMenu::new(["carte", "rapport", "infos"])
    }

    #[test]
    fn toggle_opens_only_its_own_panel() {
        let mut menu = menu();
        menu.toggle("carte");
        assert!(menu.is_open("carte"));
        assert!(!menu.is_open("rapport"));
        assert_eq!(menu.open_panels(), vec!["carte"]);
    }

    #[test]
    fn toggling_another_panel_closes_the_first() {
        let mut menu = menu();
        menu.toggle("carte");
        menu.toggle("rapport");
        assert!(!menu.is_open("carte"));
        assert!(menu.is_open("rapport"));
    }

    #[test]
    fn second_toggle_closes_the_panel() {
        let mut menu = menu();
        menu.toggle("infos");
        menu.toggle("infos");
        assert!(menu.open_panels().is_empty());
    }

    #[test]
    fn outside_click_closes_all() {
        let mut menu = menu();
        menu.toggle("carte");
        menu.outside_click();
        assert!(menu.open_panels().is_empty());
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut menu = menu();
        menu.toggle("carte");
        menu.toggle("nope");
        assert!(menu.is_open("carte"));
    }
}
