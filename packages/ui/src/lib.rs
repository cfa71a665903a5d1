#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dropdown menu and theme view-state.
//!
//! These are the two UI utilities that stand apart from the map: the
//! navigation dropdowns and the dark-mode toggle with its settings
//! modal. Both are plain state objects — rendering is whoever owns the
//! actual widgets; this crate only decides what should be shown.

pub mod menu;
pub mod theme;

pub use menu::DropdownMenu;
pub use theme::{ModalPalette, ThemeState};
