//! Modal views that take over input while open.
//!
//! Each overlay tracks the terminal size on its own; the controller only
//! learns about resizes that happened meanwhile when the overlay closes.

mod error;
mod fuzzy;
mod help;

pub use error::ErrorOverlay;
pub use fuzzy::{FuzzyOverlay, FuzzySelector, PickTarget, Picked, EPIC_TITLE, USER_TITLE};
pub use help::HelpOverlay;

use crate::tui::keybindings::Mode;

pub enum Overlay {
    Fuzzy(FuzzyOverlay),
    Help(HelpOverlay),
    Error(ErrorOverlay),
}

impl Overlay {
    pub fn mode(&self) -> Mode {
        match self {
            Overlay::Fuzzy(_) => Mode::Fuzzy,
            Overlay::Help(_) => Mode::Help,
            Overlay::Error(_) => Mode::Error,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        match self {
            Overlay::Fuzzy(o) => o.resize(width, height),
            Overlay::Help(o) => o.resize(width, height),
            Overlay::Error(o) => o.resize(width, height),
        }
    }

    /// Last terminal size this overlay saw.
    pub fn size(&self) -> (u16, u16) {
        match self {
            Overlay::Fuzzy(o) => o.size(),
            Overlay::Help(o) => o.size(),
            Overlay::Error(o) => o.size(),
        }
    }
}
