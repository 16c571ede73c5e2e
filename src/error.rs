//! User-visible error taxonomy
//!
//! Every fatal path in the widget funnels into one of these variants and is
//! shown through the single modal alert primitive. Redemption-notification
//! failures are deliberately not represented here: they are logged and
//! swallowed, never surfaced.

use std::fmt::{self, Display};

/// Errors the widget can surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Cover or reveal image failed to load. Disables interaction but still
    /// resolves the loading latch so the UI does not hang.
    ImageLoad(String),
    /// Non-2xx status or transport failure on the offer fetch. No retry;
    /// the user must reload.
    Network(String),
    /// Malformed gate code input. Shown inline, no state change, the user
    /// may retry immediately.
    Validation(String),
}

impl WidgetError {
    /// Title used by the modal alert for this error.
    pub fn title(&self) -> &'static str {
        match self {
            WidgetError::ImageLoad(_) => "Error",
            WidgetError::Network(_) => "Error",
            WidgetError::Validation(_) => "Invalid Input",
        }
    }

    /// True if this error should permanently disable scratch interaction.
    pub fn disables_interaction(&self) -> bool {
        !matches!(self, WidgetError::Validation(_))
    }
}

impl Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::ImageLoad(s) => write!(f, "Failed to load image: {s}"),
            WidgetError::Network(s) => write!(f, "Could not fetch offers: {s}"),
            WidgetError::Validation(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for WidgetError {}
