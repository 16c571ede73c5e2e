//! Scratch Reveal - a scratch-card promotional widget
//!
//! Core modules:
//! - `card`: Deterministic scratch-card model (surface, session, gestures)
//! - `offer`: Offer payload parsing and backend endpoints
//! - `config`: Hosting-page supplied configuration
//! - `error`: User-visible error taxonomy

pub mod card;
pub mod config;
pub mod error;
pub mod offer;

pub use card::{CardEvent, GestureEvent, RasterSurface, ScratchSession};
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use offer::Offer;

/// Widget configuration constants
pub mod consts {
    /// Radius of a single erase stroke, in surface units
    pub const SCRATCH_RADIUS: f32 = 40.0;
    /// Coverage percentage at which the reveal fires
    pub const REVEAL_THRESHOLD: f32 = 70.0;

    /// Simulated authentication delay (cosmetic, no real verification occurs)
    pub const AUTH_DELAY_MS: i32 = 2000;
    /// How long the "Authenticated successfully!" message stays up
    pub const AUTH_SUCCESS_MS: i32 = 500;

    /// Gate codes are exactly this many decimal digits
    pub const CODE_DIGITS: usize = 4;

    /// Confetti pieces launched on reveal
    pub const CONFETTI_COUNT: usize = 50;

    /// Substring in the offer `message` field that signals inventory exhaustion
    pub const EXHAUSTED_SENTINEL: &str = "No offers left";
}
