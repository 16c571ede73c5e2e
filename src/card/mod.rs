//! Deterministic scratch-card model
//!
//! All widget logic lives here. This module must be pure and platform-free:
//! - No DOM, canvas, or network dependencies
//! - State transitions driven only by explicit inputs
//! - Fully testable on native targets

pub mod gesture;
pub mod session;
pub mod surface;

pub use gesture::{GestureEvent, GestureOutcome, apply_gesture};
pub use session::{
    CardEvent, GatePhase, OfferInstall, RevealPhase, ScratchSession, validate_code,
};
pub use surface::RasterSurface;
