//! Session state, reveal latch, and the entry gate
//!
//! A session is created when the gate completes and re-initialized if the
//! gate is run again. "Revealed" is a one-way latch: once the threshold has
//! been crossed the completion effects fire exactly once.

use crate::consts::{AUTH_DELAY_MS, AUTH_SUCCESS_MS, CODE_DIGITS, REVEAL_THRESHOLD};
use crate::error::WidgetError;
use crate::offer::Offer;

use super::surface::RasterSurface;

/// Reveal state machine: two states, `Revealed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Scratching,
    Revealed,
}

/// One-shot events produced by session transitions. The platform shell maps
/// these to DOM effects (offer display, confetti, alert, redemption POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    /// Coverage crossed the threshold for the first time this session
    RevealCompleted,
}

/// Outcome of installing a fetched offer into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferInstall {
    /// Offer stored; scratching may proceed once assets are loaded
    Ready,
    /// Backend signaled exhaustion; surface force-erased, interaction disabled
    Exhausted,
    /// Fetch resolved after a newer initialization; dropped
    Stale,
}

/// Phases of the entry gate's fixed linear timer sequence.
///
/// `AwaitingCode -> Authenticating (2000 ms) -> Success (500 ms) -> Done`.
/// The delay is cosmetic; no real verification occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePhase {
    #[default]
    AwaitingCode,
    Authenticating,
    Success,
    Done,
}

impl GatePhase {
    /// How long to remain in this phase before advancing, if timed.
    pub fn delay_ms(&self) -> Option<i32> {
        match self {
            GatePhase::AwaitingCode | GatePhase::Done => None,
            GatePhase::Authenticating => Some(AUTH_DELAY_MS),
            GatePhase::Success => Some(AUTH_SUCCESS_MS),
        }
    }

    /// Next phase in the sequence. `Done` is terminal.
    pub fn advance(&self) -> GatePhase {
        match self {
            GatePhase::AwaitingCode => GatePhase::Authenticating,
            GatePhase::Authenticating => GatePhase::Success,
            GatePhase::Success => GatePhase::Done,
            GatePhase::Done => GatePhase::Done,
        }
    }

    /// Status message shown while this phase is active.
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            GatePhase::Authenticating => Some("Authenticating..."),
            GatePhase::Success => Some("Authenticated successfully!"),
            GatePhase::AwaitingCode | GatePhase::Done => None,
        }
    }
}

/// Validate a gate code: exactly four decimal digits, nothing else. Rejection
/// causes no state change; the user may retry immediately.
pub fn validate_code(code: &str) -> Result<(), WidgetError> {
    let code = code.trim();
    if code.len() == CODE_DIGITS && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(WidgetError::Validation(
            "Please enter exactly the last 4 digits of your invoice number.".to_string(),
        ))
    }
}

/// All mutable per-session state. Exclusively owned by the single UI thread.
#[derive(Debug, Clone)]
pub struct ScratchSession {
    /// The erasable overlay
    pub surface: RasterSurface,
    /// True while a scratch gesture is active
    pub is_erasing: bool,
    /// One-way completion latch
    has_completed_once: bool,
    /// False until assets are ready, and permanently false after completion
    /// or a fatal error
    interaction_enabled: bool,
    /// Offer for this session, set once the fetch resolves
    pub current_offer: Option<Offer>,
    /// Latched fatal-error flag; blocks re-enabling interaction this round
    failed: bool,
    /// Bumped on every initialization; stale async results are dropped
    generation: u64,
}

impl ScratchSession {
    /// Create a session with a fresh surface. Interaction starts disabled
    /// until assets have loaded.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RasterSurface::new(width, height),
            is_erasing: false,
            has_completed_once: false,
            interaction_enabled: false,
            current_offer: None,
            failed: false,
            generation: 0,
        }
    }

    /// Re-initialize for a new round: reset the latch and the surface, drop
    /// the old offer, and bump the generation. Returns the token async work
    /// started for this round must present when it resolves.
    pub fn begin_round(&mut self, width: u32, height: u32) -> u64 {
        self.surface = RasterSurface::new(width, height);
        self.is_erasing = false;
        self.has_completed_once = false;
        self.interaction_enabled = false;
        self.current_offer = None;
        self.failed = false;
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> RevealPhase {
        if self.has_completed_once {
            RevealPhase::Revealed
        } else {
            RevealPhase::Scratching
        }
    }

    pub fn has_completed_once(&self) -> bool {
        self.has_completed_once
    }

    pub fn interaction_enabled(&self) -> bool {
        self.interaction_enabled
    }

    /// Enable scratching once both cover and reveal assets have settled.
    /// Ignored after completion or a fatal error in this round.
    pub fn enable_interaction(&mut self) {
        if !self.has_completed_once && !self.exhausted() && !self.failed {
            self.interaction_enabled = true;
        }
    }

    /// Permanently disable scratching for this round (fatal error path).
    pub fn fail(&mut self, error: &WidgetError) {
        if error.disables_interaction() {
            self.failed = true;
            self.interaction_enabled = false;
            self.is_erasing = false;
        }
    }

    fn exhausted(&self) -> bool {
        self.current_offer
            .as_ref()
            .is_some_and(|o| o.is_exhausted())
    }

    /// Install a fetched offer. A token from an older round marks the result
    /// stale and it is dropped. An exhausted offer force-erases the surface
    /// and disables interaction: the offer is shown without any scratching.
    pub fn install_offer(&mut self, token: u64, offer: Offer) -> OfferInstall {
        if token != self.generation {
            log::warn!(
                "Dropping stale offer fetch (token {token}, generation {})",
                self.generation
            );
            return OfferInstall::Stale;
        }

        let exhausted = offer.is_exhausted();
        self.current_offer = Some(offer);
        if exhausted {
            self.surface.erase_all();
            self.interaction_enabled = false;
            self.is_erasing = false;
            OfferInstall::Exhausted
        } else {
            OfferInstall::Ready
        }
    }

    /// Attempt the reveal transition. Fires at most once per round: returns
    /// the completion event only when coverage first crosses the threshold.
    pub fn try_complete(&mut self) -> Option<CardEvent> {
        if self.has_completed_once {
            return None;
        }
        if self.surface.coverage() < REVEAL_THRESHOLD {
            return None;
        }
        self.has_completed_once = true;
        self.interaction_enabled = false;
        self.is_erasing = false;
        Some(CardEvent::RevealCompleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn session_with_offer(width: u32, height: u32) -> ScratchSession {
        let mut session = ScratchSession::new(width, height);
        let token = session.begin_round(width, height);
        let offer = Offer {
            name: "10% Off".to_string(),
            image: "a.png".to_string(),
            message: None,
        };
        assert_eq!(session.install_offer(token, offer), OfferInstall::Ready);
        session.enable_interaction();
        session
    }

    #[test]
    fn test_validate_code_accepts_four_digits() {
        assert!(validate_code("1234").is_ok());
        assert!(validate_code("0000").is_ok());
        assert!(validate_code(" 1234 ").is_ok());
    }

    #[test]
    fn test_validate_code_rejects_everything_else() {
        for bad in ["123", "12345", "12a4", "", "12 4", "12.4", "١٢٣٤"] {
            let err = validate_code(bad).unwrap_err();
            assert!(matches!(err, WidgetError::Validation(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_gate_sequence_order() {
        let mut phase = GatePhase::default();
        assert_eq!(phase, GatePhase::AwaitingCode);
        assert_eq!(phase.delay_ms(), None);

        phase = phase.advance();
        assert_eq!(phase, GatePhase::Authenticating);
        assert_eq!(phase.delay_ms(), Some(2000));
        assert_eq!(phase.status_text(), Some("Authenticating..."));

        phase = phase.advance();
        assert_eq!(phase, GatePhase::Success);
        assert_eq!(phase.delay_ms(), Some(500));

        phase = phase.advance();
        assert_eq!(phase, GatePhase::Done);
        assert_eq!(phase.advance(), GatePhase::Done);
    }

    #[test]
    fn test_reveal_fires_exactly_once() {
        let mut session = session_with_offer(10, 10);
        session.surface.erase_all();

        assert_eq!(session.try_complete(), Some(CardEvent::RevealCompleted));
        assert_eq!(session.phase(), RevealPhase::Revealed);
        assert!(!session.interaction_enabled());

        // Coverage is still >= threshold, but the latch holds
        assert_eq!(session.try_complete(), None);
        assert_eq!(session.try_complete(), None);
    }

    #[test]
    fn test_no_reveal_below_threshold() {
        let mut session = session_with_offer(100, 100);
        session.surface.erase(Vec2::new(50.0, 50.0), 20.0);
        assert!(session.surface.coverage() < REVEAL_THRESHOLD);
        assert_eq!(session.try_complete(), None);
        assert_eq!(session.phase(), RevealPhase::Scratching);
    }

    #[test]
    fn test_exhausted_offer_disables_interaction() {
        let mut session = ScratchSession::new(10, 10);
        let token = session.begin_round(10, 10);
        let offer = Offer {
            name: "None".to_string(),
            image: "x.png".to_string(),
            message: Some("No offers left today".to_string()),
        };
        assert_eq!(session.install_offer(token, offer), OfferInstall::Exhausted);
        assert!(!session.interaction_enabled());
        assert_eq!(session.surface.coverage(), 100.0);

        // The asset-loaded path must not re-enable scratching
        session.enable_interaction();
        assert!(!session.interaction_enabled());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut session = ScratchSession::new(10, 10);
        let old_token = session.begin_round(10, 10);
        let _new_token = session.begin_round(10, 10);

        let offer = Offer {
            name: "Late".to_string(),
            image: "late.png".to_string(),
            message: None,
        };
        assert_eq!(session.install_offer(old_token, offer), OfferInstall::Stale);
        assert!(session.current_offer.is_none());
    }

    #[test]
    fn test_fatal_error_blocks_reveal_permanently() {
        let mut session = session_with_offer(10, 10);
        session.fail(&WidgetError::Network("HTTP error! status: 500".to_string()));
        assert!(!session.interaction_enabled());

        session.enable_interaction();
        assert!(!session.interaction_enabled());
    }

    #[test]
    fn test_validation_error_does_not_disable() {
        let mut session = session_with_offer(10, 10);
        session.fail(&WidgetError::Validation("bad code".to_string()));
        assert!(session.interaction_enabled());
    }

    #[test]
    fn test_begin_round_resets_latch_and_surface() {
        let mut session = session_with_offer(10, 10);
        session.surface.erase_all();
        assert!(session.try_complete().is_some());

        let token = session.begin_round(10, 10);
        assert!(token > 0);
        assert_eq!(session.phase(), RevealPhase::Scratching);
        assert_eq!(session.surface.coverage(), 0.0);
        assert!(session.current_offer.is_none());
    }
}
