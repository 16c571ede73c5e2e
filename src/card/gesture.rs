//! Gesture routing: normalized pointer input driving the erase painter
//!
//! Mouse and touch events are normalized upstream (by the platform shell)
//! into surface-local coordinates; this module owns the erase/poll sequence
//! so it can be tested without a DOM.

use glam::Vec2;

use crate::consts::SCRATCH_RADIUS;

use super::session::{CardEvent, ScratchSession};

/// A normalized pointer event in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer pressed / first touch began
    Down(Vec2),
    /// Pointer moved / touch dragged
    Move(Vec2),
    /// Pointer released / touch ended
    Up,
    /// Pointer left the surface
    Leave,
}

/// What a gesture step did, so the shell can mirror it onto the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureOutcome {
    /// Stroke that was painted this step, if any
    pub erased_at: Option<Vec2>,
    /// Completion event, emitted at most once per round
    pub event: Option<CardEvent>,
}

/// Advance the session by one gesture event.
///
/// Down erases immediately; Move erases only while a gesture is active.
/// Coverage is polled after every erase and once more on gesture end, so a
/// reveal can land on the release as well as mid-drag.
pub fn apply_gesture(session: &mut ScratchSession, event: GestureEvent) -> GestureOutcome {
    let mut outcome = GestureOutcome::default();

    if !session.interaction_enabled() {
        // Still clear the gesture flag so a disabled round can't resume a
        // drag if interaction were ever re-enabled mid-gesture.
        if matches!(event, GestureEvent::Up | GestureEvent::Leave) {
            session.is_erasing = false;
        }
        return outcome;
    }

    match event {
        GestureEvent::Down(pos) => {
            session.is_erasing = true;
            session.surface.erase(pos, SCRATCH_RADIUS);
            outcome.erased_at = Some(pos);
            outcome.event = session.try_complete();
        }
        GestureEvent::Move(pos) => {
            if session.is_erasing {
                session.surface.erase(pos, SCRATCH_RADIUS);
                outcome.erased_at = Some(pos);
                outcome.event = session.try_complete();
            }
        }
        GestureEvent::Up => {
            session.is_erasing = false;
            outcome.event = session.try_complete();
        }
        GestureEvent::Leave => {
            session.is_erasing = false;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::session::OfferInstall;
    use crate::offer::Offer;

    fn ready_session(width: u32, height: u32) -> ScratchSession {
        let mut session = ScratchSession::new(width, height);
        let token = session.begin_round(width, height);
        let install = session.install_offer(
            token,
            Offer {
                name: "10% Off".to_string(),
                image: "a.png".to_string(),
                message: None,
            },
        );
        assert_eq!(install, OfferInstall::Ready);
        session.enable_interaction();
        session
    }

    #[test]
    fn test_move_without_down_does_nothing() {
        let mut session = ready_session(60, 60);
        let outcome = apply_gesture(&mut session, GestureEvent::Move(Vec2::new(30.0, 30.0)));
        assert_eq!(outcome.erased_at, None);
        assert_eq!(session.surface.coverage(), 0.0);
    }

    #[test]
    fn test_down_erases_and_starts_gesture() {
        let mut session = ready_session(200, 200);
        let outcome = apply_gesture(&mut session, GestureEvent::Down(Vec2::new(100.0, 100.0)));
        assert_eq!(outcome.erased_at, Some(Vec2::new(100.0, 100.0)));
        assert!(session.is_erasing);
        assert!(session.surface.coverage() > 0.0);
        assert!(outcome.event.is_none());
    }

    #[test]
    fn test_up_clears_gesture_and_polls() {
        // Small surface: one stroke covers everything, so the reveal can
        // land on the release even if the drag itself already crossed it.
        let mut session = ready_session(20, 20);
        apply_gesture(&mut session, GestureEvent::Down(Vec2::new(10.0, 10.0)));
        assert_eq!(session.phase(), crate::card::RevealPhase::Revealed);

        let outcome = apply_gesture(&mut session, GestureEvent::Up);
        assert!(!session.is_erasing);
        // Latch already fired on the Down; Up must not fire it again
        assert!(outcome.event.is_none());
    }

    #[test]
    fn test_reveal_on_release() {
        let mut session = ready_session(60, 60);
        // Erase most of the surface without quite finishing mid-drag
        apply_gesture(&mut session, GestureEvent::Down(Vec2::new(20.0, 20.0)));
        apply_gesture(&mut session, GestureEvent::Move(Vec2::new(40.0, 40.0)));
        if session.phase() == crate::card::RevealPhase::Revealed {
            return; // strokes were enough mid-drag; release path covered below
        }
        session.surface.erase_all();
        let outcome = apply_gesture(&mut session, GestureEvent::Up);
        assert_eq!(outcome.event, Some(CardEvent::RevealCompleted));
    }

    #[test]
    fn test_leave_clears_gesture_without_polling() {
        let mut session = ready_session(20, 20);
        session.is_erasing = true;
        session.surface.erase_all();

        let outcome = apply_gesture(&mut session, GestureEvent::Leave);
        assert!(!session.is_erasing);
        assert!(outcome.event.is_none());
        assert_eq!(session.phase(), crate::card::RevealPhase::Scratching);
    }

    #[test]
    fn test_disabled_interaction_ignores_strokes() {
        let mut session = ScratchSession::new(60, 60);
        session.begin_round(60, 60);
        // No offer installed, interaction never enabled
        let outcome = apply_gesture(&mut session, GestureEvent::Down(Vec2::new(30.0, 30.0)));
        assert_eq!(outcome.erased_at, None);
        assert_eq!(session.surface.coverage(), 0.0);
        assert!(!session.is_erasing);
    }

    #[test]
    fn test_completion_fires_once_across_gesture() {
        let mut session = ready_session(30, 30);
        let mut completions = 0;
        let strokes = [
            GestureEvent::Down(Vec2::new(5.0, 5.0)),
            GestureEvent::Move(Vec2::new(15.0, 15.0)),
            GestureEvent::Move(Vec2::new(25.0, 25.0)),
            GestureEvent::Up,
            GestureEvent::Down(Vec2::new(15.0, 15.0)),
            GestureEvent::Up,
        ];
        for event in strokes {
            if apply_gesture(&mut session, event).event.is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(session.has_completed_once());
    }
}
