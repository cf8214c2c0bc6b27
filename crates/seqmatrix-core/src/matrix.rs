#![forbid(unsafe_code)]

//! The widget state machine: sequence model and playback scheduler together.
//!
//! Hosts drive a [`SequenceMatrix`] with three inputs (click, reset, timer
//! fire) and perform the [`TimerEffect`] each one returns. Every transition
//! that invalidates replay state cancels the pending timer before returning.

use crate::config::MatrixConfig;
use crate::mapper::Scene;
use crate::playback::{FireVerdict, PlaybackScheduler, TickToken, TimerEffect};
use crate::sequence::{Advance, ClickOutcome, Mode, SequenceModel};

/// Sequence capture and timed replay for one widget instance.
#[derive(Debug, Clone)]
pub struct SequenceMatrix {
    config: MatrixConfig,
    model: SequenceModel,
    scheduler: PlaybackScheduler,
}

impl SequenceMatrix {
    /// Create a matrix in its initial state.
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            model: SequenceModel::new(config.grid_size),
            scheduler: PlaybackScheduler::new(config.tick_delay),
        }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// The underlying sequence model.
    pub fn model(&self) -> &SequenceModel {
        &self.model
    }

    pub fn mode(&self) -> Mode {
        self.model.mode()
    }

    /// The armed replay timer, if any.
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.scheduler.pending()
    }

    /// Derive the current scene.
    pub fn scene(&self) -> Scene {
        Scene::derive(&self.model)
    }

    /// Handle activation of `cell`.
    ///
    /// The click that fills the sequence also arms the first replay tick.
    pub fn click(&mut self, cell: usize) -> TimerEffect {
        match self.model.record_click(cell) {
            ClickOutcome::SequenceFull => self.scheduler.start(),
            ClickOutcome::Recorded { .. } | ClickOutcome::Ignored(_) => TimerEffect::None,
        }
    }

    /// Handle a replay timer fire.
    ///
    /// Stale tokens (cancelled or superseded) change nothing.
    pub fn tick(&mut self, token: TickToken) -> TimerEffect {
        if self.scheduler.fire(token) == FireVerdict::Stale {
            return TimerEffect::None;
        }
        match self.model.advance() {
            Advance::Moved { .. } => self.scheduler.arm(),
            Advance::Finished | Advance::Idle => TimerEffect::None,
        }
    }

    /// Return to the initial state and cancel any pending tick.
    pub fn reset(&mut self) -> TimerEffect {
        let effect = self.scheduler.cancel();
        self.model.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(cancelled = effect != TimerEffect::None, "matrix reset");
        effect
    }

    /// Cancel any pending tick without touching the model.
    ///
    /// Called when the host tears the widget down.
    pub fn teardown(&mut self) -> TimerEffect {
        self.scheduler.cancel()
    }
}

impl Default for SequenceMatrix {
    fn default() -> Self {
        Self::new(MatrixConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::VisualState;
    use std::time::Duration;

    fn arm_token(effect: TimerEffect) -> TickToken {
        match effect {
            TimerEffect::Arm { token, .. } => token,
            other => panic!("expected Arm, got {other:?}"),
        }
    }

    #[test]
    fn capture_does_not_arm_until_full() {
        let mut matrix = SequenceMatrix::default();
        for cell in 0..8 {
            assert_eq!(matrix.click(cell), TimerEffect::None);
        }
        assert!(matrix.pending_tick().is_none());
        let effect = matrix.click(8);
        assert!(matches!(
            effect,
            TimerEffect::Arm { delay, .. } if delay == Duration::from_millis(600)
        ));
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 0 });
    }

    #[test]
    fn nine_ticks_complete_the_replay() {
        let mut matrix = SequenceMatrix::default();
        let mut effect = TimerEffect::None;
        for cell in 0..9 {
            effect = matrix.click(cell);
        }

        let mut ticks = 0;
        while let TimerEffect::Arm { token, .. } = effect {
            effect = matrix.tick(token);
            ticks += 1;
            if ticks == 1 {
                let scene = matrix.scene();
                assert_eq!(scene.cells[0].state, VisualState::CapturedActiveOrDone);
                assert_eq!(scene.count(VisualState::CapturedWaiting), 8);
            }
        }

        assert_eq!(ticks, 9);
        assert_eq!(matrix.mode(), Mode::Complete);
        assert!(matrix.pending_tick().is_none());
        assert_eq!(matrix.scene().count(VisualState::CapturedActiveOrDone), 9);
    }

    #[test]
    fn reset_mid_replay_cancels_and_ignores_late_fire() {
        let mut matrix = SequenceMatrix::default();
        let mut effect = TimerEffect::None;
        for cell in 0..9 {
            effect = matrix.click(cell);
        }
        for _ in 0..4 {
            effect = matrix.tick(arm_token(effect));
        }
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 4 });
        let stale = arm_token(effect);

        assert_eq!(matrix.reset(), TimerEffect::Cancel { token: stale });
        assert_eq!(matrix.mode(), Mode::Capturing);
        assert!(matrix.model().is_empty());

        assert_eq!(matrix.tick(stale), TimerEffect::None);
        assert_eq!(matrix.mode(), Mode::Capturing);
        assert_eq!(matrix.model().cursor(), 0);
        assert!(matrix.model().is_empty());
    }

    #[test]
    fn late_fire_does_not_touch_a_new_replay() {
        let config = MatrixConfig::default().with_grid_size(2);
        let mut matrix = SequenceMatrix::new(config);
        matrix.click(0);
        let old = arm_token(matrix.click(1));
        matrix.reset();

        matrix.click(1);
        let fresh = arm_token(matrix.click(0));
        assert_eq!(matrix.tick(old), TimerEffect::None);
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 0 });
        assert!(matches!(matrix.tick(fresh), TimerEffect::Arm { .. }));
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 1 });
    }

    #[test]
    fn reset_when_idle_has_no_timer_effect() {
        let mut matrix = SequenceMatrix::default();
        assert_eq!(matrix.reset(), TimerEffect::None);
        matrix.click(3);
        assert_eq!(matrix.reset(), TimerEffect::None);
        assert!(matrix.model().is_empty());
    }

    #[test]
    fn teardown_cancels_but_keeps_model() {
        let config = MatrixConfig::default().with_grid_size(1);
        let mut matrix = SequenceMatrix::new(config);
        let token = arm_token(matrix.click(0));
        assert_eq!(matrix.teardown(), TimerEffect::Cancel { token });
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 0 });
        assert_eq!(matrix.tick(token), TimerEffect::None);
        assert_eq!(matrix.mode(), Mode::Replaying { cursor: 0 });
    }
}
