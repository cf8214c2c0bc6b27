#![forbid(unsafe_code)]

//! The sequence matrix as a runtime [`Model`].
//!
//! [`MatrixApp`] translates terminal input into clicks and resets on a
//! [`SequenceMatrix`], and turns the [`TimerEffect`]s it returns into runtime
//! timer commands. Each armed tick gets its own [`TimerId`] derived from the
//! token generation, so cancelling one never touches another.

use seqmatrix_core::{MatrixConfig, ModeKind, SequenceMatrix, TickToken, TimerEffect};
use seqmatrix_runtime::{
    Cmd, Event, Frame, KeyCode, Model, MouseButton, MouseEventKind, Rect, TimerId,
};

use crate::layout::{Hit, MatrixLayout};
use crate::view;

/// Application messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// Cell `i` activated (0-based).
    Activate(usize),
    /// Reset requested.
    Reset,
    /// A replay timer fired.
    ReplayTick(TickToken),
    /// Left click at a screen position; resolved against the layout.
    Click { x: u16, y: u16 },
    Resize { width: u16, height: u16 },
    Quit,
    /// Input with no meaning here.
    Ignored,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => {
                if key.ctrl() && key.is_char('c') {
                    return Msg::Quit;
                }
                match key.code {
                    KeyCode::Escape | KeyCode::Char('q') => Msg::Quit,
                    KeyCode::Char('r' | 'R') => Msg::Reset,
                    KeyCode::Char(c @ '1'..='9') => Msg::Activate(c as usize - '1' as usize),
                    _ => Msg::Ignored,
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Msg::Click {
                    x: mouse.x,
                    y: mouse.y,
                },
                _ => Msg::Ignored,
            },
            Event::Resize { width, height } => Msg::Resize { width, height },
        }
    }
}

/// Map a core timer effect onto a runtime command.
pub fn timer_cmd(effect: TimerEffect) -> Cmd<Msg> {
    match effect {
        TimerEffect::None => Cmd::none(),
        TimerEffect::Arm { token, delay } => {
            Cmd::schedule(timer_id(token), delay, Msg::ReplayTick(token))
        }
        TimerEffect::Cancel { token } => Cmd::cancel(timer_id(token)),
    }
}

/// Runtime timer id for a replay tick.
pub fn timer_id(token: TickToken) -> TimerId {
    TimerId(token.generation())
}

/// Top-level application model.
#[derive(Debug)]
pub struct MatrixApp {
    matrix: SequenceMatrix,
    viewport: Rect,
}

impl MatrixApp {
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            matrix: SequenceMatrix::new(config),
            viewport: Rect::from_size(80, 24),
        }
    }

    pub fn matrix(&self) -> &SequenceMatrix {
        &self.matrix
    }

    /// Last known terminal area, used for hit-testing clicks.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    fn layout(&self) -> MatrixLayout {
        MatrixLayout::compute(self.viewport, self.matrix.config())
    }

    fn activate(&mut self, cell: usize) -> Cmd<Msg> {
        let effect = self.matrix.click(cell);
        tracing::debug!(cell, recorded = self.matrix.model().len(), "cell activated");
        match effect {
            TimerEffect::Arm { .. } => Cmd::batch(vec![
                Cmd::log(format!(
                    "replay started: {:?}",
                    self.matrix.model().sequence().as_slice()
                )),
                timer_cmd(effect),
            ]),
            _ => timer_cmd(effect),
        }
    }

    fn reset(&mut self) -> Cmd<Msg> {
        if self.matrix.model().is_empty() {
            return Cmd::none();
        }
        let effect = self.matrix.reset();
        Cmd::batch(vec![timer_cmd(effect), Cmd::log("matrix reset")])
    }

    fn replay_tick(&mut self, token: TickToken) -> Cmd<Msg> {
        let before = self.matrix.mode().kind();
        let effect = self.matrix.tick(token);
        let after = self.matrix.mode().kind();
        tracing::trace!(
            mode = after.as_str(),
            cursor = self.matrix.model().cursor(),
            "replay tick handled"
        );
        if before == ModeKind::Replaying && after == ModeKind::Complete {
            return Cmd::batch(vec![timer_cmd(effect), Cmd::log("sequence complete")]);
        }
        timer_cmd(effect)
    }
}

impl Default for MatrixApp {
    fn default() -> Self {
        Self::new(MatrixConfig::default())
    }
}

impl Model for MatrixApp {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Activate(cell) => self.activate(cell),
            Msg::Reset => self.reset(),
            Msg::ReplayTick(token) => self.replay_tick(token),
            Msg::Click { x, y } => {
                let panel_visible = self.matrix.scene().show_completion;
                match self.layout().hit(x, y, panel_visible) {
                    Some(Hit::Cell(cell)) => self.activate(cell),
                    Some(Hit::Reset) => self.reset(),
                    None => Cmd::none(),
                }
            }
            Msg::Resize { width, height } => {
                self.viewport = Rect::from_size(width, height);
                Cmd::none()
            }
            Msg::Quit => Cmd::quit(),
            Msg::Ignored => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let layout = MatrixLayout::compute(frame.area(), self.matrix.config());
        view::render(&self.matrix.scene(), &layout, frame);
    }

    fn on_shutdown(&mut self) -> Cmd<Msg> {
        timer_cmd(self.matrix.teardown())
    }
}
