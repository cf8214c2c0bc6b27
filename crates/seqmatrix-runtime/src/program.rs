#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] owns application state. The runtime feeds it messages (from
//! terminal input or from timers it asked for), executes the [`Cmd`]s that
//! `update` returns, and calls `view` to draw a [`Frame`] whenever the state
//! may have changed.
//!
//! # Event loop
//!
//! One thread does everything, one event at a time:
//!
//! 1. Wait for input, but no longer than the nearest timer deadline.
//! 2. Dispatch every pending input event through `update`.
//! 3. Dispatch every due timer through `update`, earliest first.
//! 4. Redraw if anything was dispatched.
//!
//! `Cmd::Cancel` removes a timer from the queue while the command is
//! executed, so a cancelled timer can never reach `update`.

use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use crate::event::Event;
use crate::frame::Frame;
use crate::terminal_session::{SessionOptions, TerminalSession};
use crate::timer::{TimerId, TimerQueue};

/// Application state and behaviour.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Must be convertible from terminal events.
    type Message: From<Event>;

    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the current state.
    fn view(&self, frame: &mut Frame);

    /// Called once when the program stops, before its timers are dropped.
    ///
    /// Models release anything tied to the running instance here.
    fn on_shutdown(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }
}

/// Side effects requested by `update`.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Stop the program.
    Quit,
    /// Execute commands in order. Stops at `Quit`.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver `msg` once after `delay`. Replaces a pending timer with the same id.
    Schedule {
        id: TimerId,
        delay: Duration,
        msg: M,
    },
    /// Drop a pending timer.
    Cancel(TimerId),
    /// Emit a log line through `tracing`.
    Log(String),
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Schedule { id, delay, msg } => f
                .debug_struct("Schedule")
                .field("id", id)
                .field("delay", delay)
                .field("msg", msg)
                .finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// No-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// One-shot timer command.
    #[inline]
    pub fn schedule(id: TimerId, delay: Duration, msg: M) -> Self {
        Self::Schedule { id, delay, msg }
    }

    /// Timer cancellation command.
    #[inline]
    pub fn cancel(id: TimerId) -> Self {
        Self::Cancel(id)
    }

    /// Log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Batch several commands, collapsing trivial cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|cmd| !matches!(cmd, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Short name for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Schedule { .. } => "Schedule",
            Self::Cancel(_) => "Cancel",
            Self::Log(_) => "Log",
        }
    }
}

/// Program configuration.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Capture mouse events.
    pub mouse: bool,
    /// Stop on its own after this long (for scripted runs).
    pub exit_after: Option<Duration>,
    /// Longest single input wait when no timer is pending.
    pub idle_poll: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            exit_after: None,
            idle_poll: Duration::from_millis(250),
        }
    }
}

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    timers: TimerQueue<M::Message>,
    config: ProgramConfig,
    start: Instant,
    size: (u16, u16),
    running: bool,
    dirty: bool,
}

impl<M: Model> Program<M> {
    /// Take over the terminal for `model`.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
        })?;
        let size = session.size()?;
        Ok(Self {
            model,
            session,
            timers: TimerQueue::new(),
            config,
            start: Instant::now(),
            size,
            running: true,
            dirty: true,
        })
    }

    /// The model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run until the model quits or `exit_after` elapses.
    pub fn run(&mut self) -> io::Result<()> {
        let result = self.run_event_loop();
        self.shutdown();
        result
    }

    fn run_event_loop(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = tracing::info_span!("seqmatrix.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd);
        // Models learn the starting viewport the same way they learn later ones.
        let (width, height) = self.size;
        self.handle_event(Event::Resize { width, height });
        self.render_frame()?;

        while self.running {
            let timeout = self.effective_timeout();
            if self.session.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event);
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.fire_due_timers();

            if let Some(limit) = self.config.exit_after
                && self.now() >= limit
            {
                tracing::info!(
                    exit_after_ms = limit.as_millis() as u64,
                    "exit timer elapsed"
                );
                self.running = false;
            }

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }
        Ok(())
    }

    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn effective_timeout(&self) -> Duration {
        let now = self.now();
        let mut timeout = self.config.idle_poll;
        if let Some(until) = self.timers.time_until_next(now) {
            timeout = timeout.min(until);
        }
        if let Some(limit) = self.config.exit_after {
            timeout = timeout.min(limit.saturating_sub(now));
        }
        timeout
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            self.size = (width, height);
            self.session.invalidate();
        }
        self.dispatch(M::Message::from(event), "event");
    }

    fn fire_due_timers(&mut self) {
        let now = self.now();
        while self.running {
            let Some((id, deadline, msg)) = self.timers.pop_due(now) else {
                break;
            };
            tracing::trace!(
                %id,
                late_us = now.saturating_sub(deadline).as_micros() as u64,
                "timer fired"
            );
            self.dispatch(msg, "timer");
        }
    }

    fn dispatch(&mut self, msg: M::Message, source: &'static str) {
        let cmd = {
            let _span = tracing::debug_span!(
                "seqmatrix.program.update",
                source,
                duration_us = tracing::field::Empty,
                cmd_type = tracing::field::Empty
            )
            .entered();
            let start = Instant::now();
            let cmd = self.model.update(msg);
            tracing::Span::current().record("duration_us", start.elapsed().as_micros() as u64);
            tracing::Span::current().record("cmd_type", cmd.type_name());
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                tracing::debug!("quit requested");
                self.running = false;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    if !self.running {
                        break;
                    }
                    self.execute_cmd(cmd);
                }
            }
            Cmd::Msg(msg) => self.dispatch(msg, "cmd"),
            Cmd::Schedule { id, delay, msg } => {
                let now = self.now();
                let replaced = self.timers.schedule(id, now, delay, msg);
                tracing::trace!(
                    %id,
                    delay_ms = delay.as_millis() as u64,
                    replaced,
                    "timer scheduled"
                );
            }
            Cmd::Cancel(id) => {
                let removed = self.timers.cancel(id);
                tracing::trace!(%id, removed, "timer cancelled");
            }
            Cmd::Log(text) => tracing::info!(target: "seqmatrix::app", "{text}"),
        }
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let (width, height) = self.size;
        let mut frame = Frame::new(width, height);
        {
            let _span = tracing::trace_span!("seqmatrix.program.view", width, height).entered();
            self.model.view(&mut frame);
        }
        self.session.present(&frame)?;
        self.dirty = false;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.running = false;
        let cmd = self.model.on_shutdown();
        self.apply_shutdown_cmd(cmd);
        let dropped = self.timers.clear();
        tracing::info!(dropped_timers = dropped, "program stopped");
    }

    /// Once stopped, only cancellations and logs still mean anything.
    fn apply_shutdown_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::Batch(cmds) => cmds
                .into_iter()
                .for_each(|cmd| self.apply_shutdown_cmd(cmd)),
            Cmd::Cancel(id) => {
                let removed = self.timers.cancel(id);
                tracing::debug!(%id, removed, "timer cancelled on shutdown");
            }
            Cmd::Log(text) => tracing::info!(target: "seqmatrix::app", "{text}"),
            other => tracing::trace!(cmd_type = other.type_name(), "command ignored after stop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Msg {
        A,
        B,
    }

    #[test]
    fn batch_collapses_trivial_cases() {
        assert!(matches!(Cmd::<Msg>::batch(vec![]), Cmd::None));
        assert!(matches!(
            Cmd::batch(vec![Cmd::none(), Cmd::msg(Msg::A)]),
            Cmd::Msg(Msg::A)
        ));
        assert!(matches!(
            Cmd::batch(vec![Cmd::msg(Msg::A), Cmd::none(), Cmd::msg(Msg::B)]),
            Cmd::Batch(ref cmds) if cmds.len() == 2
        ));
    }

    #[test]
    fn cmd_debug_and_type_names() {
        let cmd = Cmd::schedule(TimerId(3), Duration::from_millis(5), Msg::A);
        assert_eq!(cmd.type_name(), "Schedule");
        assert!(format!("{cmd:?}").contains("TimerId(3)"));
        assert_eq!(Cmd::<Msg>::cancel(TimerId(3)).type_name(), "Cancel");
        assert_eq!(Cmd::<Msg>::log("hi").type_name(), "Log");
        assert_eq!(format!("{:?}", Cmd::<Msg>::quit()), "Quit");
    }

    #[test]
    fn default_config() {
        let config = ProgramConfig::default();
        assert!(config.alternate_screen);
        assert!(config.mouse);
        assert!(config.exit_after.is_none());
    }
}
