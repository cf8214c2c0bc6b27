#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal and without a real
//! clock. Time only moves when the test calls [`advance`](ProgramSimulator::advance),
//! and timers fire in deadline order as the virtual clock passes them.
//!
//! # Example
//!
//! ```ignore
//! use seqmatrix_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(app);
//! sim.init();
//! sim.send(Msg::Activate(0));
//! sim.advance(Duration::from_millis(600));
//! let frame = sim.capture_frame(80, 24);
//! ```

use std::time::Duration;

use crate::event::Event;
use crate::frame::Frame;
use crate::program::{Cmd, Model};
use crate::timer::{TimerId, TimerQueue};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Schedule { id: TimerId, delay: Duration },
    Cancel { id: TimerId, removed: bool },
    Log(String),
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    timers: TimerQueue<M::Message>,
    /// Virtual time since the simulator was created.
    now: Duration,
    frames: Vec<Frame>,
    command_log: Vec<CmdRecord>,
    /// Timers delivered to the model, with the virtual time they fired at.
    fired: Vec<(TimerId, Duration)>,
    logs: Vec<String>,
    running: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator. The model is not initialized until [`init`](Self::init).
    pub fn new(model: M) -> Self {
        Self {
            model,
            timers: TimerQueue::new(),
            now: Duration::ZERO,
            frames: Vec::new(),
            command_log: Vec::new(),
            fired: Vec::new(),
            logs: Vec::new(),
            running: true,
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject terminal events, converting each through `From<Event>`.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let cmd = self.model.update(M::Message::from(*event));
            self.execute_cmd(cmd);
        }
    }

    /// Inject a single terminal event.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Move the virtual clock forward by `dt`, firing every timer that comes
    /// due on the way, each at its own deadline.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let target = self.now.saturating_add(dt);
        let mut count = 0;
        while self.running {
            let Some((id, deadline, msg)) = self.timers.pop_due(target) else {
                break;
            };
            self.now = self.now.max(deadline);
            self.fired.push((id, self.now));
            count += 1;
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
        self.now = target;
        count
    }

    /// Advance to the next pending deadline and fire what is due there.
    ///
    /// Returns `false` if no timer is pending.
    pub fn advance_to_next_timer(&mut self) -> bool {
        match self.timers.time_until_next(self.now) {
            Some(wait) if self.running => {
                self.advance(wait);
                true
            }
            _ => false,
        }
    }

    /// Fire timers until none is pending or `max_steps` deadlines were reached.
    ///
    /// Returns the number of deadlines advanced to.
    pub fn run_timers(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.advance_to_next_timer() {
            steps += 1;
        }
        steps
    }

    /// Call `Model::on_shutdown()`, execute its cancellations, then stop.
    pub fn shutdown(&mut self) {
        let cmd = self.model.on_shutdown();
        self.execute_cmd(cmd);
        self.running = false;
        self.timers.clear();
    }

    /// Render the current state into a fresh frame and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    /// All captured frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Ids of pending timers in firing order.
    pub fn pending_timers(&self) -> Vec<TimerId> {
        self.timers.ids()
    }

    /// Timers delivered so far, with their virtual fire times.
    pub fn fired_timers(&self) -> &[(TimerId, Duration)] {
        &self.fired
    }

    /// False after `Cmd::Quit` or [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Lines emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Every command executed so far.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for cmd in cmds {
                    if !self.running {
                        break;
                    }
                    self.execute_cmd(cmd);
                }
            }
            Cmd::Msg(msg) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
            Cmd::Schedule { id, delay, msg } => {
                self.command_log.push(CmdRecord::Schedule { id, delay });
                self.timers.schedule(id, self.now, delay, msg);
            }
            Cmd::Cancel(id) => {
                let removed = self.timers.cancel(id);
                self.command_log.push(CmdRecord::Cancel { id, removed });
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts ticks; re-arms itself until `limit`.
    struct Ticker {
        ticks: u32,
        limit: u32,
    }

    #[derive(Debug)]
    enum TickMsg {
        Start,
        Tick,
        Stop,
        Input,
    }

    impl From<Event> for TickMsg {
        fn from(_: Event) -> Self {
            TickMsg::Input
        }
    }

    const ID: TimerId = TimerId(1);
    const STEP: Duration = Duration::from_millis(100);

    impl Model for Ticker {
        type Message = TickMsg;

        fn update(&mut self, msg: TickMsg) -> Cmd<TickMsg> {
            match msg {
                TickMsg::Start => Cmd::schedule(ID, STEP, TickMsg::Tick),
                TickMsg::Tick => {
                    self.ticks += 1;
                    if self.ticks < self.limit {
                        Cmd::schedule(ID, STEP, TickMsg::Tick)
                    } else {
                        Cmd::log(format!("done after {}", self.ticks))
                    }
                }
                TickMsg::Stop => Cmd::cancel(ID),
                TickMsg::Input => Cmd::quit(),
            }
        }

        fn view(&self, frame: &mut Frame) {
            frame.print(0, 0, &format!("ticks={}", self.ticks), Default::default(), 20);
        }

        fn on_shutdown(&mut self) -> Cmd<TickMsg> {
            Cmd::cancel(ID)
        }
    }

    fn ticker(limit: u32) -> ProgramSimulator<Ticker> {
        let mut sim = ProgramSimulator::new(Ticker { ticks: 0, limit });
        sim.init();
        sim
    }

    #[test]
    fn timers_fire_only_when_clock_passes_deadline() {
        let mut sim = ticker(5);
        sim.send(TickMsg::Start);
        assert_eq!(sim.advance(Duration::from_millis(99)), 0);
        assert_eq!(sim.model().ticks, 0);
        assert_eq!(sim.advance(Duration::from_millis(1)), 1);
        assert_eq!(sim.model().ticks, 1);
    }

    #[test]
    fn chained_timers_fire_at_their_own_deadlines() {
        let mut sim = ticker(3);
        sim.send(TickMsg::Start);
        assert_eq!(sim.advance(Duration::from_secs(5)), 3);
        let times: Vec<_> = sim.fired_timers().iter().map(|(_, t)| *t).collect();
        assert_eq!(times, vec![STEP, STEP * 2, STEP * 3]);
        assert_eq!(sim.logs(), &["done after 3".to_string()]);
        assert!(sim.pending_timers().is_empty());
    }

    #[test]
    fn cancel_prevents_delivery() {
        let mut sim = ticker(5);
        sim.send(TickMsg::Start);
        sim.send(TickMsg::Stop);
        assert!(sim.command_log().contains(&CmdRecord::Cancel {
            id: ID,
            removed: true
        }));
        assert_eq!(sim.advance(Duration::from_secs(1)), 0);
        assert_eq!(sim.model().ticks, 0);
    }

    #[test]
    fn run_timers_stops_when_idle() {
        let mut sim = ticker(4);
        sim.send(TickMsg::Start);
        assert_eq!(sim.run_timers(100), 4);
        assert_eq!(sim.now(), STEP * 4);
        assert!(!sim.advance_to_next_timer());
    }

    #[test]
    fn quit_stops_processing() {
        let mut sim = ticker(5);
        sim.send(TickMsg::Start);
        sim.inject_event(Event::Resize {
            width: 10,
            height: 5,
        });
        assert!(!sim.is_running());
        assert_eq!(sim.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn shutdown_cancels_pending_timers() {
        let mut sim = ticker(5);
        sim.send(TickMsg::Start);
        sim.shutdown();
        assert!(!sim.is_running());
        assert!(sim.pending_timers().is_empty());
        assert_eq!(sim.model().ticks, 0);
    }

    #[test]
    fn capture_frame_renders_view() {
        let mut sim = ticker(2);
        sim.send(TickMsg::Start);
        sim.advance(STEP);
        let frame = sim.capture_frame(20, 1);
        assert_eq!(frame.row_text(0), "ticks=1");
        assert_eq!(sim.frames().len(), 1);
    }
}
