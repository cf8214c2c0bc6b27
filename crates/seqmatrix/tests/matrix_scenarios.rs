//! End-to-end runs of the sequence matrix on the simulator's virtual clock.

use std::time::Duration;

use seqmatrix::app::{MatrixApp, Msg, timer_id};
use seqmatrix::layout::MatrixLayout;
use seqmatrix::view::{COMPLETE_TITLE, TITLE};
use seqmatrix_core::{MatrixConfig, Mode, VisualState};
use seqmatrix_runtime::{
    CmdRecord, Event, KeyCode, KeyEvent, MouseEvent, ProgramSimulator, Rect,
};

const TICK: Duration = Duration::from_millis(600);

fn key(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c)))
}

fn sim() -> ProgramSimulator<MatrixApp> {
    let mut sim = ProgramSimulator::new(MatrixApp::default());
    sim.init();
    sim
}

fn press_all(sim: &mut ProgramSimulator<MatrixApp>, keys: &str) {
    let events: Vec<Event> = keys.chars().map(key).collect();
    sim.inject_events(&events);
}

#[test]
fn ordered_capture_then_nine_tick_replay() {
    let mut sim = sim();
    press_all(&mut sim, "12345678");
    assert_eq!(sim.model().matrix().mode(), Mode::Capturing);
    assert!(sim.pending_timers().is_empty());

    sim.inject_event(key('9'));
    assert_eq!(sim.model().matrix().mode(), Mode::Replaying { cursor: 0 });
    assert_eq!(
        sim.model().matrix().scene().count(VisualState::CapturedWaiting),
        9
    );
    assert_eq!(sim.pending_timers().len(), 1);

    assert_eq!(sim.advance(TICK - Duration::from_millis(1)), 0);
    assert_eq!(sim.advance(Duration::from_millis(1)), 1);
    let scene = sim.model().matrix().scene();
    assert_eq!(scene.cells[0].state, VisualState::CapturedActiveOrDone);
    assert_eq!(scene.count(VisualState::CapturedWaiting), 8);

    assert_eq!(sim.run_timers(100), 8);
    assert_eq!(sim.fired_timers().len(), 9);
    assert_eq!(sim.now(), TICK * 9);
    assert_eq!(sim.model().matrix().mode(), Mode::Complete);
    assert!(sim.pending_timers().is_empty());

    let scene = sim.model().matrix().scene();
    assert!(scene.show_completion);
    assert_eq!(scene.count(VisualState::CapturedActiveOrDone), 9);
    assert_eq!(
        sim.logs(),
        &[
            "replay started: [0, 1, 2, 3, 4, 5, 6, 7, 8]".to_string(),
            "sequence complete".to_string(),
        ]
    );
}

#[test]
fn ticks_fire_at_fixed_spacing() {
    let mut sim = sim();
    press_all(&mut sim, "953184726");
    sim.run_timers(100);
    let times: Vec<Duration> = sim.fired_timers().iter().map(|(_, t)| *t).collect();
    let expected: Vec<Duration> = (1..=9).map(|n| TICK * n).collect();
    assert_eq!(times, expected);
}

#[test]
fn double_click_records_once() {
    let mut sim = sim();
    press_all(&mut sim, "44");
    let model = sim.model().matrix().model();
    assert_eq!(model.len(), 1);
    assert_eq!(model.position_of(3), Some(0));
    assert_eq!(sim.model().matrix().mode(), Mode::Capturing);
}

#[test]
fn reset_mid_replay_cancels_pending_tick() {
    let mut sim = sim();
    press_all(&mut sim, "123456789");
    sim.advance(TICK * 4);
    assert_eq!(sim.model().matrix().mode(), Mode::Replaying { cursor: 4 });

    let stale = sim.model().matrix().pending_tick().expect("tick armed");
    assert_eq!(sim.pending_timers(), vec![timer_id(stale)]);

    sim.inject_event(key('r'));
    assert!(sim.command_log().contains(&CmdRecord::Cancel {
        id: timer_id(stale),
        removed: true,
    }));
    assert!(sim.pending_timers().is_empty());
    assert_eq!(sim.model().matrix().mode(), Mode::Capturing);

    assert_eq!(sim.advance(TICK * 10), 0);

    // A fire that raced the cancel still changes nothing.
    sim.send(Msg::ReplayTick(stale));
    let matrix = sim.model().matrix();
    assert_eq!(matrix.mode(), Mode::Capturing);
    assert_eq!(matrix.model().cursor(), 0);
    assert!(matrix.model().is_empty());
    assert!(sim.pending_timers().is_empty());
}

#[test]
fn clicks_during_replay_are_ignored() {
    let mut sim = sim();
    press_all(&mut sim, "123456789");
    sim.advance(TICK * 2);
    press_all(&mut sim, "1234");
    assert_eq!(sim.model().matrix().mode(), Mode::Replaying { cursor: 2 });
    assert_eq!(sim.pending_timers().len(), 1);
    sim.run_timers(100);
    assert_eq!(sim.fired_timers().len(), 9);
}

#[test]
fn mouse_clicks_drive_the_matrix() {
    let mut sim = sim();
    let area = Rect::from_size(80, 40);
    sim.inject_event(Event::Resize {
        width: area.width,
        height: area.height,
    });
    let layout = MatrixLayout::compute(area, &MatrixConfig::default());

    for cell in [8, 7, 6, 5, 4, 3, 2, 1, 0] {
        let rect = layout.cells[cell];
        sim.inject_event(Event::Mouse(MouseEvent::left_click(rect.x + 2, rect.y + 1)));
    }
    assert_eq!(
        sim.model().matrix().model().sequence().as_slice(),
        &[8, 7, 6, 5, 4, 3, 2, 1, 0]
    );
    sim.run_timers(100);
    assert_eq!(sim.model().matrix().mode(), Mode::Complete);

    // The panel covers the board; only its button responds.
    let c = layout.cells[4];
    sim.inject_event(Event::Mouse(MouseEvent::left_click(c.x, c.y)));
    assert_eq!(sim.model().matrix().mode(), Mode::Complete);

    let button = layout.panel_button;
    sim.inject_event(Event::Mouse(MouseEvent::left_click(button.x, button.y)));
    assert_eq!(sim.model().matrix().mode(), Mode::Capturing);
    assert!(sim.model().matrix().model().is_empty());
}

#[test]
fn frames_track_progress_and_completion() {
    let mut sim = MatrixSim::new(MatrixConfig::default().with_grid_size(3));
    let text = sim.frame_text();
    assert!(text.contains(TITLE));
    assert!(text.contains("Boxes clicked: 0 / 3"));

    sim.0.inject_events(&[key('3'), key('1')]);
    assert!(sim.frame_text().contains("Boxes clicked: 2 / 3"));

    sim.0.inject_event(key('2'));
    sim.0.run_timers(10);
    let text = sim.frame_text();
    assert!(text.contains(COMPLETE_TITLE));
    assert!(text.contains("Boxes clicked: 3 / 3"));
    assert_eq!(sim.0.frames().len(), 3);
}

#[test]
fn shutdown_cancels_pending_tick() {
    let mut sim = sim();
    press_all(&mut sim, "123456789");
    let token = sim.model().matrix().pending_tick().expect("tick armed");
    sim.inject_event(key('q'));
    assert!(!sim.is_running());

    sim.shutdown();
    assert!(sim.command_log().contains(&CmdRecord::Cancel {
        id: timer_id(token),
        removed: true,
    }));
    assert!(sim.pending_timers().is_empty());
    assert_eq!(sim.model().matrix().mode(), Mode::Replaying { cursor: 0 });
}

struct MatrixSim(ProgramSimulator<MatrixApp>);

impl MatrixSim {
    fn new(config: MatrixConfig) -> Self {
        let mut sim = ProgramSimulator::new(MatrixApp::new(config));
        sim.init();
        Self(sim)
    }

    fn frame_text(&mut self) -> String {
        self.0.capture_frame(80, 40).to_text()
    }
}
