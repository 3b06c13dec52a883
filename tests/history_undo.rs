use doodle_canvas::{CanvasConfig, DrawingSession, MAX_HISTORY, RasterSurface};
use egui::pos2;

fn ready_session(width: u32, height: u32) -> DrawingSession {
    let mut config = CanvasConfig::default();
    config.width = width;
    config.height = height;
    let mut session = DrawingSession::new(config);
    session.attach_surface(width, height).unwrap();
    session.settle();
    session
}

fn draw_stroke(session: &mut DrawingSession, y: f32) {
    session.pointer_down(pos2(2.0, y));
    session.pointer_move(pos2(30.0, y));
    session.pointer_up(pos2(30.0, y));
    session.settle();
}

fn pixels(session: &DrawingSession) -> image::RgbaImage {
    session.surface().map(RasterSurface::pixels).cloned().unwrap()
}

fn undo_all(session: &mut DrawingSession) {
    while session.can_undo() {
        session.undo();
        session.settle();
    }
}

#[test]
fn test_history_seeded_with_blank_canvas() {
    let mut session = DrawingSession::default();
    session.attach_surface(16, 16).unwrap();
    // Seeding completes later
    assert!(session.history().is_empty());

    session.settle();
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().current_index(), Some(0));
    assert!(!session.can_undo());
}

#[test]
fn test_history_never_exceeds_cap() {
    let mut session = ready_session(32, 32);
    for i in 0..(MAX_HISTORY + 7) {
        draw_stroke(&mut session, (i % 30) as f32 + 1.0);
        assert!(session.history().len() <= MAX_HISTORY);
        assert_eq!(session.history().current_index(), Some(session.history().len() - 1));
    }
    assert_eq!(session.history().len(), MAX_HISTORY);

    // The newest entry matches what is on screen
    let current = session.history().current().unwrap().decode().unwrap();
    assert_eq!(current, pixels(&session));
}

#[test]
fn test_undo_to_blank_canvas() {
    let mut session = ready_session(32, 32);
    let blank = pixels(&session);

    for y in [4.0, 10.0, 16.0, 22.0] {
        draw_stroke(&mut session, y);
    }
    assert_ne!(pixels(&session), blank);

    undo_all(&mut session);
    assert_eq!(session.history().current_index(), Some(0));
    assert_eq!(pixels(&session), blank);
}

#[test]
fn test_drawing_after_undo_discards_future() {
    let mut session = ready_session(32, 32);
    draw_stroke(&mut session, 4.0);
    let after_first = pixels(&session);
    draw_stroke(&mut session, 12.0);
    draw_stroke(&mut session, 20.0);
    let discarded = pixels(&session);

    session.undo();
    session.undo();
    session.settle();
    assert_eq!(pixels(&session), after_first);

    draw_stroke(&mut session, 28.0);
    assert_eq!(session.history().len(), 3);

    // Walking back never reaches the discarded strokes
    let mut seen = Vec::new();
    while session.can_undo() {
        session.undo();
        session.settle();
        seen.push(pixels(&session));
    }
    assert!(seen.iter().all(|frame| *frame != discarded));
    assert_eq!(seen.first(), Some(&after_first));
}

#[test]
fn test_clear_is_undoable() {
    let mut session = ready_session(32, 32);
    draw_stroke(&mut session, 8.0);
    draw_stroke(&mut session, 16.0);
    let before_clear = pixels(&session);

    session.clear_canvas();
    session.settle();
    assert!(pixels(&session).pixels().all(|p| p.0 == [0, 0, 0, 0]));
    assert!(session.can_undo());

    session.undo();
    session.settle();
    assert_eq!(pixels(&session), before_clear);
}

#[test]
fn test_undo_on_single_entry_is_noop() {
    let mut session = ready_session(16, 16);
    session.undo();
    assert_eq!(session.settle(), 0);
    assert_eq!(session.history().current_index(), Some(0));
}

#[test]
fn test_unready_surface_ignores_everything() {
    let mut session = DrawingSession::default();
    session.pointer_down(pos2(1.0, 1.0));
    session.pointer_move(pos2(5.0, 5.0));
    session.pointer_up(pos2(5.0, 5.0));
    session.clear_canvas();
    session.undo();

    assert!(!session.is_ready());
    assert!(session.state().is_idle());
    assert_eq!(session.settle(), 0);
    assert!(session.history().is_empty());
}

#[test]
fn test_undo_state_notifications() {
    let mut session = DrawingSession::default();
    let mut events = session.events();
    session.attach_surface(16, 16).unwrap();
    session.settle();

    draw_stroke(&mut session, 8.0);
    session.undo();
    session.settle();

    let mut undo_states = Vec::new();
    while let Ok(Some(event)) = events.try_next() {
        if let doodle_canvas::SessionEvent::UndoStateChanged { can_undo } = event {
            undo_states.push(can_undo);
        }
    }
    // Seed, commit, restore
    assert_eq!(undo_states, vec![false, true, false]);
}
