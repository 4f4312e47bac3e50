mod common;

use common::{ids, init_logger, sample_session};
use egui::{Vec2, pos2};
use proptest::prelude::*;
use sld_editor::{Document, EditorConfig, EditorSession, Selection, SelectionMode, SessionError, Symbol};

const POOL: [&str; 6] = ["sym_load_1", "sym_bus_2", "sym_line_1", "sym_bus_1", "sym_source_1", "sym_bus_10"];

fn mode_from(n: u8) -> SelectionMode {
    match n {
        0 => SelectionMode::Single,
        1 => SelectionMode::Add,
        _ => SelectionMode::Toggle,
    }
}

proptest! {
    #[test]
    fn selection_is_always_sorted_and_unique(ops in prop::collection::vec((0usize..POOL.len(), 0u8..3), 0..40)) {
        let mut selection = Selection::new();
        for (index, mode) in ops {
            selection.apply(POOL[index], mode_from(mode));
            let ids = selection.ids();
            prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "not strictly sorted: {:?}", ids);
        }
    }
}

#[test]
fn test_selection_modes() {
    let mut session = sample_session();

    session.select("sym_bus_2", SelectionMode::Single).unwrap();
    session.select("sym_bus_1", SelectionMode::Add).unwrap();
    assert_eq!(session.selected_ids(), ["sym_bus_1", "sym_bus_2"]);

    session.select("sym_bus_1", SelectionMode::Add).unwrap();
    assert_eq!(session.selected_ids().len(), 2, "adding twice keeps one entry");

    session.select("sym_bus_2", SelectionMode::Toggle).unwrap();
    assert_eq!(session.selected_ids(), ["sym_bus_1"]);

    session.select("sym_load_1", SelectionMode::Single).unwrap();
    assert_eq!(session.selected_ids(), ["sym_load_1"]);

    assert_eq!(
        session.select("sym_missing", SelectionMode::Add),
        Err(SessionError::UnknownSymbol("sym_missing".to_owned()))
    );
}

#[test]
fn test_set_selection_ignores_unknown_ids() {
    let mut session = sample_session();
    session
        .set_selection(ids(&["sym_line_1", "nope", "sym_bus_1"]))
        .unwrap();
    assert_eq!(session.selected_ids(), ["sym_bus_1", "sym_line_1"]);

    session.select_all().unwrap();
    assert_eq!(session.selected_ids().len(), 5);
    session.clear_selection().unwrap();
    assert!(session.selection().is_empty());
}

#[test]
fn test_lasso_includes_symbols_on_the_edge() {
    let mut session = sample_session();
    session.start_lasso(pos2(200.0, 100.0)).unwrap();
    session.update_lasso(pos2(100.0, 0.0)).unwrap();

    let inside = session.end_lasso(false).unwrap();
    assert_eq!(inside, ["sym_bus_1", "sym_line_1", "sym_source_1"]);
    assert_eq!(session.selected_ids(), inside.as_slice());
    assert!(session.interaction().is_idle());
}

#[test]
fn test_lasso_excludes_symbols_one_unit_outside() {
    let mut session = sample_session();
    session.start_lasso(pos2(100.0, 0.0)).unwrap();
    session.update_lasso(pos2(199.0, 99.0)).unwrap();

    assert_eq!(session.end_lasso(false).unwrap(), ["sym_source_1"]);
}

#[test]
fn test_lasso_bounds_are_closed_on_every_side() {
    let mut session = sample_session();
    session.insert_symbols([
        Symbol::node("sym_bus_20", "bus_20", "Edge right", pos2(200.0, 50.0)),
        Symbol::node("sym_bus_21", "bus_21", "Past right", pos2(201.0, 50.0)),
        Symbol::node("sym_bus_22", "bus_22", "Past left", pos2(99.0, 50.0)),
        Symbol::node("sym_bus_23", "bus_23", "Past top", pos2(150.0, -1.0)),
        Symbol::node("sym_bus_24", "bus_24", "Past bottom", pos2(150.0, 101.0)),
    ]);

    session.start_lasso(pos2(100.0, 0.0)).unwrap();
    session.update_lasso(pos2(200.0, 100.0)).unwrap();

    assert_eq!(
        session.end_lasso(false).unwrap(),
        ["sym_bus_1", "sym_bus_20", "sym_line_1", "sym_source_1"]
    );
}

#[test]
fn test_additive_lasso_extends_selection() {
    let mut session = sample_session();
    session.select("sym_load_1", SelectionMode::Single).unwrap();

    session.start_lasso(pos2(90.0, 90.0)).unwrap();
    session.update_lasso(pos2(110.0, 110.0)).unwrap();
    session.end_lasso(true).unwrap();

    assert_eq!(session.selected_ids(), ["sym_bus_1", "sym_load_1"]);
}

#[test]
fn test_lasso_result_does_not_depend_on_insertion_order() {
    let document = common::sample_document();
    let symbols: Vec<_> = document.symbols().cloned().collect();
    let reversed = Document::from_symbols(symbols.into_iter().rev());

    let rect = egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 400.0));
    assert_eq!(document.ids_in_rect(rect), reversed.ids_in_rect(rect));
    assert_eq!(document.ids_in_rect(rect).len(), 5);
}

#[test]
fn test_drag_snaps_and_reports_diff() {
    init_logger();
    let mut session = sample_session();
    let dragged = ids(&["sym_bus_1", "sym_line_1"]);

    session.start_drag(&dragged, pos2(0.0, 0.0)).unwrap();
    session.update_drag(pos2(33.0, 7.0)).unwrap();

    assert_eq!(session.document().position("sym_bus_1"), Some(pos2(140.0, 100.0)));
    assert_eq!(session.document().position("sym_line_1"), Some(pos2(240.0, 100.0)));

    let moves = session.end_drag().unwrap();
    assert_eq!(moves.len(), 2);
    assert_eq!(moves["sym_bus_1"].from, pos2(100.0, 100.0));
    assert_eq!(moves["sym_bus_1"].to, pos2(140.0, 100.0));
    assert!(session.interaction().is_idle());
}

#[test]
fn test_drag_diff_skips_symbols_that_did_not_move() {
    let mut session = sample_session();
    session.start_drag(&ids(&["sym_bus_2"]), pos2(0.0, 0.0)).unwrap();
    // Snaps back onto the original grid point
    session.update_drag(pos2(4.0, -3.0)).unwrap();
    assert!(session.end_drag().unwrap().is_empty());
}

#[test]
fn test_cancel_drag_restores_positions_exactly() {
    let mut config = EditorConfig::default();
    config.snap_to_grid = false;
    let mut session = EditorSession::with_document(config, common::sample_document());
    let before = session.document().clone();

    session.start_drag(&ids(&["sym_bus_1", "sym_load_1"]), pos2(10.0, 10.0)).unwrap();
    for step in 1..20 {
        let t = step as f32 * 0.37;
        session.update_drag(pos2(10.0 + t, 10.0 - t * 1.9)).unwrap();
    }
    assert_ne!(session.document(), &before);

    assert!(session.cancel_drag());
    assert_eq!(session.document(), &before);
    assert!(!session.cancel_drag(), "second cancel has nothing to do");
}

#[test]
fn test_cancel_drag_restores_positions_exactly_with_snapping() {
    let mut session = sample_session();
    assert!(session.config().snap_to_grid);
    session.insert_symbols([Symbol::load("sym_load_7", "load_7", "Off grid", pos2(113.37, 47.91))]);
    let before = session.document().clone();

    let dragged = ids(&["sym_bus_1", "sym_load_1", "sym_load_7"]);
    session.start_drag(&dragged, pos2(3.3, 7.1)).unwrap();
    for step in 1..20 {
        let t = step as f32 * 1.37;
        session.update_drag(pos2(3.3 + t * 4.1, 7.1 - t * 2.9)).unwrap();
        let snapped = session.document().position("sym_bus_1").unwrap();
        assert_eq!(snapped.x % 20.0, 0.0);
        assert_eq!(snapped.y % 20.0, 0.0);
    }
    assert_ne!(session.document(), &before);

    assert!(session.cancel_drag());
    assert_eq!(session.document(), &before);
    assert_eq!(session.document().position("sym_load_7"), Some(pos2(113.37, 47.91)));
}

#[test]
fn test_gestures_are_rejected_while_busy() {
    let mut session = sample_session();
    session.copy_selection();
    session.start_drag(&ids(&["sym_bus_1"]), pos2(0.0, 0.0)).unwrap();

    assert!(matches!(
        session.start_lasso(pos2(0.0, 0.0)),
        Err(SessionError::InteractionInProgress { active: "drag" })
    ));
    assert!(session.start_drag(&ids(&["sym_bus_2"]), pos2(0.0, 0.0)).is_err());
    assert!(session.select("sym_bus_2", SelectionMode::Single).is_err());
    assert!(session.paste_from_clipboard(Vec2::new(20.0, 20.0)).is_err());
    assert!(session.duplicate_selection().is_err());
    assert!(session.remove_selected().is_err());

    assert!(session.cancel_drag());
    session.start_lasso(pos2(0.0, 0.0)).unwrap();
    assert!(matches!(
        session.start_drag(&ids(&["sym_bus_1"]), pos2(0.0, 0.0)),
        Err(SessionError::InteractionInProgress { active: "lasso selection" })
    ));
}

#[test]
fn test_ending_gestures_that_never_started() {
    let mut session = sample_session();
    assert_eq!(session.end_drag(), None);
    assert_eq!(session.end_lasso(false), None);
    assert!(!session.cancel_lasso());
    assert_eq!(
        session.update_drag(pos2(1.0, 1.0)),
        Err(SessionError::NoActiveInteraction { expected: "drag" })
    );
    assert_eq!(
        session.start_drag(&ids(&["sym_ghost"]), pos2(0.0, 0.0)),
        Err(SessionError::NothingToDrag)
    );

    // A lasso open does not make end_drag consume it
    session.start_lasso(pos2(0.0, 0.0)).unwrap();
    assert_eq!(session.end_drag(), None);
    assert!(session.interaction().is_lasso());
}

#[test]
fn test_removing_symbols_prunes_selection_and_hover() {
    let mut session = sample_session();
    session.set_selection(ids(&["sym_bus_1", "sym_load_1"])).unwrap();
    session.set_hovered(Some("sym_load_1".to_owned()));
    assert_eq!(session.hovered(), Some("sym_load_1"));

    let removed = session.remove_selected().unwrap();
    assert_eq!(removed.len(), 2);
    assert!(session.selection().is_empty());
    assert_eq!(session.hovered(), None);
    assert_eq!(session.document().len(), 3);

    session.set_hovered(Some("sym_load_1".to_owned()));
    assert_eq!(session.hovered(), None, "cannot hover a removed symbol");
}
