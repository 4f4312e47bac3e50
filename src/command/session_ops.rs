//! Commands bound to a [`SharedSession`].
//!
//! Each one is idempotent in both directions, so pushing a command whose
//! effect the session already shows (a finished drag, a fresh paste) is safe.

use super::{Command, CommandResult};
use crate::state::{PositionChange, SharedSession};
use crate::symbol::Symbol;
use std::collections::BTreeMap;
use std::sync::Arc;

fn set_positions(session: &SharedSession, positions: impl Iterator<Item = (String, egui::Pos2)>) -> CommandResult {
    let mut session = session.lock();
    for (id, position) in positions {
        session.set_position(&id, position);
    }
    Ok(())
}

/// Record a finished drag (the diff returned by `end_drag`) as one step
pub fn move_symbols(session: &SharedSession, moves: BTreeMap<String, PositionChange>) -> Command {
    let name = match moves.len() {
        1 => "Move symbol".to_owned(),
        n => format!("Move {n} symbols"),
    };
    let moves = Arc::new(moves);
    let (forward, backward) = (moves.clone(), moves);
    let (apply_session, revert_session) = (session.clone(), session.clone());

    Command::from_fns(
        name,
        move || set_positions(&apply_session, forward.iter().map(|(id, change)| (id.clone(), change.to))),
        move || set_positions(&revert_session, backward.iter().map(|(id, change)| (id.clone(), change.from))),
    )
}

/// Record symbols added by a paste or duplicate
pub fn insert_symbols(session: &SharedSession, symbols: Vec<Symbol>) -> Command {
    let name = format!("Insert {} symbol(s)", symbols.len());
    let symbols = Arc::new(symbols);
    let ids: Arc<Vec<String>> = Arc::new(symbols.iter().map(|symbol| symbol.id.clone()).collect());
    let (apply_session, revert_session) = (session.clone(), session.clone());

    Command::from_fns(
        name,
        move || {
            apply_session.lock().insert_symbols(symbols.iter().cloned());
            Ok(())
        },
        move || {
            revert_session.lock().remove_symbols(&ids);
            Ok(())
        },
    )
}

/// Record symbols removed by a delete
pub fn remove_symbols(session: &SharedSession, symbols: Vec<Symbol>) -> Command {
    let name = format!("Delete {} symbol(s)", symbols.len());
    let symbols = Arc::new(symbols);
    let ids: Arc<Vec<String>> = Arc::new(symbols.iter().map(|symbol| symbol.id.clone()).collect());
    let (apply_session, revert_session) = (session.clone(), session.clone());

    Command::from_fns(
        name,
        move || {
            apply_session.lock().remove_symbols(&ids);
            Ok(())
        },
        move || {
            revert_session.lock().insert_symbols(symbols.iter().cloned());
            Ok(())
        },
    )
}
