#![allow(dead_code)]

use egui::pos2;
use parking_lot::Mutex;
use sld_editor::symbol::BranchType;
use sld_editor::{Command, CommandError, ConnectionRole, Document, EditorConfig, EditorSession, Symbol};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two buses joined by a line, a source on bus 1 and a load on bus 2
pub fn sample_document() -> Document {
    Document::from_symbols([
        Symbol::node("sym_bus_1", "bus_1", "Szyna 1", pos2(100.0, 100.0)),
        Symbol::node("sym_bus_2", "bus_2", "Szyna 2", pos2(300.0, 100.0)),
        Symbol::branch("sym_line_1", "line_1", "Linia 1", pos2(200.0, 100.0), BranchType::Line)
            .with_connection(ConnectionRole::From, "bus_1")
            .with_connection(ConnectionRole::To, "bus_2"),
        Symbol::source("sym_source_1", "source_1", "Sieć", pos2(100.0, 0.0))
            .with_connection(ConnectionRole::ConnectedTo, "bus_1"),
        Symbol::load("sym_load_1", "load_1", "Odbiór 1", pos2(300.0, 200.0))
            .with_connection(ConnectionRole::ConnectedTo, "bus_2"),
    ])
}

pub fn sample_session() -> EditorSession {
    EditorSession::with_document(EditorConfig::default(), sample_document())
}

pub fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A stand-in for the diagram model service: element field values plus a
/// log of every side effect, in call order.
#[derive(Clone, Default)]
pub struct MockModel {
    pub values: Arc<Mutex<BTreeMap<String, i64>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_apply: Arc<AtomicBool>,
    pub fail_revert: Arc<AtomicBool>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<i64> {
        self.values.lock().get(key).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.values.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn set_failing_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn set_failing_revert(&self, fail: bool) {
        self.fail_revert.store(fail, Ordering::SeqCst);
    }

    /// `key := to` forward, `key := from` (or removal) backward
    pub fn set(&self, key: &str, from: Option<i64>, to: i64) -> Command {
        let forward = self.clone();
        let backward = self.clone();
        let (k1, k2) = (key.to_owned(), key.to_owned());
        Command::from_fns(
            format!("Set {key}"),
            move || {
                if forward.fail_apply.load(Ordering::SeqCst) {
                    return Err(CommandError::service(format!("cannot set {k1}")));
                }
                forward.values.lock().insert(k1.clone(), to);
                forward.calls.lock().push(format!("apply {k1}"));
                Ok(())
            },
            move || {
                if backward.fail_revert.load(Ordering::SeqCst) {
                    return Err(CommandError::service(format!("cannot restore {k2}")));
                }
                let mut values = backward.values.lock();
                match from {
                    Some(old) => values.insert(k2.clone(), old),
                    None => values.remove(&k2),
                };
                backward.calls.lock().push(format!("revert {k2}"));
                Ok(())
            },
        )
    }

    /// Like [`MockModel::set`], but only this key fails to revert when `poisoned` is set
    pub fn set_with_poisoned_revert(&self, key: &str, to: i64, poisoned: Arc<AtomicBool>) -> Command {
        let forward = self.clone();
        let backward = self.clone();
        let (k1, k2) = (key.to_owned(), key.to_owned());
        Command::from_fns(
            format!("Set {key}"),
            move || {
                forward.values.lock().insert(k1.clone(), to);
                forward.calls.lock().push(format!("apply {k1}"));
                Ok(())
            },
            move || {
                if poisoned.load(Ordering::SeqCst) {
                    return Err(CommandError::service(format!("cannot restore {k2}")));
                }
                backward.values.lock().remove(&k2);
                backward.calls.lock().push(format!("revert {k2}"));
                Ok(())
            },
        )
    }
}
