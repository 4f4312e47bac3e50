//! Seam to the host's editing-mode / permission context.
//!
//! Gating is a synchronous precondition checked by the caller right before a
//! mutating call. A rejected attempt is a warning and a `false`, never an
//! error and never queued.

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// Network model editing; the only mode that allows diagram mutations
    #[default]
    ModelEdit,
    /// Study case configuration; the diagram is read-only
    CaseConfig,
    /// Viewing calculation results; the diagram is read-only
    ResultView,
}

impl EditorMode {
    pub fn allows_mutation(self) -> bool {
        matches!(self, EditorMode::ModelEdit)
    }
}

/// Provided by the host application
pub trait ModeContext {
    fn current_mode(&self) -> EditorMode;

    fn is_mutation_enabled(&self) -> bool {
        self.current_mode().allows_mutation()
    }
}

impl ModeContext for EditorMode {
    fn current_mode(&self) -> EditorMode {
        *self
    }
}

/// Check the gate before a mutating action; logs and returns false if it is closed
pub fn guard(ctx: &impl ModeContext, action: &str) -> bool {
    if ctx.is_mutation_enabled() {
        true
    } else {
        warn!("'{action}' is not enabled in {:?} mode", ctx.current_mode());
        false
    }
}
