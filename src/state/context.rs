//! The editing session of one mounted diagram editor.
//!
//! `EditorSession` owns the live symbol registry, the sorted selection, the
//! interaction state machine and the clipboard. It is created when the editor
//! mounts and dropped when it unmounts; consumers get it by reference, or as a
//! [`SharedSession`] when command delegates need to reach it.
//!
//! # Gestures
//!
//! - `start_drag` / `update_drag` / `end_drag` / `cancel_drag`
//! - `start_lasso` / `update_lasso` / `end_lasso` / `cancel_lasso`
//!
//! Gesture entry points and structural edits (selection changes, paste,
//! duplicate, delete) require the session to be idle. Ending a gesture never
//! touches history: `end_drag` hands back a diff for the caller to wrap into
//! a command.
//!
//! # Example
//!
//! ```rust,no_run
//! use sld_editor::{EditorConfig, EditorSession};
//! use egui::pos2;
//!
//! let mut session = EditorSession::new(EditorConfig::default());
//! let ids = session.selected_ids().to_vec();
//! session.start_drag(&ids, pos2(0.0, 0.0)).ok();
//! session.update_drag(pos2(40.0, 0.0)).ok();
//! let moves = session.end_drag();
//! ```

use super::InteractionState;
use super::drag::{DragSession, PositionChange};
use super::lasso::LassoSession;
use crate::clipboard::{self, ClipboardSnapshot, PasteOptions, PasteResult};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::SessionError;
use crate::selection::{Selection, SelectionMode};
use crate::symbol::Symbol;
use egui::{Pos2, Vec2};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A session shared with command delegates
pub type SharedSession = Arc<Mutex<EditorSession>>;

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    config: EditorConfig,
    document: Document,
    selection: Selection,
    interaction: InteractionState,
    clipboard: Option<ClipboardSnapshot>,
    hovered: Option<String>,
}

impl EditorSession {
    /// Creates an empty session in the `Idle` state
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(config, Document::new())
    }

    pub fn with_document(config: EditorConfig, document: Document) -> Self {
        Self {
            config,
            document,
            selection: Selection::new(),
            interaction: InteractionState::Idle,
            clipboard: None,
            hovered: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selected ids, lexicographically sorted
    pub fn selected_ids(&self) -> &[String] {
        self.selection.ids()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn clipboard(&self) -> Option<&ClipboardSnapshot> {
        self.clipboard.as_ref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Attempts to move the interaction state machine to `new_state`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InteractionInProgress` if a gesture is open and
    /// `new_state` is not `Idle`.
    fn transition_to(&mut self, new_state: InteractionState) -> Result<(), SessionError> {
        if !self.interaction.can_transition_to(&new_state) {
            return Err(SessionError::InteractionInProgress {
                active: self.interaction.name(),
            });
        }
        debug!("Interaction {} -> {}", self.interaction.name(), new_state.name());
        self.interaction = new_state;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.interaction.is_idle() {
            Ok(())
        } else {
            Err(SessionError::InteractionInProgress {
                active: self.interaction.name(),
            })
        }
    }

    // --- selection -------------------------------------------------------

    /// Change the selection by clicking `id` with the given modifier
    pub fn select(&mut self, id: &str, mode: SelectionMode) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if !self.document.contains(id) {
            return Err(SessionError::UnknownSymbol(id.to_owned()));
        }
        self.selection.apply(id, mode);
        Ok(())
    }

    pub fn deselect(&mut self, id: &str) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        Ok(self.selection.remove(id))
    }

    /// Replace the selection; ids not in the registry are ignored
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = String>) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let known: Vec<String> = ids.into_iter().filter(|id| self.document.contains(id)).collect();
        self.selection.set(known);
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.selection.set(self.document.ids().map(str::to_owned));
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.selection.clear();
        Ok(())
    }

    /// Hover is pure view state and never blocked by a gesture
    pub fn set_hovered(&mut self, id: Option<String>) {
        self.hovered = id.filter(|id| self.document.contains(id));
    }

    // --- drag ------------------------------------------------------------

    /// Begin dragging `ids`, capturing their current positions
    pub fn start_drag(&mut self, ids: &[String], pointer: Pos2) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let drag = DragSession::start(&self.document, ids.iter().map(String::as_str), pointer)
            .ok_or(SessionError::NothingToDrag)?;
        self.transition_to(InteractionState::Dragging(drag))
    }

    /// Move the dragged symbols live in the registry
    pub fn update_drag(&mut self, pointer: Pos2) -> Result<(), SessionError> {
        let grid = self.config.snap_to_grid.then_some(self.config.grid_size);
        match &mut self.interaction {
            InteractionState::Dragging(drag) => {
                drag.update(&mut self.document, pointer, grid);
                Ok(())
            }
            _ => Err(SessionError::NoActiveInteraction { expected: "drag" }),
        }
    }

    /// Finish the drag. Returns the position change of every symbol that
    /// moved, or `None` if no drag was in progress.
    pub fn end_drag(&mut self) -> Option<BTreeMap<String, PositionChange>> {
        let drag = self.take_drag()?;
        let moves = drag.diff(&self.document);
        info!("Drag committed, {} symbol(s) moved", moves.len());
        Some(moves)
    }

    /// Abort the drag, restoring every dragged symbol exactly. Returns false
    /// if no drag was in progress.
    pub fn cancel_drag(&mut self) -> bool {
        match self.take_drag() {
            Some(drag) => {
                drag.restore(&mut self.document);
                info!("Drag cancelled");
                true
            }
            None => false,
        }
    }

    fn take_drag(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Dragging(drag) => Some(drag),
            other => {
                self.interaction = other;
                None
            }
        }
    }

    // --- lasso -----------------------------------------------------------

    pub fn start_lasso(&mut self, pointer: Pos2) -> Result<(), SessionError> {
        self.transition_to(InteractionState::Lasso(LassoSession::new(pointer)))
    }

    pub fn update_lasso(&mut self, pointer: Pos2) -> Result<(), SessionError> {
        match &mut self.interaction {
            InteractionState::Lasso(lasso) => {
                lasso.update(pointer);
                Ok(())
            }
            _ => Err(SessionError::NoActiveInteraction { expected: "lasso selection" }),
        }
    }

    /// Resolve the lasso into the selection: replacing it, or adding to it
    /// when `additive`. Returns the sorted ids inside the box, or `None` if no
    /// lasso was in progress.
    pub fn end_lasso(&mut self, additive: bool) -> Option<Vec<String>> {
        let lasso = self.take_lasso()?;
        let inside = lasso.resolve(&self.document);
        if additive {
            self.selection.extend(inside.iter().cloned());
        } else {
            self.selection.set(inside.iter().cloned());
        }
        debug!("Lasso resolved to {} symbol(s)", inside.len());
        Some(inside)
    }

    pub fn cancel_lasso(&mut self) -> bool {
        self.take_lasso().is_some()
    }

    fn take_lasso(&mut self) -> Option<LassoSession> {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Lasso(lasso) => Some(lasso),
            other => {
                self.interaction = other;
                None
            }
        }
    }

    // --- clipboard -------------------------------------------------------

    /// Snapshot the selection into the clipboard. Returns the number of
    /// symbols copied; an empty selection leaves the clipboard untouched.
    pub fn copy_selection(&mut self) -> usize {
        match ClipboardSnapshot::capture(&self.document, self.selection.ids()) {
            Some(snapshot) => {
                let count = snapshot.len();
                self.clipboard = Some(snapshot);
                count
            }
            None => 0,
        }
    }

    /// Paste the clipboard displaced by `offset`, insert the new symbols and
    /// select them. An empty clipboard yields an empty result.
    pub fn paste_from_clipboard(&mut self, offset: Vec2) -> Result<PasteResult, SessionError> {
        self.ensure_idle()?;
        let Some(snapshot) = self.clipboard.as_ref() else {
            return Ok(PasteResult::default());
        };

        let options = PasteOptions {
            offset,
            grid: self.config.snap_to_grid.then_some(self.config.grid_size),
            name_suffix: &self.config.copy_suffix,
        };
        let result = clipboard::paste(snapshot, &self.document, &options);
        if result.is_empty() {
            return Ok(result);
        }

        for symbol in &result.symbols {
            self.document.insert(symbol.clone());
        }
        self.selection.set(result.symbol_ids());
        info!("Pasted {} symbol(s)", result.symbols.len());
        Ok(result)
    }

    /// Copy the selection and paste it at the configured duplicate offset
    pub fn duplicate_selection(&mut self) -> Result<PasteResult, SessionError> {
        self.ensure_idle()?;
        self.copy_selection();
        self.paste_from_clipboard(self.config.duplicate_offset)
    }

    /// Remove the selected symbols from the registry and return them, so the
    /// caller can record the removal as a command.
    pub fn remove_selected(&mut self) -> Result<Vec<Symbol>, SessionError> {
        self.ensure_idle()?;
        let ids = self.selection.ids().to_vec();
        Ok(self.remove_symbols(&ids))
    }

    // --- registry edits used by commands ---------------------------------

    /// Insert or replace symbols
    pub fn insert_symbols(&mut self, symbols: impl IntoIterator<Item = Symbol>) {
        for symbol in symbols {
            self.document.insert(symbol);
        }
    }

    /// Remove symbols, dropping them from the selection and hover too
    pub fn remove_symbols(&mut self, ids: &[String]) -> Vec<Symbol> {
        let removed: Vec<Symbol> = ids.iter().filter_map(|id| self.document.remove(id)).collect();
        let document = &self.document;
        self.selection.retain(|id| document.contains(id));
        if self.hovered.as_deref().is_some_and(|id| !document.contains(id)) {
            self.hovered = None;
        }
        removed
    }

    pub fn set_position(&mut self, id: &str, position: Pos2) -> bool {
        self.document.set_position(id, position)
    }

    /// Drop selection, gesture, hover and clipboard; the registry is kept
    pub fn reset(&mut self) {
        self.selection.clear();
        self.interaction = InteractionState::Idle;
        self.clipboard = None;
        self.hovered = None;
    }
}
