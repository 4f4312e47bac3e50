use crate::document::Document;
use crate::geometry::snap_to_grid;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a symbol was before a move and where it ended up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    pub from: Pos2,
    pub to: Pos2,
}

/// A drag in progress: original positions are captured once, at start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Dragged symbol id -> position when the drag started
    originals: BTreeMap<String, Pos2>,
    start_pointer: Pos2,
    offset: Vec2,
}

impl DragSession {
    /// Capture the current positions of every id known to `document`.
    /// Returns `None` if none of them are.
    pub fn start<'a>(document: &Document, ids: impl IntoIterator<Item = &'a str>, start_pointer: Pos2) -> Option<Self> {
        let originals: BTreeMap<String, Pos2> = ids
            .into_iter()
            .filter_map(|id| document.position(id).map(|pos| (id.to_owned(), pos)))
            .collect();
        if originals.is_empty() {
            return None;
        }
        Some(Self {
            originals,
            start_pointer,
            offset: Vec2::ZERO,
        })
    }

    /// Move every dragged symbol to `original + (pointer - start)`, snapped if `grid` is given
    pub fn update(&mut self, document: &mut Document, pointer: Pos2, grid: Option<f32>) {
        self.offset = pointer - self.start_pointer;
        for (id, original) in &self.originals {
            let target = *original + self.offset;
            let target = match grid {
                Some(grid_size) => snap_to_grid(target, grid_size),
                None => target,
            };
            document.set_position(id, target);
        }
    }

    /// Per-id change for every symbol that actually moved
    pub fn diff(&self, document: &Document) -> BTreeMap<String, PositionChange> {
        self.originals
            .iter()
            .filter_map(|(id, &from)| {
                let to = document.position(id)?;
                (to != from).then(|| (id.clone(), PositionChange { from, to }))
            })
            .collect()
    }

    /// Put every dragged symbol back where it was
    pub fn restore(&self, document: &mut Document) {
        for (id, original) in &self.originals {
            document.set_position(id, *original);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.originals.keys().map(String::as_str)
    }

    pub fn original_position(&self, id: &str) -> Option<Pos2> {
        self.originals.get(id).copied()
    }

    pub fn start_pointer(&self) -> Pos2 {
        self.start_pointer
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}
